//! Reusable components.
//!
//! A component descriptor pairs a render function with a display name and an id.
//! The id is assigned once, when the descriptor is created: every placement of the
//! descriptor (and every handle derived from it) shares it, so a render function can
//! tell which descriptor it belongs to through [`Context::component`].

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use serde_json::Value;
use uuid::Uuid;

use crate::attributes::Attributes;
use crate::compose::{Composed, Patch, PayloadKind};
use crate::context::Context;
use crate::node::Node;

/// Identifier assigned to a component descriptor at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(Uuid);

impl ComponentId {
    /// Generates a fresh, random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.simple(), f)
    }
}

type RenderFn = dyn Fn(&Attributes, &[Node], &Context) -> anyhow::Result<Node>;

/// Kind-specific fields of a component node.
#[derive(Clone)]
pub struct ComponentKind {
    display_name: String,
    id: ComponentId,
    render: Rc<RenderFn>,
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentKind")
            .field("display_name", &self.display_name)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl PayloadKind for ComponentKind {
    const NAME: &'static str = "component";

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "displayName" => Some(Value::from(self.display_name.as_str())),
            "id" => Some(Value::from(self.id.to_string())),
            _ => None,
        }
    }

    fn patch(&mut self, patch: &Patch) {
        if let Some(name) = &patch.display_name {
            self.display_name.clone_from(name);
        }
        if let Some(id) = patch.id {
            self.id = id;
        }
    }
}

/// A component descriptor handle.
pub type Component = Composed<ComponentKind>;

impl Composed<ComponentKind> {
    /// The component's display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.kind().display_name
    }

    /// The id assigned when the descriptor was created.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.kind().id
    }

    /// Invokes the render function with this node's attributes and children.
    ///
    /// # Errors
    ///
    /// Returns the render function's error unchanged.
    pub fn render(&self, cx: &Context) -> anyhow::Result<Node> {
        (self.kind().render)(self.attributes(), self.children(), cx)
    }

    /// Derives a descriptor whose missing attributes are filled from `defaults`.
    ///
    /// Attributes already present win over the defaults.
    #[must_use]
    pub fn with_default_props<I, N, V>(&self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        self.copy(|payload| {
            for (name, value) in defaults {
                payload
                    .attributes
                    .entry(name.into())
                    .or_insert_with(|| value.into());
            }
        })
    }
}

/// Creates an anonymous component descriptor.
pub fn component<F, T>(render: F) -> Component
where
    F: Fn(&Attributes, &[Node], &Context) -> anyhow::Result<T> + 'static,
    T: Into<Node> + 'static,
{
    component_named("Component", render)
}

/// Creates a component descriptor with a display name used in diagnostics.
///
/// ```
/// use recast_core::{component_named, tag, Template};
///
/// let card = component_named("Card", |props, children, _cx| {
///     let title = props.get("title").and_then(|v| v.as_str()).unwrap_or_default();
///     Ok(tag("section")
///         .with_children(Template::new(["", ""], [title]))
///         .append(children.to_vec()))
/// });
/// assert_eq!(card.display_name(), "Card");
/// assert_eq!(card.with_attribute("title", "Hi").id(), card.id());
/// ```
pub fn component_named<F, T>(name: impl Into<String>, render: F) -> Component
where
    F: Fn(&Attributes, &[Node], &Context) -> anyhow::Result<T> + 'static,
    T: Into<Node> + 'static,
{
    Composed::new(ComponentKind {
        display_name: name.into(),
        id: ComponentId::new(),
        render: Rc::new(move |props: &Attributes, children: &[Node], cx: &Context| {
            render(props, children, cx).map(Into::into)
        }),
    })
}

impl From<Component> for Node {
    fn from(value: Component) -> Self {
        Self::Component(value)
    }
}
