//! Immutable, composable node handles.
//!
//! Tags and components share one payload shape: children, metadata, attributes and
//! a table of declared methods. A [`Composed`] handle wraps that payload behind an
//! `Rc` and never mutates it. Every "change" goes through [`Composed::copy`], which
//! clones the payload, applies a transform and wraps the result in a new handle.
//!
//! The two operations a markup layer needs are built on top of `copy`:
//!
//! - [`Composed::with_attributes`] shallow-merges an attribute bag.
//! - [`Composed::with_children`] appends the parsed parts of a [`Template`].
//!
//! ```
//! use recast_core::{Template, tag};
//!
//! let base = tag("a").with_attributes([("href", "/")]);
//! let styled = base.with_attributes([("class", "nav")]);
//! assert!(base.attribute("class").is_none());
//! assert_eq!(styled.attributes().len(), 2);
//!
//! let filled = styled.with_children(Template::new(["Home"], Vec::<&str>::new()));
//! assert_eq!(filled.children().len(), 1);
//! ```

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::attributes::{Attributes, Meta};
use crate::component::ComponentId;
use crate::node::Node;

/// Kind-specific part of a composable payload.
pub trait PayloadKind: Clone + fmt::Debug + 'static {
    /// The value of the payload's `kind` field.
    const NAME: &'static str;

    /// Looks up a kind-specific field by name.
    fn field(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    /// Applies kind-specific parts of a [`Patch`].
    fn patch(&mut self, patch: &Patch) {
        let _ = patch;
    }

    /// Recomputes derived fields after the payload changed.
    fn refresh(payload: &mut Payload<Self>) {
        let _ = payload;
    }
}

/// A method declared on a composable payload.
///
/// Methods derive a new handle from the one they are called on.
pub type Method<K> = Rc<dyn Fn(&Composed<K>, &[Value]) -> Composed<K>>;

/// The data behind a composable handle.
#[derive(Clone)]
pub struct Payload<K: PayloadKind> {
    /// Kind-specific fields.
    pub kind: K,
    /// Child nodes, in document order.
    pub children: Vec<Node>,
    /// Free-form metadata for plugins.
    pub meta: Meta,
    /// Attributes as supplied by the caller.
    pub attributes: Attributes,
    /// Declared methods, looked up before fields.
    pub methods: IndexMap<String, Method<K>>,
}

impl<K: PayloadKind> fmt::Debug for Payload<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("kind", &self.kind)
            .field("children", &self.children)
            .field("meta", &self.meta)
            .field("attributes", &self.attributes)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A property read through [`Composed::property`].
pub enum Property<'a, K: PayloadKind> {
    /// A declared method.
    Method(&'a Method<K>),
    /// The child list.
    Children(&'a [Node]),
    /// Any other field, as a JSON value.
    Value(Value),
}

impl<K: PayloadKind> fmt::Debug for Property<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(_) => f.write_str("Method(..)"),
            Self::Children(children) => f.debug_tuple("Children").field(children).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// An immutable handle around a composable payload.
pub struct Composed<K: PayloadKind> {
    payload: Rc<Payload<K>>,
}

impl<K: PayloadKind> Clone for Composed<K> {
    fn clone(&self) -> Self {
        Self {
            payload: self.payload.clone(),
        }
    }
}

impl<K: PayloadKind> fmt::Debug for Composed<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.payload, f)
    }
}

impl<K: PayloadKind> Composed<K> {
    /// Wraps a fresh payload of the given kind.
    pub fn new(kind: K) -> Self {
        Self::from_payload(Payload {
            kind,
            children: Vec::new(),
            meta: Meta::new(),
            attributes: Attributes::new(),
            methods: IndexMap::new(),
        })
    }

    /// Wraps an existing payload, refreshing its derived fields.
    pub fn from_payload(mut payload: Payload<K>) -> Self {
        K::refresh(&mut payload);
        Self {
            payload: Rc::new(payload),
        }
    }

    /// Borrows the payload.
    #[must_use]
    pub fn payload(&self) -> &Payload<K> {
        &self.payload
    }

    /// Borrows the kind-specific fields.
    #[must_use]
    pub fn kind(&self) -> &K {
        &self.payload.kind
    }

    /// The node's children.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.payload.children
    }

    /// The node's attributes, as supplied.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.payload.attributes
    }

    /// A single attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.payload.attributes.get(name)
    }

    /// The node's metadata.
    #[must_use]
    pub fn meta(&self) -> &Meta {
        &self.payload.meta
    }

    /// Returns `true` if both handles wrap the same payload.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.payload, &other.payload)
    }

    /// Derives a new handle by transforming a copy of the payload.
    ///
    /// This is the primitive every derive operation is built on. `self` is left
    /// untouched.
    #[must_use]
    pub fn copy(&self, transform: impl FnOnce(&mut Payload<K>)) -> Self {
        let mut payload = (*self.payload).clone();
        transform(&mut payload);
        Self::from_payload(payload)
    }

    /// Derives a node whose attributes are the shallow merge of the current ones and
    /// `attributes`; new values win.
    #[must_use]
    pub fn with_attributes<I, N, V>(&self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        self.copy(|payload| {
            for (name, value) in attributes {
                payload.attributes.insert(name.into(), value.into());
            }
        })
    }

    /// Derives a node with one attribute set.
    #[must_use]
    pub fn with_attribute(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_attributes([(name.into(), value.into())])
    }

    /// Derives a node whose children are the current children followed by the parts
    /// parsed from `template`.
    #[must_use]
    pub fn with_children(&self, template: Template) -> Self {
        let parts = template.into_parts();
        self.copy(|payload| payload.children.extend(parts))
    }

    /// Derives a node with `children` appended as-is.
    #[must_use]
    pub fn append<I>(&self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.copy(|payload| payload.children.extend(children.into_iter().map(Into::into)))
    }

    /// Derives a node with one metadata entry set.
    #[must_use]
    pub fn with_meta(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let (key, value) = (key.into(), value.into());
        self.copy(|payload| {
            payload.meta.insert(key, value);
        })
    }

    /// Derives a node with a method declared under `name`.
    #[must_use]
    pub fn define_method<F>(&self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Self, &[Value]) -> Self + 'static,
    {
        let name = name.into();
        self.copy(|payload| {
            payload.methods.insert(name, Rc::new(method));
        })
    }

    /// Derives a node by applying a [`Patch`].
    #[must_use]
    pub fn patched(&self, patch: &Patch) -> Self {
        self.copy(|payload| patch.apply(payload))
    }

    /// Reads a property: declared methods first, then payload fields.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<Property<'_, K>> {
        if let Some(method) = self.payload.methods.get(name) {
            return Some(Property::Method(method));
        }
        match name {
            "kind" => Some(Property::Value(Value::from(K::NAME))),
            "children" => Some(Property::Children(&self.payload.children)),
            "meta" => Some(Property::Value(Value::Object(self.payload.meta.clone()))),
            "attributes" => Some(Property::Value(Value::Object(
                self.payload.attributes.clone(),
            ))),
            _ => self.payload.kind.field(name).map(Property::Value),
        }
    }

    /// Calls a declared method, returning the handle it derives.
    #[must_use]
    pub fn call(&self, name: &str, args: &[Value]) -> Option<Self> {
        let method = self.payload.methods.get(name)?.clone();
        Some(method(self, args))
    }
}

/// A markup-literal call: static text segments with interpolated values between them.
///
/// The builder keeps one more static segment than values, so a template always
/// starts and ends with a (possibly empty) static segment.
#[derive(Debug, Clone)]
pub struct Template {
    statics: Vec<String>,
    values: Vec<Node>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            statics: vec![String::new()],
            values: Vec::new(),
        }
    }
}

impl Template {
    /// Builds a template from its static segments and interpolated values.
    ///
    /// A well-formed template has one more static segment than values.
    pub fn new<S, V>(statics: S, values: V) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<Node>,
    {
        Self {
            statics: statics.into_iter().map(Into::into).collect(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends static text to the trailing segment.
    #[must_use]
    pub fn text(mut self, text: impl AsRef<str>) -> Self {
        match self.statics.last_mut() {
            Some(last) => last.push_str(text.as_ref()),
            None => self.statics.push(text.as_ref().into()),
        }
        self
    }

    /// Appends an interpolated value followed by an empty static segment.
    #[must_use]
    pub fn value(mut self, value: impl Into<Node>) -> Self {
        if self.statics.is_empty() {
            self.statics.push(String::new());
        }
        self.values.push(value.into());
        self.statics.push(String::new());
        self
    }

    /// Parses the template into child nodes.
    ///
    /// Static segments that are entirely whitespace are dropped unless they are the
    /// first or the last segment. List values are flattened one level; every other
    /// value is kept verbatim.
    #[must_use]
    pub fn into_parts(self) -> Vec<Node> {
        let last = self.statics.len().saturating_sub(1);
        let mut values = self.values.into_iter();
        let mut parts = Vec::new();
        for (index, segment) in self.statics.into_iter().enumerate() {
            if index == 0 || index == last || !segment.trim().is_empty() {
                parts.push(Node::from(segment));
            }
            if let Some(value) = values.next() {
                push_flattened(&mut parts, value);
            }
        }
        for value in values {
            push_flattened(&mut parts, value);
        }
        parts
    }
}

fn push_flattened(parts: &mut Vec<Node>, value: Node) {
    match value {
        Node::List(items) => parts.extend(items),
        other => parts.push(other),
    }
}

/// A partial update applied through an expression's `copy`.
///
/// Attributes and metadata are shallow-merged, children are replaced. The display
/// name and id only apply to components.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    /// Attributes merged into the node's attributes.
    pub attributes: Option<Attributes>,
    /// Metadata merged into the node's metadata.
    pub meta: Option<Meta>,
    /// Replacement children.
    pub children: Option<Vec<Node>>,
    /// Replacement component display name.
    pub display_name: Option<String>,
    /// Replacement component id.
    pub id: Option<ComponentId>,
}

impl Patch {
    /// An empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(name.into(), value.into());
        self
    }

    /// Merges one metadata entry.
    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta
            .get_or_insert_with(Meta::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replaces the children.
    #[must_use]
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children = Some(children.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces a component's display name.
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Replaces a component's id.
    #[must_use]
    pub const fn id(mut self, id: ComponentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Applies the patch to a payload.
    pub fn apply<K: PayloadKind>(&self, payload: &mut Payload<K>) {
        if let Some(attributes) = &self.attributes {
            for (name, value) in attributes {
                payload.attributes.insert(name.clone(), value.clone());
            }
        }
        if let Some(meta) = &self.meta {
            for (key, value) in meta {
                payload.meta.insert(key.clone(), value.clone());
            }
        }
        if let Some(children) = &self.children {
            payload.children.clone_from(children);
        }
        payload.kind.patch(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag;
    use serde_json::json;

    fn texts(nodes: &[Node]) -> Vec<String> {
        nodes
            .iter()
            .map(|node| node.as_str().map_or_else(|| node.kind_name().into(), Into::into))
            .collect()
    }

    #[test]
    fn attribute_merge_leaves_original_untouched() {
        let original = tag("input").with_attributes([("type", "text"), ("name", "q")]);
        let derived = original.with_attributes([("type", json!("search")), ("required", json!(true))]);

        assert_eq!(original.attribute("type"), Some(&json!("text")));
        assert!(original.attribute("required").is_none());
        assert_eq!(derived.attribute("type"), Some(&json!("search")));
        assert_eq!(derived.attribute("name"), Some(&json!("q")));
        assert_eq!(derived.attribute("required"), Some(&json!(true)));
        assert!(!original.ptr_eq(&derived));
    }

    #[test]
    fn children_append_across_calls() {
        let x = tag("b");
        let first = tag("p").with_children(Template::new(["A", "B"], [x]));
        let second = first.with_children(Template::new(["C"], Vec::<Node>::new()));

        assert_eq!(texts(first.children()), ["A", "tag", "B"]);
        assert_eq!(texts(second.children()), ["A", "tag", "B", "C"]);
    }

    #[test]
    fn interior_whitespace_segments_are_dropped() {
        let node = tag("ul").with_children(Template::new(
            ["\n  ", "\n  ", "\n"],
            [Node::from("one"), Node::from("two")],
        ));
        assert_eq!(texts(node.children()), ["\n  ", "one", "two", "\n"]);
    }

    #[test]
    fn list_values_flatten_one_level() {
        let nested = Node::List(vec![Node::from("deep")]);
        let node = tag("div").with_children(
            Template::default()
                .text("a")
                .value(vec![Node::from("b"), nested])
                .text("c"),
        );
        assert_eq!(texts(node.children()), ["a", "b", "list", "c"]);
    }

    #[test]
    fn builder_pads_missing_segments() {
        let node = tag("span").with_children(Template::default().value("x"));
        assert_eq!(texts(node.children()), ["", "x", ""]);
    }

    #[test]
    fn builder_drops_whitespace_between_trailing_values() {
        let node = tag("ol").with_children(
            Template::default()
                .value("one")
                .text("\n  ")
                .value("two"),
        );
        assert_eq!(texts(node.children()), ["", "one", "two", ""]);
    }

    #[test]
    fn methods_shadow_fields() {
        let node = tag("div")
            .with_attribute("id", "a")
            .define_method("attributes", |this, _| this.with_attribute("id", "b"));

        assert!(matches!(node.property("attributes"), Some(Property::Method(_))));
        let derived = node.call("attributes", &[]).expect("method is declared");
        assert_eq!(derived.attribute("id"), Some(&json!("b")));
        assert_eq!(node.attribute("id"), Some(&json!("a")));
    }

    #[test]
    fn fields_fall_back_to_payload() {
        let node = tag("svg").with_meta("origin", "test");
        match node.property("kind") {
            Some(Property::Value(value)) => assert_eq!(value, json!("tag")),
            other => panic!("unexpected property {other:?}"),
        }
        match node.property("tagName") {
            Some(Property::Value(value)) => assert_eq!(value, json!("svg")),
            other => panic!("unexpected property {other:?}"),
        }
        match node.property("meta") {
            Some(Property::Value(value)) => assert_eq!(value, json!({ "origin": "test" })),
            other => panic!("unexpected property {other:?}"),
        }
        assert!(node.property("missing").is_none());
        assert!(node.call("missing", &[]).is_none());
    }

    #[test]
    fn patch_merges_and_replaces() {
        let node = tag("p")
            .with_attribute("id", "x")
            .append(["old"])
            .patched(&Patch::new().attribute("title", "t").meta("k", 1).children(["new"]));

        assert_eq!(node.attribute("id"), Some(&json!("x")));
        assert_eq!(node.attribute("title"), Some(&json!("t")));
        assert_eq!(node.meta().get("k"), Some(&json!(1)));
        assert_eq!(texts(node.children()), ["new"]);
    }
}
