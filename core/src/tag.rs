//! Markup elements.

use alloc::string::String;

use serde_json::Value;

use crate::attributes::NormalizedAttributes;
use crate::compose::{Composed, Payload, PayloadKind};
use crate::node::Node;

/// Elements that never have children and render in self-closing form.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Kind-specific fields of a tag node.
#[derive(Debug, Clone)]
pub struct TagKind {
    name: String,
    void: bool,
    normalized: NormalizedAttributes,
}

impl PayloadKind for TagKind {
    const NAME: &'static str = "tag";

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "tagName" => Some(Value::from(self.name.as_str())),
            "isVoidElement" => Some(Value::Bool(self.void)),
            "normalizedAttributes" => Some(self.normalized.to_value()),
            _ => None,
        }
    }

    fn refresh(payload: &mut Payload<Self>) {
        payload.kind.normalized = NormalizedAttributes::from_attributes(&payload.attributes);
    }
}

/// A markup element handle.
pub type Tag = Composed<TagKind>;

impl Composed<TagKind> {
    /// The element name.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.kind().name
    }

    /// Returns `true` for elements in [`VOID_ELEMENTS`].
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.kind().void
    }

    /// The attributes as they will render.
    #[must_use]
    pub fn normalized_attributes(&self) -> &NormalizedAttributes {
        &self.kind().normalized
    }
}

/// Creates an element with no attributes and no children.
///
/// ```
/// use recast_core::tag;
///
/// let img = tag("img").with_attribute("src", "/logo.png");
/// assert!(img.is_void());
/// assert_eq!(img.tag_name(), "img");
/// ```
pub fn tag(name: impl Into<String>) -> Tag {
    let name = name.into();
    let void = VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str());
    Composed::new(TagKind {
        name,
        void,
        normalized: NormalizedAttributes::default(),
    })
}

impl From<Tag> for Node {
    fn from(value: Tag) -> Self {
        Self::Tag(value)
    }
}
