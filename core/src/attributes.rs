//! Attribute bags and their normalization into markup.
//!
//! Attributes are stored exactly as the caller supplied them, as an ordered JSON
//! object. Before a tag renders, the bag is normalized:
//!
//! - `class` and `className` merge into one de-duplicated, ordered class list.
//!   Values may be strings, (nested) arrays, or objects mapping a class name to a
//!   truthy/falsy flag.
//! - `style` values merge into one property map. Strings (`prop: value; ...`),
//!   objects (camelCase keys become kebab-case) and arrays of either are accepted;
//!   later entries override earlier ones for the same property.
//! - camelCase attribute names become kebab-case, except for the mixed-case SVG
//!   attributes in [`PRESERVED_NAMES`].

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::escape::push_quoted;
use crate::node::Text;

/// Attributes of a composable node, in insertion order.
pub type Attributes = Map<String, Value>;

/// Free-form metadata attached to a composable node.
pub type Meta = Map<String, Value>;

/// Attribute names that keep their mixed case.
pub const PRESERVED_NAMES: &[&str] = &[
    "allowReorder",
    "attributeName",
    "attributeType",
    "baseFrequency",
    "baseProfile",
    "calcMode",
    "clipPathUnits",
    "contentScriptType",
    "contentStyleType",
    "diffuseConstant",
    "edgeMode",
    "externalResourcesRequired",
    "filterRes",
    "filterUnits",
    "glyphRef",
    "gradientTransform",
    "gradientUnits",
    "kernelMatrix",
    "kernelUnitLength",
    "keyPoints",
    "keySplines",
    "keyTimes",
    "lengthAdjust",
    "limitingConeAngle",
    "markerHeight",
    "markerUnits",
    "markerWidth",
    "maskContentUnits",
    "maskUnits",
    "numOctaves",
    "pathLength",
    "patternContentUnits",
    "patternTransform",
    "patternUnits",
    "pointsAtX",
    "pointsAtY",
    "pointsAtZ",
    "preserveAlpha",
    "preserveAspectRatio",
    "primitiveUnits",
    "refX",
    "refY",
    "repeatCount",
    "repeatDur",
    "requiredExtensions",
    "requiredFeatures",
    "specularConstant",
    "specularExponent",
    "spreadMethod",
    "startOffset",
    "stdDeviation",
    "stitchTiles",
    "surfaceScale",
    "systemLanguage",
    "tableValues",
    "targetX",
    "targetY",
    "textLength",
    "viewBox",
    "viewTarget",
    "xChannelSelector",
    "yChannelSelector",
    "zoomAndPan",
];

/// A rendered attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A boolean attribute, rendered as its bare name.
    Flag,
    /// A value rendered inside quotes.
    Text(String),
}

/// The attribute list a tag actually renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedAttributes {
    entries: Vec<(String, AttributeValue)>,
}

impl NormalizedAttributes {
    /// Normalizes an attribute bag.
    #[must_use]
    pub fn from_attributes(attributes: &Attributes) -> Self {
        let mut entries: Vec<(String, AttributeValue)> = Vec::new();
        let mut classes: Option<(usize, Vec<String>)> = None;
        let mut styles: Option<(usize, IndexMap<String, String>)> = None;

        for (key, value) in attributes {
            match key.as_str() {
                "class" | "className" => {
                    let (_, list) = classes.get_or_insert_with(|| {
                        entries.push(("class".into(), AttributeValue::Flag));
                        (entries.len() - 1, Vec::new())
                    });
                    collect_classes(value, list);
                }
                "style" => {
                    let (_, map) = styles.get_or_insert_with(|| {
                        entries.push(("style".into(), AttributeValue::Flag));
                        (entries.len() - 1, IndexMap::new())
                    });
                    collect_styles(value, map);
                }
                _ => {
                    if let Some(value) = attribute_value(value) {
                        entries.push((attribute_name(key), value));
                    }
                }
            }
        }

        let mut empty = Vec::new();
        if let Some((index, list)) = classes {
            if list.is_empty() {
                empty.push(index);
            } else {
                entries[index].1 = AttributeValue::Text(list.join(" "));
            }
        }
        if let Some((index, map)) = styles {
            if map.is_empty() {
                empty.push(index);
            } else {
                entries[index].1 = AttributeValue::Text(join_styles(&map));
            }
        }
        empty.sort_unstable();
        for index in empty.into_iter().rev() {
            entries.remove(index);
        }

        Self { entries }
    }

    /// Looks up a normalized attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    /// Iterates over the normalized attributes in output order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of attributes that will render.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no attribute will render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends the attributes to an open tag, each preceded by a space.
    pub fn write_to(&self, out: &mut String) {
        for (name, value) in &self.entries {
            out.push(' ');
            out.push_str(name);
            if let AttributeValue::Text(text) = value {
                out.push('=');
                push_quoted(out, text);
            }
        }
    }

    /// The normalized attributes as a JSON object; flags become `true`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        AttributeValue::Flag => Value::Bool(true),
                        AttributeValue::Text(text) => Value::String(text.clone()),
                    };
                    (key.clone(), value)
                })
                .collect(),
        )
    }
}

/// Converts an attribute name to its rendered form.
#[must_use]
pub fn attribute_name(name: &str) -> String {
    if PRESERVED_NAMES.contains(&name) {
        name.into()
    } else {
        kebab_case(name)
    }
}

/// Converts `camelCase` to `kebab-case`. Custom properties (`--x`) are kept.
#[must_use]
pub fn kebab_case(name: &str) -> String {
    if name.starts_with("--") {
        return name.into();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Truthiness the way a script engine judges it.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Collects class names from a class value, skipping duplicates.
pub fn collect_classes(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(text) => text.split_whitespace().for_each(|name| push_class(out, name)),
        Value::Number(number) => push_class(out, &number_text(number)),
        Value::Array(items) => {
            for item in items {
                collect_classes(item, out);
            }
        }
        Value::Object(flags) => {
            for (name, flag) in flags {
                if is_truthy(flag) {
                    name.split_whitespace().for_each(|name| push_class(out, name));
                }
            }
        }
        Value::Null | Value::Bool(_) => {}
    }
}

fn push_class(out: &mut Vec<String>, name: &str) {
    if !out.iter().any(|existing| existing == name) {
        out.push(name.into());
    }
}

/// Collects style declarations, later declarations overriding earlier ones.
pub fn collect_styles(value: &Value, out: &mut IndexMap<String, String>) {
    match value {
        Value::String(text) => {
            for declaration in text.split(';') {
                if let Some((property, value)) = declaration.split_once(':') {
                    let (property, value) = (property.trim(), value.trim());
                    if !property.is_empty() && !value.is_empty() {
                        out.insert(property.into(), value.into());
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_styles(item, out);
            }
        }
        Value::Object(properties) => {
            for (property, value) in properties {
                let value = match value {
                    Value::Null | Value::Bool(false) => continue,
                    Value::String(text) => text.clone(),
                    Value::Number(number) => number_text(number),
                    other => other.to_string(),
                };
                out.insert(kebab_case(property), value);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Prints a JSON number the way text nodes print numbers.
fn number_text(number: &Number) -> String {
    number
        .as_f64()
        .map_or_else(|| number.to_string(), |value| Text::Number(value).to_string())
}

fn join_styles(styles: &IndexMap<String, String>) -> String {
    styles
        .iter()
        .map(|(property, value)| format!("{property}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn attribute_value(value: &Value) -> Option<AttributeValue> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some(AttributeValue::Flag),
        Value::Number(number) => Some(AttributeValue::Text(number_text(number))),
        Value::String(text) => Some(AttributeValue::Text(text.clone())),
        Value::Array(items) => Some(AttributeValue::Text(
            items
                .iter()
                .filter_map(|item| match attribute_value(item)? {
                    AttributeValue::Flag => None,
                    AttributeValue::Text(text) => Some(text),
                })
                .collect::<Vec<_>>()
                .join(" "),
        )),
        Value::Object(_) => Some(AttributeValue::Text(value.to_string())),
    }
}
