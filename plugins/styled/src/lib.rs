//! # recast-styled
//!
//! Scoped styles for `recast`. A node marked with [`Styled::styled`] carries its CSS
//! in metadata; the [`StyledPlugin`] turns that into a generated class name on the
//! rendered element and collects the scoped CSS into one `<style>` block per render.
//!
//! ```
//! use recast_core::{Context, Engine, tag};
//! use recast_styled::{Styled, StyledPlugin};
//!
//! smol::block_on(async {
//!     let mut engine = Engine::new();
//!     engine.use_plugin(StyledPlugin::new()).await.unwrap();
//!
//!     let button = tag("button").styled("& { color: red; }").append(["Go"]);
//!     let html = engine.render_html(button, &Context::new()).await.unwrap();
//!     assert!(html.starts_with(r#"<button class="css-"#));
//!     assert!(html.ends_with("{ color: red; }</style>"));
//! });
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexSet;
use recast_core::compose::PayloadKind;
use recast_core::{Composed, ExprKind, Hooks, Node, Plugin};
use serde_json::{Value, json};

/// Metadata key holding the style entries of a node.
pub const META_KEY: &str = "styled";

/// Replaces every `&` placeholder in `css` with the class selector `.class_name`.
///
/// ```
/// assert_eq!(
///     recast_styled::scope_css("& > a, &:hover { margin: 0 }", "card"),
///     ".card > a, .card:hover { margin: 0 }"
/// );
/// ```
#[must_use]
pub fn scope_css(css: &str, class_name: &str) -> String {
    css.replace('&', &format!(".{class_name}"))
}

/// A class name derived from the CSS text: `css-` followed by 8 hex digits.
///
/// The same CSS always yields the same name.
#[must_use]
pub fn class_name_for(css: &str) -> String {
    // 32-bit FNV-1a
    let hash = css.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    });
    format!("css-{hash:08x}")
}

/// Attaches scoped CSS to tags and components.
pub trait Styled: Sized {
    /// Derives a node carrying `css`. `&` in the CSS stands for the node's
    /// generated class.
    #[must_use]
    fn styled(&self, css: &str) -> Self;
}

impl<K: PayloadKind> Styled for Composed<K> {
    fn styled(&self, css: &str) -> Self {
        let class_name = class_name_for(css);
        let entry = json!({
            "className": class_name,
            "css": scope_css(css, &class_name),
        });
        self.copy(move |payload| {
            let slot = payload
                .meta
                .entry(META_KEY)
                .or_insert_with(|| Value::Array(Vec::new()));
            match slot {
                Value::Array(entries) => entries.push(entry),
                other => *other = Value::Array(vec![entry]),
            }
        })
    }
}

type Sheet = Rc<RefCell<IndexSet<String>>>;

/// Renders style metadata as class names plus one aggregated `<style>` block.
///
/// The collected CSS belongs to the plugin instance and is emptied at the start
/// and end of every render.
#[derive(Debug, Default)]
pub struct StyledPlugin {
    sheet: Sheet,
}

impl StyledPlugin {
    /// Name the plugin registers under.
    pub const NAME: &'static str = "styled";

    /// Creates the plugin with an empty style sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// CSS recorded during the render in progress, in first-seen order.
    #[must_use]
    pub fn recorded(&self) -> Vec<String> {
        self.sheet.borrow().iter().cloned().collect()
    }
}

impl Plugin for StyledPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn setup(&self, hooks: &mut Hooks) -> anyhow::Result<()> {
        for kind in [ExprKind::Tag, ExprKind::Component] {
            let sheet = Rc::clone(&self.sheet);
            hooks.before(kind, move |node| Ok(apply_styles(node, &sheet)));
        }
        Ok(())
    }

    fn render_before(&self, _root: &Node) -> anyhow::Result<Option<Node>> {
        self.sheet.borrow_mut().clear();
        Ok(None)
    }

    fn render_after(&self, _root: &Node, html: &str) -> anyhow::Result<Option<String>> {
        let mut sheet = self.sheet.borrow_mut();
        if sheet.is_empty() {
            return Ok(None);
        }
        let block = format!(
            "<style>{}</style>",
            sheet.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
        );
        tracing::debug!(rules = sheet.len(), "injecting scoped styles");
        sheet.clear();
        Ok(Some(splice_style(html, &block)))
    }
}

fn apply_styles(node: &Node, sheet: &Sheet) -> Option<Node> {
    match node {
        Node::Tag(tag) => with_style_classes(tag, sheet).map(Node::from),
        Node::Component(component) => with_style_classes(component, sheet).map(Node::from),
        _ => None,
    }
}

fn with_style_classes<K: PayloadKind>(node: &Composed<K>, sheet: &Sheet) -> Option<Composed<K>> {
    let entries = node.meta().get(META_KEY)?.as_array()?;
    let mut classes = Vec::new();
    for entry in entries {
        let Some(class_name) = entry.get("className").and_then(Value::as_str) else {
            tracing::warn!(%entry, "style entry without a class name");
            continue;
        };
        classes.push(Value::from(class_name));
        if let Some(css) = entry.get("css").and_then(Value::as_str) {
            sheet.borrow_mut().insert(css.into());
        }
    }
    if classes.is_empty() {
        return None;
    }

    let (key, mut class) = ["class", "className"]
        .into_iter()
        .find_map(|key| node.attribute(key).map(|value| (key, vec![value.clone()])))
        .unwrap_or(("class", Vec::new()));
    class.extend(classes);
    Some(node.with_attribute(key, class))
}

fn splice_style(html: &str, block: &str) -> String {
    ["</head>", "</body>"]
        .into_iter()
        .find_map(|anchor| html.find(anchor))
        .map_or_else(
            || format!("{html}{block}"),
            |index| format!("{}{block}{}", &html[..index], &html[index..]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_core::{Context, Engine, component_named, fragment, tag};

    async fn engine() -> Engine {
        let mut engine = Engine::new();
        engine
            .use_plugin(StyledPlugin::new())
            .await
            .expect("register styled plugin");
        engine
    }

    #[test]
    fn class_names_are_deterministic() {
        let name = class_name_for("& { color: red }");
        assert_eq!(name, class_name_for("& { color: red }"));
        assert_ne!(name, class_name_for("& { color: blue }"));
        assert_eq!(name.len(), "css-".len() + 8);
        assert!(name[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn styled_appends_meta_entries() {
        let node = tag("p").styled("& { a: b }").styled("& { c: d }");
        let entries = node.meta()[META_KEY].as_array().expect("entries array");
        assert_eq!(entries.len(), 2);
        let class_name = class_name_for("& { a: b }");
        assert_eq!(entries[0]["className"], class_name.as_str());
        assert_eq!(entries[0]["css"], format!(".{class_name} {{ a: b }}"));
    }

    #[test]
    fn injects_before_head_close() {
        let css = "& { margin: 0 }";
        let class_name = class_name_for(css);
        let page = tag("html").append([
            Node::from(tag("head")),
            tag("body")
                .append([tag("div").with_attribute("class", "box").styled(css)])
                .into(),
        ]);

        let html = smol::block_on(async {
            let engine = engine().await;
            engine.render_html(page, &Context::new()).await
        })
        .expect("render");
        assert_eq!(
            html,
            format!(
                r#"<html><head><style>.{class_name} {{ margin: 0 }}</style></head><body><div class="box {class_name}"></div></body></html>"#
            )
        );
    }

    #[test]
    fn falls_back_to_body_then_end() {
        let block = "<style>x</style>";
        assert_eq!(
            splice_style("<body><p></p></body>", block),
            "<body><p></p><style>x</style></body>"
        );
        assert_eq!(splice_style("<p></p>", block), "<p></p><style>x</style>");
    }

    #[test]
    fn components_receive_class_prop_and_sheet_resets() {
        let css = "& { padding: 4px }";
        let badge = component_named("Badge", |props, _, _| {
            let class = props.get("class").cloned().unwrap_or_default();
            Ok(tag("span").with_attribute("class", class))
        })
        .styled(css);

        smol::block_on(async {
            let engine = engine().await;
            let first = engine
                .render_html(badge.clone(), &Context::new())
                .await.expect("first render");
            let second = engine
                .render_html(badge, &Context::new())
                .await.expect("second render");
            assert_eq!(first, second);
            assert_eq!(first.matches("<style>").count(), 1);

            let plugin = engine.get_plugin::<StyledPlugin>().expect("registered");
            assert!(plugin.recorded().is_empty());
        });
    }

    #[test]
    fn identical_css_is_recorded_once() {
        let css = "& { gap: 1rem }";
        let list = tag("ul").append([tag("li").styled(css), tag("li").styled(css)]);
        let html = smol::block_on(async {
            let engine = engine().await;
            engine.render_html(list, &Context::new()).await
        })
        .expect("render");
        assert_eq!(html.matches("gap: 1rem").count(), 1);
    }

    #[test]
    fn failed_render_does_not_leak_styles() {
        let broken = component_named("Broken", |_, _, _| -> anyhow::Result<()> {
            anyhow::bail!("no data")
        });
        let failing = fragment([Node::from(tag("p").styled("& { color: red }")), broken.into()]);

        smol::block_on(async {
            let engine = engine().await;
            engine
                .render_html(failing, &Context::new())
                .await
                .expect_err("component fails");
            let html = engine
                .render_html(tag("div"), &Context::new())
                .await
                .expect("plain render");
            assert_eq!(html, "<div></div>");
        });
    }
}
