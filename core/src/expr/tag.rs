use alloc::string::String;
use core::fmt::Write;

use crate::compose::Patch;
use crate::context::Context;
use crate::engine::RenderContext;
use crate::error::Error;
use crate::expr::{ExprKind, Expression};
use crate::node::Node;

/// Renders markup elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagExpression;

impl Expression for TagExpression {
    fn kind(&self) -> ExprKind {
        ExprKind::Tag
    }

    fn is(&self, node: &Node) -> bool {
        matches!(node, Node::Tag(_))
    }

    fn render(&self, node: Node, cx: &RenderContext<'_>, user: &Context) -> Result<String, Error> {
        let tag = match node {
            Node::Tag(tag) => tag,
            other => return Err(Error::mismatch(self.kind(), &other)),
        };

        let mut html = String::new();
        html.push('<');
        html.push_str(tag.tag_name());
        tag.normalized_attributes().write_to(&mut html);

        if tag.is_void() {
            if !tag.children().is_empty() {
                tracing::debug!(
                    tag = tag.tag_name(),
                    children = tag.children().len(),
                    "ignoring children of void element"
                );
            }
            html.push_str(" />");
            return Ok(html);
        }

        html.push('>');
        html.push_str(&cx.render_all(tag.children().iter().cloned(), user)?);
        let _ = write!(html, "</{}>", tag.tag_name());
        Ok(html)
    }

    fn copy(&self, node: &Node, patch: &Patch) -> Option<Node> {
        match node {
            Node::Tag(tag) => Some(tag.patched(patch).into()),
            _ => None,
        }
    }
}
