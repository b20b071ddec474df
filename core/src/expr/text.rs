use alloc::string::{String, ToString};

use crate::context::Context;
use crate::engine::RenderContext;
use crate::error::Error;
use crate::escape::escape_html;
use crate::expr::{ExprKind, Expression};
use crate::node::Node;

/// Renders strings and numbers, escaped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextExpression;

impl Expression for TextExpression {
    fn kind(&self) -> ExprKind {
        ExprKind::Text
    }

    fn is(&self, node: &Node) -> bool {
        matches!(node, Node::Text(text) if !text.is_nan())
    }

    fn render(&self, node: Node, _cx: &RenderContext<'_>, _user: &Context) -> Result<String, Error> {
        match node {
            Node::Text(text) => Ok(escape_html(&text.to_string())),
            other => Err(Error::mismatch(self.kind(), &other)),
        }
    }
}
