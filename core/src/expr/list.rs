use alloc::string::String;

use crate::context::Context;
use crate::engine::RenderContext;
use crate::error::Error;
use crate::expr::{ExprKind, Expression};
use crate::node::Node;

/// Renders ordered lists as their concatenated items.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListExpression;

impl Expression for ListExpression {
    fn kind(&self) -> ExprKind {
        ExprKind::List
    }

    fn is(&self, node: &Node) -> bool {
        matches!(node, Node::List(_))
    }

    fn render(&self, node: Node, cx: &RenderContext<'_>, user: &Context) -> Result<String, Error> {
        match node {
            Node::List(items) => cx.render_all(items, user),
            other => Err(Error::mismatch(self.kind(), &other)),
        }
    }
}
