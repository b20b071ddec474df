use alloc::string::String;

use crate::context::Context;
use crate::engine::RenderContext;
use crate::error::Error;
use crate::expr::{ExprKind, Expression};
use crate::node::{Node, Text};

/// Renders ignorable primitives, NaN included, as nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoredExpression;

impl Expression for IgnoredExpression {
    fn kind(&self) -> ExprKind {
        ExprKind::Ignored
    }

    fn is(&self, node: &Node) -> bool {
        match node {
            Node::Ignored(_) => true,
            Node::Text(text) => text.is_nan(),
            _ => false,
        }
    }

    fn render(&self, node: Node, _cx: &RenderContext<'_>, _user: &Context) -> Result<String, Error> {
        match node {
            Node::Ignored(_) | Node::Text(Text::Number(_)) => Ok(String::new()),
            other => Err(Error::mismatch(self.kind(), &other)),
        }
    }
}
