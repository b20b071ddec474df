use alloc::string::String;

use crate::context::Context;
use crate::engine::RenderContext;
use crate::error::Error;
use crate::expr::{ExprKind, Expression};
use crate::node::Node;

/// Emits trusted markup verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawExpression;

impl Expression for RawExpression {
    fn kind(&self) -> ExprKind {
        ExprKind::Raw
    }

    fn is(&self, node: &Node) -> bool {
        matches!(node, Node::Raw(_))
    }

    fn render(&self, node: Node, _cx: &RenderContext<'_>, _user: &Context) -> Result<String, Error> {
        match node {
            Node::Raw(raw) => Ok(raw.as_str().into()),
            other => Err(Error::mismatch(self.kind(), &other)),
        }
    }
}
