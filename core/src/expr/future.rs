use alloc::string::String;

use crate::context::Context;
use crate::engine::RenderContext;
use crate::error::Error;
use crate::expr::{ExprKind, Expression};
use crate::node::Node;

/// Registers pending values with the deferred queue and renders their marker.
///
/// The walk never waits here: the marker is substituted once the engine drains
/// the queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FutureExpression;

impl Expression for FutureExpression {
    fn kind(&self) -> ExprKind {
        ExprKind::Future
    }

    fn is(&self, node: &Node) -> bool {
        matches!(node, Node::Future(_))
    }

    fn render(&self, node: Node, cx: &RenderContext<'_>, user: &Context) -> Result<String, Error> {
        match node {
            Node::Future(pending) => Ok(cx.defer(pending, user)),
            other => Err(Error::mismatch(self.kind(), &other)),
        }
    }
}
