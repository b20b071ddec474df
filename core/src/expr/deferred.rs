use alloc::string::String;

use crate::context::Context;
use crate::engine::RenderContext;
use crate::error::Error;
use crate::expr::{ExprKind, Expression};
use crate::node::Node;

/// Calls deferred functions with the user context and renders what they return.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeferredExpression;

impl Expression for DeferredExpression {
    fn kind(&self) -> ExprKind {
        ExprKind::Deferred
    }

    fn is(&self, node: &Node) -> bool {
        matches!(node, Node::Deferred(_))
    }

    fn render(&self, node: Node, cx: &RenderContext<'_>, user: &Context) -> Result<String, Error> {
        match node {
            Node::Deferred(deferred) => {
                let output = deferred.call(user).map_err(Error::Deferred)?;
                cx.render(output, user)
            }
            other => Err(Error::mismatch(self.kind(), &other)),
        }
    }
}
