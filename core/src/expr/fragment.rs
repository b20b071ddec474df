use alloc::string::String;

use crate::compose::Patch;
use crate::context::Context;
use crate::engine::RenderContext;
use crate::error::Error;
use crate::expr::{ExprKind, Expression};
use crate::node::{Fragment, Node};

/// Renders groupings as their concatenated children.
#[derive(Debug, Default, Clone, Copy)]
pub struct FragmentExpression;

impl Expression for FragmentExpression {
    fn kind(&self) -> ExprKind {
        ExprKind::Fragment
    }

    fn is(&self, node: &Node) -> bool {
        matches!(node, Node::Fragment(_))
    }

    fn render(&self, node: Node, cx: &RenderContext<'_>, user: &Context) -> Result<String, Error> {
        match node {
            Node::Fragment(fragment) => cx.render_all(fragment.into_children(), user),
            other => Err(Error::mismatch(self.kind(), &other)),
        }
    }

    fn copy(&self, node: &Node, patch: &Patch) -> Option<Node> {
        match node {
            Node::Fragment(fragment) => Some(
                patch
                    .children
                    .clone()
                    .map_or_else(|| fragment.clone(), Fragment::new)
                    .into(),
            ),
            _ => None,
        }
    }
}
