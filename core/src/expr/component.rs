use alloc::string::String;

use crate::compose::Patch;
use crate::context::{ComponentScope, Context};
use crate::engine::RenderContext;
use crate::error::Error;
use crate::expr::{ExprKind, Expression};
use crate::node::Node;

/// Renders component descriptors by invoking their render function.
///
/// The render function receives the user context extended with a
/// [`ComponentScope`]; the same extended context is used for everything the
/// component returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentExpression;

impl Expression for ComponentExpression {
    fn kind(&self) -> ExprKind {
        ExprKind::Component
    }

    fn is(&self, node: &Node) -> bool {
        matches!(node, Node::Component(_))
    }

    fn render(&self, node: Node, cx: &RenderContext<'_>, user: &Context) -> Result<String, Error> {
        let component = match node {
            Node::Component(component) => component,
            other => return Err(Error::mismatch(self.kind(), &other)),
        };

        let scope = user.clone().with(ComponentScope {
            id: component.id(),
        });
        let output = component
            .render(&scope)
            .map_err(|cause| Error::Component {
                name: component.display_name().into(),
                cause,
            })?;
        cx.render(output, &scope)
    }

    fn copy(&self, node: &Node, patch: &Patch) -> Option<Node> {
        match node {
            Node::Component(component) => Some(component.patched(patch).into()),
            _ => None,
        }
    }
}
