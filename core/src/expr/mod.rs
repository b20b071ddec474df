//! Expression strategies: one per node kind.
//!
//! An [`Expression`] knows how to recognize its kind of [`Node`] and how to render
//! it. The engine keeps the built-in expressions in a fixed order and hands every
//! value to the first one whose [`Expression::is`] accepts it:
//!
//! component → tag → fragment → deferred → ignored → text → raw → list → future
//!
//! Plugins attach hooks to an expression by its [`ExprKind`].

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::compose::Patch;
use crate::context::Context;
use crate::engine::RenderContext;
use crate::error::Error;
use crate::node::Node;

mod component;
mod deferred;
mod fragment;
mod future;
mod ignored;
mod list;
mod raw;
mod tag;
mod text;

pub use component::ComponentExpression;
pub use deferred::DeferredExpression;
pub use fragment::FragmentExpression;
pub use future::FutureExpression;
pub use ignored::IgnoredExpression;
pub use list::ListExpression;
pub use raw::RawExpression;
pub use tag::TagExpression;
pub use text::TextExpression;

/// Identifies an expression strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExprKind {
    /// Component descriptors.
    Component,
    /// Markup elements.
    Tag,
    /// Groupings without wrapping markup.
    Fragment,
    /// Functions of the user context.
    Deferred,
    /// Primitives that render to nothing.
    Ignored,
    /// Strings and numbers.
    Text,
    /// Trusted markup.
    Raw,
    /// Ordered lists.
    List,
    /// Values that are not available yet.
    Future,
}

impl ExprKind {
    /// Every kind, in dispatch order.
    pub const ORDER: [Self; 9] = [
        Self::Component,
        Self::Tag,
        Self::Fragment,
        Self::Deferred,
        Self::Ignored,
        Self::Text,
        Self::Raw,
        Self::List,
        Self::Future,
    ];

    /// The kind's name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Tag => "tag",
            Self::Fragment => "fragment",
            Self::Deferred => "deferred",
            Self::Ignored => "ignored",
            Self::Text => "text",
            Self::Raw => "raw",
            Self::List => "list",
            Self::Future => "future",
        }
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.name())
    }
}

/// Recognition and rendering for one kind of node.
pub trait Expression: 'static {
    /// Which kind this expression owns.
    fn kind(&self) -> ExprKind;

    /// Returns `true` if this expression renders `node`.
    fn is(&self, node: &Node) -> bool;

    /// Renders `node` to markup.
    ///
    /// Children are rendered through `cx`, which runs the full dispatch (hooks
    /// included) for each of them.
    ///
    /// # Errors
    ///
    /// Returns an error if a component, deferred function or hook fails somewhere
    /// below `node`, or if `node` is not of this expression's kind.
    fn render(&self, node: Node, cx: &RenderContext<'_>, user: &Context) -> Result<String, Error>;

    /// Derives a modified copy of `node`. Kinds without a copy operation return `None`.
    fn copy(&self, node: &Node, patch: &Patch) -> Option<Node> {
        let _ = (node, patch);
        None
    }
}

/// The built-in expressions, in dispatch order.
#[must_use]
pub fn builtin() -> Vec<Box<dyn Expression>> {
    vec![
        Box::new(ComponentExpression),
        Box::new(TagExpression),
        Box::new(FragmentExpression),
        Box::new(DeferredExpression),
        Box::new(IgnoredExpression),
        Box::new(TextExpression),
        Box::new(RawExpression),
        Box::new(ListExpression),
        Box::new(FutureExpression),
    ]
}
