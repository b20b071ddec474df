//! The renderable value model.
//!
//! A [`Node`] is one of a fixed set of kinds. Each kind is owned by exactly one
//! [`Expression`](crate::expr::Expression); the engine walks a tree of nodes and
//! hands each value to the expression that claims it.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::future::Future;
use std::time::SystemTime;

use futures::future::{self, FutureExt, LocalBoxFuture, Shared};

use crate::{Component, Context, Rejection, Tag};

/// A single renderable value.
#[derive(Clone)]
pub enum Node {
    /// A markup element such as `<div>`.
    Tag(Tag),
    /// A reusable component descriptor.
    Component(Component),
    /// A grouping of children with no wrapping markup.
    Fragment(Fragment),
    /// A function evaluated against the user context at render time.
    Deferred(Deferred),
    /// A primitive that renders to nothing.
    Ignored(Ignored),
    /// Text or a number, escaped on output.
    Text(Text),
    /// Trusted markup emitted verbatim.
    Raw(Raw),
    /// An ordered list of nodes.
    List(Vec<Node>),
    /// A value that is not available yet.
    Future(Pending),
    /// A host value no built-in expression claims.
    Opaque(Opaque),
}

impl Node {
    /// Wraps a future that settles with a node (or anything convertible into one).
    pub fn future<F, T, E>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + 'static,
        T: Into<Self> + 'static,
        E: fmt::Display + 'static,
    {
        Self::Future(Pending::new(future))
    }

    /// Wraps a host value that only knows how to print itself.
    pub fn opaque(value: impl fmt::Display + 'static) -> Self {
        Self::Opaque(Opaque(Rc::new(value)))
    }

    /// The `undefined` primitive.
    #[must_use]
    pub const fn undefined() -> Self {
        Self::Ignored(Ignored::Undefined)
    }

    /// The `null` primitive.
    #[must_use]
    pub const fn null() -> Self {
        Self::Ignored(Ignored::Null)
    }

    /// A short, stable name for the node's kind, used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Tag(_) => "tag",
            Self::Component(_) => "component",
            Self::Fragment(_) => "fragment",
            Self::Deferred(_) => "deferred",
            Self::Ignored(_) => "ignored",
            Self::Text(_) => "text",
            Self::Raw(_) => "raw",
            Self::List(_) => "list",
            Self::Future(_) => "future",
            Self::Opaque(_) => "opaque",
        }
    }

    /// Borrows the text content if this is a text node.
    #[must_use]
    pub const fn as_text(&self) -> Option<&Text> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Borrows the string if this is a string text node.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(Text::Str(text)) => Some(text),
            _ => None,
        }
    }

    /// Text used when a node reaches the engine without a matching expression.
    ///
    /// Mirrors a generic string conversion: values that can print themselves do so,
    /// everything else prints as an object placeholder.
    #[must_use]
    pub fn coerce_text(&self) -> String {
        match self {
            Self::Opaque(value) => value.to_string(),
            Self::Text(text) => text.to_string(),
            Self::Raw(raw) => raw.as_str().into(),
            other => format!("[object {}]", other.kind_name()),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => fmt::Debug::fmt(tag, f),
            Self::Component(component) => fmt::Debug::fmt(component, f),
            Self::Fragment(fragment) => fmt::Debug::fmt(fragment, f),
            Self::Deferred(deferred) => fmt::Debug::fmt(deferred, f),
            Self::Ignored(ignored) => fmt::Debug::fmt(ignored, f),
            Self::Text(text) => fmt::Debug::fmt(text, f),
            Self::Raw(raw) => fmt::Debug::fmt(raw, f),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Future(pending) => fmt::Debug::fmt(pending, f),
            Self::Opaque(opaque) => fmt::Debug::fmt(opaque, f),
        }
    }
}

/// Primitives that render to the empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum Ignored {
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// `true` or `false`.
    Bool(bool),
    /// A symbol-like value, carrying its description.
    Symbol(String),
    /// A big integer.
    BigInt(i128),
    /// Not-a-number.
    NaN,
    /// A point in time.
    Date(SystemTime),
    /// A regular-expression-like pattern.
    Pattern(String),
}

/// Text content: a string or a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Text {
    /// A string.
    Str(String),
    /// A number, printed the way a script engine would print it.
    Number(f64),
}

impl Text {
    /// Returns `true` for a NaN number, which renders as an ignored primitive.
    #[must_use]
    pub const fn is_nan(&self) -> bool {
        matches!(self, Self::Number(n) if n.is_nan())
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => f.write_str(text),
            Self::Number(number) => format_number(*number, f),
        }
    }
}

// Shortest round-trip digits; exponent form outside [1e-6, 1e21) with an
// explicit sign on positive exponents.
fn format_number(value: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if value.is_nan() {
        f.write_str("NaN")
    } else if value.is_infinite() {
        f.write_str(if value > 0.0 { "Infinity" } else { "-Infinity" })
    } else if value == 0.0 {
        f.write_str("0")
    } else if (1e-6..1e21).contains(&value.abs()) {
        write!(f, "{value}")
    } else {
        let exponent = format!("{value:e}");
        match exponent.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                write!(f, "{mantissa}e+{power}")
            }
            _ => f.write_str(&exponent),
        }
    }
}

/// Trusted markup, emitted without escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw(String);

impl Raw {
    /// Wraps trusted markup.
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// The stored markup.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Creates a raw-markup node. The content is emitted verbatim.
pub fn raw(markup: impl Into<String>) -> Raw {
    Raw::new(markup)
}

/// A grouping of children rendered back to back.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    children: Vec<Node>,
}

impl Fragment {
    /// Creates a fragment from its children.
    #[must_use]
    pub const fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// The fragment's children.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Consumes the fragment, returning its children.
    #[must_use]
    pub fn into_children(self) -> Vec<Node> {
        self.children
    }
}

/// Creates a fragment from anything convertible into nodes.
pub fn fragment<I>(children: I) -> Fragment
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    Fragment::new(children.into_iter().map(Into::into).collect())
}

type DeferredFn = dyn Fn(&Context) -> anyhow::Result<Node>;

/// A function evaluated with the user context when the walk reaches it.
#[derive(Clone)]
pub struct Deferred(Rc<DeferredFn>);

impl_debug!(Deferred);

impl Deferred {
    /// Wraps a function producing a node.
    pub fn new<F, T>(f: F) -> Self
    where
        F: Fn(&Context) -> anyhow::Result<T> + 'static,
        T: Into<Node> + 'static,
    {
        Self(Rc::new(move |cx: &Context| f(cx).map(Into::into)))
    }

    /// Evaluates the function.
    ///
    /// # Errors
    ///
    /// Returns whatever error the wrapped function returns.
    pub fn call(&self, cx: &Context) -> anyhow::Result<Node> {
        (self.0)(cx)
    }
}

/// Creates a deferred-function node.
pub fn deferred<F, T>(f: F) -> Deferred
where
    F: Fn(&Context) -> anyhow::Result<T> + 'static,
    T: Into<Node> + 'static,
{
    Deferred::new(f)
}

/// Outcome of a [`Pending`] value.
pub type Settlement = Result<Node, Rejection>;

/// A value that will become a node later.
///
/// Backed by a shared future: clones observe the same settlement, so one pending
/// value may appear in several places of a tree.
#[derive(Clone)]
pub struct Pending(Shared<LocalBoxFuture<'static, Settlement>>);

impl_debug!(Pending);

impl Pending {
    /// Wraps a fallible future.
    pub fn new<F, T, E>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + 'static,
        T: Into<Node> + 'static,
        E: fmt::Display + 'static,
    {
        Self(
            async move {
                future
                    .await
                    .map(Into::into)
                    .map_err(|err| Rejection::from_display(&err))
            }
            .boxed_local()
            .shared(),
        )
    }

    /// A pending value that is already resolved.
    pub fn resolved(node: impl Into<Node>) -> Self {
        Self(future::ready(Ok(node.into())).boxed_local().shared())
    }

    /// A pending value that is already rejected.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self(
            future::ready(Err(Rejection::new(message)))
                .boxed_local()
                .shared(),
        )
    }

    /// Waits for the settlement.
    pub async fn settle(&self) -> Settlement {
        self.0.clone().await
    }
}

/// A host value that only knows how to print itself.
#[derive(Clone)]
pub struct Opaque(Rc<dyn fmt::Display>);

impl_debug!(Opaque);

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::Text(Text::Str(value.into()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::Text(Text::Str(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Text(Text::Number(value))
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
                fn from(value: $ty) -> Self {
                    Self::Text(Text::Number(value as f64))
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64, usize);

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Ignored(Ignored::Bool(value))
    }
}

impl From<()> for Node {
    fn from((): ()) -> Self {
        Self::undefined()
    }
}

impl From<Ignored> for Node {
    fn from(value: Ignored) -> Self {
        Self::Ignored(value)
    }
}

impl From<Text> for Node {
    fn from(value: Text) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::undefined, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Node {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<Raw> for Node {
    fn from(value: Raw) -> Self {
        Self::Raw(value)
    }
}

impl From<Fragment> for Node {
    fn from(value: Fragment) -> Self {
        Self::Fragment(value)
    }
}

impl From<Deferred> for Node {
    fn from(value: Deferred) -> Self {
        Self::Deferred(value)
    }
}

impl From<Pending> for Node {
    fn from(value: Pending) -> Self {
        Self::Future(value)
    }
}
