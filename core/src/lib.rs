//! # recast-core
//!
//! The document-rendering core of `recast`: a node model, an immutable composition
//! layer for tags and components, per-kind expression strategies, a deferred queue
//! for values that settle later, and a plugin hook pipeline, all driven by an
//! [`Engine`].
//!
//! ```
//! use recast_core::{Context, Engine, Node, component_named, tag};
//!
//! let greeting = component_named("Greeting", |props, _children, _cx| {
//!     let name = props.get("name").and_then(|v| v.as_str()).unwrap_or("world");
//!     Ok(tag("p").append([format!("Hello, {name}!")]))
//! });
//!
//! let page = tag("main").append([
//!     Node::from(greeting.with_attribute("name", "<Ada>")),
//!     Node::future(async { Ok::<_, std::io::Error>("later") }),
//! ]);
//!
//! let engine = Engine::new();
//! let rendered = smol::block_on(engine.render(page.into(), &Context::new())).unwrap();
//! assert_eq!(rendered.html, "<main><p>Hello, &lt;Ada&gt;!</p>later</main>");
//! ```
#![allow(clippy::future_not_send)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod attributes;
pub mod component;
pub mod compose;
pub mod config;
pub mod context;
pub mod engine;
/// Error types for rendering and plugin registration.
pub mod error;
pub mod escape;
pub mod expr;
pub mod hooks;
pub mod node;
pub mod plugin;
pub mod queue;
pub mod tag;

#[cfg(test)]
mod tests;

pub use attributes::{Attributes, Meta};
pub use component::{Component, ComponentId, component, component_named};
pub use compose::{Composed, Patch, Property, Template};
pub use config::EngineConfig;
pub use context::{ComponentScope, Context};
pub use engine::{Engine, RenderContext, Rendered};
pub use error::{Error, Rejection};
pub use expr::{ExprKind, Expression};
pub use hooks::{HookStage, Hooks};
pub use node::{
    Deferred, Fragment, Ignored, Node, Opaque, Pending, Raw, Settlement, Text, deferred, fragment,
    raw,
};
pub use plugin::Plugin;
pub use tag::{Tag, tag};
