#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::future_not_send)]

pub mod log;

#[doc(inline)]
pub use recast_core::*;
pub use recast_styled as styled;

pub mod prelude {
    //! The types most documents are built from.
    //!
    //! ```rust
    //! use recast::prelude::*;
    //!
    //! let page = tag("main").styled("& { margin: 0 auto }").append(["Hi"]);
    //! let _: Node = page.into();
    //! ```
    pub use recast_core::{
        Component, Context, Engine, EngineConfig, Error, ExprKind, Hooks, Node, Pending, Plugin,
        Rejection, Tag, Template, component, component_named, deferred, fragment, raw, tag,
    };
    pub use recast_styled::{Styled, StyledPlugin};
}
