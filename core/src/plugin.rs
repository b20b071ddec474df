//! Plugins extend an engine with hooks and whole-render callbacks.
//!
//! ```
//! use recast_core::{Context, Engine, ExprKind, Hooks, Plugin, tag};
//!
//! struct Upper;
//!
//! impl Plugin for Upper {
//!     fn name(&self) -> &str {
//!         "upper"
//!     }
//!
//!     fn setup(&self, hooks: &mut Hooks) -> anyhow::Result<()> {
//!         hooks.after(ExprKind::Text, |_, html| Ok(Some(html.to_uppercase())));
//!         Ok(())
//!     }
//! }
//!
//! smol::block_on(async {
//!     let mut engine = Engine::new();
//!     engine.use_plugin(Upper).await.unwrap();
//!     let node = tag("p").append(["hi"]);
//!     assert_eq!(engine.render_html(node, &Context::new()).await.unwrap(), "<p>HI</p>");
//! });
//! ```

use alloc::string::String;
use core::any::Any;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::hooks::Hooks;
use crate::node::Node;

/// An engine extension.
///
/// Plugins are identified by [`name`](Plugin::name); an engine holds at most one
/// plugin per name.
pub trait Plugin: Any {
    /// Unique name of the plugin.
    fn name(&self) -> &str;

    /// Registers the plugin's expression hooks.
    ///
    /// # Errors
    ///
    /// A failure aborts registration; the engine is left unchanged.
    fn setup(&self, hooks: &mut Hooks) -> anyhow::Result<()> {
        let _ = hooks;
        Ok(())
    }

    /// Asynchronous preparation awaited once during registration, after setup.
    fn prepare(&self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        future::ready(Ok(())).boxed_local()
    }

    /// Runs before every render with the root node. May replace the root.
    ///
    /// # Errors
    ///
    /// A failure aborts the render.
    fn render_before(&self, root: &Node) -> anyhow::Result<Option<Node>> {
        let _ = root;
        Ok(None)
    }

    /// Runs after every render, once all deferred values were substituted. May
    /// replace the final markup.
    ///
    /// # Errors
    ///
    /// A failure aborts the render.
    fn render_after(&self, root: &Node, html: &str) -> anyhow::Result<Option<String>> {
        let _ = (root, html);
        Ok(None)
    }
}
