//! The render driver.
//!
//! An [`Engine`] owns the ordered expression list, the registered plugins with
//! their hooks, and the deferred queue. One call to [`Engine::render`] runs the
//! plugins' whole-render `before` callbacks, walks the tree synchronously, drains
//! the deferred queue until no markers remain, and finally runs the plugins'
//! whole-render `after` callbacks.
//!
//! The queue is instance state cleared at the start of every render, so renders on
//! the same engine must not overlap.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use futures::future;

use crate::compose::Patch;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::Error;
use crate::escape::escape_html;
use crate::expr::{self, Expression};
use crate::hooks::{HookPipeline, HookStage, Hooks};
use crate::node::{Node, Pending};
use crate::plugin::Plugin;
use crate::queue::{self, DeferredQueue};

/// How many times in a row before hooks may change a node's kind before the render
/// fails with [`Error::Redispatch`].
pub const REDISPATCH_LIMIT: usize = 32;

/// Output of a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The final markup.
    pub html: String,
}

/// Handle given to expressions for rendering nested values.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    engine: &'a Engine,
}

impl RenderContext<'_> {
    /// Renders a nested value through the full dispatch, hooks included.
    ///
    /// # Errors
    ///
    /// Propagates any error raised while rendering `node`.
    pub fn render(&self, node: Node, user: &Context) -> Result<String, Error> {
        self.engine.walk(node, user)
    }

    /// Renders several values and concatenates the results in order.
    ///
    /// # Errors
    ///
    /// Stops at the first value that fails.
    pub fn render_all<I>(&self, nodes: I, user: &Context) -> Result<String, Error>
    where
        I: IntoIterator<Item = Node>,
    {
        nodes.into_iter().try_fold(String::new(), |mut html, node| {
            html.push_str(&self.render(node, user)?);
            Ok(html)
        })
    }

    /// Registers a pending value and returns the marker to emit in its place.
    #[must_use]
    pub fn defer(&self, pending: Pending, user: &Context) -> String {
        self.engine.queue.register(pending, user)
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.engine.config
    }
}

/// Renders node trees to markup.
pub struct Engine {
    config: EngineConfig,
    expressions: Vec<Box<dyn Expression>>,
    plugins: Vec<Box<dyn Plugin>>,
    hooks: HookPipeline,
    queue: DeferredQueue,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field(
                "expressions",
                &self.expressions.iter().map(|e| e.kind()).collect::<Vec<_>>(),
            )
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            expressions: expr::builtin(),
            plugins: Vec::new(),
            hooks: HookPipeline::new(),
            queue: DeferredQueue::new(),
        }
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers a plugin: checks its name, lets it register hooks, then awaits its
    /// preparation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicatePlugin`] if a plugin of the same name is already
    /// registered, or [`Error::PluginSetup`] if setup or preparation fails. The
    /// engine is unchanged in both cases.
    pub async fn use_plugin<P: Plugin>(&mut self, plugin: P) -> Result<(), Error> {
        self.use_boxed_plugin(Box::new(plugin)).await
    }

    /// Registers several plugins in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`Engine::use_plugin`]. Plugins before the failing one stay registered.
    pub async fn use_plugins<I>(&mut self, plugins: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Box<dyn Plugin>>,
    {
        for plugin in plugins {
            self.use_boxed_plugin(plugin).await?;
        }
        Ok(())
    }

    async fn use_boxed_plugin(&mut self, plugin: Box<dyn Plugin>) -> Result<(), Error> {
        let name = String::from(plugin.name());
        if self.plugin_by_name(&name).is_some() {
            return Err(Error::DuplicatePlugin(name));
        }

        let mut hooks = Hooks::new(name.clone());
        plugin.setup(&mut hooks).map_err(|cause| Error::PluginSetup {
            name: name.clone(),
            cause,
        })?;
        plugin.prepare().await.map_err(|cause| Error::PluginSetup {
            name: name.clone(),
            cause,
        })?;

        tracing::info!(plugin = %name, hooks = hooks.len(), "plugin registered");
        self.hooks.extend(hooks);
        self.plugins.push(plugin);
        Ok(())
    }

    /// Looks up a registered plugin by name.
    #[must_use]
    pub fn plugin_by_name(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .map(AsRef::as_ref)
            .find(|plugin| plugin.name() == name)
    }

    /// Looks up a registered plugin by type.
    #[must_use]
    pub fn get_plugin<P: Plugin>(&self) -> Option<&P> {
        self.plugins.iter().find_map(|plugin| {
            let plugin: &dyn Plugin = plugin.as_ref();
            let any: &dyn Any = plugin;
            any.downcast_ref::<P>()
        })
    }

    /// Names of the registered plugins, in registration order.
    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|plugin| plugin.name())
    }

    /// Derives a modified copy of `node` through the expression that owns it.
    ///
    /// Returns `None` if no expression owns the node or its kind has no copy
    /// operation.
    #[must_use]
    pub fn copy(&self, node: &Node, patch: &Patch) -> Option<Node> {
        self.owner(node)?.copy(node, patch)
    }

    /// Renders `node` with the given user context.
    ///
    /// # Errors
    ///
    /// Errors from components, deferred functions, hooks and plugin callbacks
    /// propagate out unchanged. Rejected futures do not fail the render; they are
    /// replaced by an error comment.
    pub async fn render(&self, node: Node, user: &Context) -> Result<Rendered, Error> {
        self.queue.clear();
        tracing::debug!(kind = node.kind_name(), "render started");

        let mut root = node;
        for plugin in &self.plugins {
            let replaced = plugin
                .render_before(&root)
                .map_err(|cause| Error::Hook {
                    plugin: plugin.name().into(),
                    stage: HookStage::RenderBefore,
                    cause,
                })?;
            if let Some(replaced) = replaced {
                root = replaced;
            }
        }

        let html = self.walk(root.clone(), user);
        let mut html = match html {
            Ok(html) => self.drain(html).await?,
            Err(error) => {
                self.queue.clear();
                return Err(error);
            }
        };

        for plugin in &self.plugins {
            let replaced = plugin
                .render_after(&root, &html)
                .map_err(|cause| Error::Hook {
                    plugin: plugin.name().into(),
                    stage: HookStage::RenderAfter,
                    cause,
                })?;
            if let Some(replaced) = replaced {
                html = replaced;
            }
        }

        tracing::debug!(len = html.len(), "render finished");
        Ok(Rendered { html })
    }

    /// Renders `node` with the given user context and returns only the markup.
    ///
    /// # Errors
    ///
    /// See [`Engine::render`].
    pub async fn render_html(
        &self,
        node: impl Into<Node>,
        user: &Context,
    ) -> Result<String, Error> {
        Ok(self.render(node.into(), user).await?.html)
    }

    fn owner(&self, node: &Node) -> Option<&dyn Expression> {
        self.expressions
            .iter()
            .map(AsRef::as_ref)
            .find(|expression| expression.is(node))
    }

    fn walk(&self, mut node: Node, user: &Context) -> Result<String, Error> {
        let mut redispatches = 0;
        let (expression, kind, node) = loop {
            let Some(expression) = self.owner(&node) else {
                return self.fallback(&node);
            };
            let kind = expression.kind();

            node = self.hooks.run_before(kind, node)?;
            if expression.is(&node) {
                break (expression, kind, node);
            }
            redispatches += 1;
            if redispatches > REDISPATCH_LIMIT {
                return Err(Error::Redispatch(REDISPATCH_LIMIT));
            }
            tracing::trace!(
                from = kind.name(),
                to = node.kind_name(),
                "before hook changed node kind, dispatching again"
            );
        };

        let cx = RenderContext { engine: self };
        if self.hooks.has_after(kind) {
            let html = expression.render(node.clone(), &cx, user)?;
            self.hooks.run_after(kind, &node, html)
        } else {
            expression.render(node, &cx, user)
        }
    }

    fn fallback(&self, node: &Node) -> Result<String, Error> {
        if self.config.strict {
            return Err(Error::Unmatched(node.kind_name()));
        }
        tracing::warn!(kind = node.kind_name(), "no expression matches node, rendering as text");
        Ok(escape_html(&node.coerce_text()))
    }

    async fn drain(&self, mut html: String) -> Result<String, Error> {
        let mut rounds = 0;
        loop {
            let batch = self.queue.take();
            if batch.is_empty() {
                return Ok(html);
            }
            if let Some(limit) = self.config.drain_limit {
                if rounds >= limit {
                    self.queue.clear();
                    return Err(Error::DrainLimit(limit));
                }
            }
            rounds += 1;
            tracing::debug!(round = rounds, pending = batch.len(), "draining deferred values");

            let settlements =
                future::join_all(batch.iter().map(|entry| entry.pending.settle())).await;

            for (entry, settlement) in batch.iter().zip(settlements) {
                let rendered = settlement
                    .map_err(|rejection| String::from(rejection.message()))
                    .and_then(|node| {
                        self.walk(node, &entry.context)
                            .map_err(|error| error.to_string())
                    });
                let replacement = rendered.unwrap_or_else(|message| {
                    tracing::warn!(%message, "deferred value failed");
                    queue::error_comment(&message)
                });
                html = html.replace(&entry.marker, &replacement);
            }
        }
    }
}
