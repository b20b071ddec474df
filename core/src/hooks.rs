//! Per-expression hooks contributed by plugins.
//!
//! A plugin registers hooks against an [`ExprKind`]. Before hooks see the node
//! before its expression renders it and may replace it; after hooks see the
//! rendered markup and may replace it. Hooks from different plugins run in
//! registration order, each one receiving the previous one's result.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use std::collections::BTreeMap;

use crate::error::Error;
use crate::expr::ExprKind;
use crate::node::Node;

/// Inspects or replaces a node before it renders. `Ok(None)` keeps the node.
pub type BeforeHook = Box<dyn Fn(&Node) -> anyhow::Result<Option<Node>>>;

/// Inspects or replaces rendered markup. `Ok(None)` keeps the markup.
pub type AfterHook = Box<dyn Fn(&Node, &str) -> anyhow::Result<Option<String>>>;

/// Where in the pipeline a hook ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    /// Before an expression rendered a node.
    Before(ExprKind),
    /// After an expression rendered a node.
    After(ExprKind),
    /// Before the whole render.
    RenderBefore,
    /// After the whole render.
    RenderAfter,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before(kind) => write!(f, "before {kind}"),
            Self::After(kind) => write!(f, "after {kind}"),
            Self::RenderBefore => f.write_str("render-before"),
            Self::RenderAfter => f.write_str("render-after"),
        }
    }
}

/// The hooks one plugin registers during setup.
pub struct Hooks {
    plugin: String,
    before: Vec<(ExprKind, BeforeHook)>,
    after: Vec<(ExprKind, AfterHook)>,
}

impl_debug!(Hooks);

impl Hooks {
    pub(crate) fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// The plugin these hooks belong to.
    #[must_use]
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Registers a hook that runs before `kind` renders a node.
    pub fn before<F>(&mut self, kind: ExprKind, hook: F) -> &mut Self
    where
        F: Fn(&Node) -> anyhow::Result<Option<Node>> + 'static,
    {
        self.before.push((kind, Box::new(hook)));
        self
    }

    /// Registers a hook that runs after `kind` rendered a node.
    pub fn after<F>(&mut self, kind: ExprKind, hook: F) -> &mut Self
    where
        F: Fn(&Node, &str) -> anyhow::Result<Option<String>> + 'static,
    {
        self.after.push((kind, Box::new(hook)));
        self
    }

    /// Total number of hooks registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    /// Returns `true` if no hooks were registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Owned<H> {
    plugin: String,
    hook: H,
}

/// Every registered hook, grouped by expression kind.
#[derive(Default)]
pub struct HookPipeline {
    before: BTreeMap<ExprKind, Vec<Owned<BeforeHook>>>,
    after: BTreeMap<ExprKind, Vec<Owned<AfterHook>>>,
}

impl_debug!(HookPipeline);

impl HookPipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one plugin's hooks after every hook already registered.
    pub fn extend(&mut self, hooks: Hooks) {
        let Hooks {
            plugin,
            before,
            after,
        } = hooks;
        for (kind, hook) in before {
            self.before.entry(kind).or_default().push(Owned {
                plugin: plugin.clone(),
                hook,
            });
        }
        for (kind, hook) in after {
            self.after.entry(kind).or_default().push(Owned {
                plugin: plugin.clone(),
                hook,
            });
        }
    }

    /// Runs the before hooks of `kind`, threading the node through them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Hook`] for the first hook that fails.
    pub fn run_before(&self, kind: ExprKind, mut node: Node) -> Result<Node, Error> {
        for owned in self.before.get(&kind).into_iter().flatten() {
            match (owned.hook)(&node) {
                Ok(Some(replacement)) => node = replacement,
                Ok(None) => {}
                Err(cause) => {
                    return Err(Error::Hook {
                        plugin: owned.plugin.clone(),
                        stage: HookStage::Before(kind),
                        cause,
                    });
                }
            }
        }
        Ok(node)
    }

    /// Runs the after hooks of `kind`, threading the markup through them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Hook`] for the first hook that fails.
    pub fn run_after(&self, kind: ExprKind, node: &Node, mut html: String) -> Result<String, Error> {
        for owned in self.after.get(&kind).into_iter().flatten() {
            match (owned.hook)(node, &html) {
                Ok(Some(replacement)) => html = replacement,
                Ok(None) => {}
                Err(cause) => {
                    return Err(Error::Hook {
                        plugin: owned.plugin.clone(),
                        stage: HookStage::After(kind),
                        cause,
                    });
                }
            }
        }
        Ok(html)
    }

    /// Returns `true` if any after hook is registered for `kind`.
    #[must_use]
    pub fn has_after(&self, kind: ExprKind) -> bool {
        self.after.get(&kind).is_some_and(|hooks| !hooks.is_empty())
    }

    /// Returns `true` if any before hook is registered for `kind`.
    #[must_use]
    pub fn has_before(&self, kind: ExprKind) -> bool {
        self.before.get(&kind).is_some_and(|hooks| !hooks.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn before_hooks_thread_the_node() {
        let mut first = Hooks::new("first");
        first.before(ExprKind::Text, |node| {
            Ok(node.as_str().map(|s| Node::from(format!("{s}1"))))
        });
        let mut second = Hooks::new("second");
        second.before(ExprKind::Text, |node| {
            Ok(node.as_str().map(|s| Node::from(format!("{s}2"))))
        });

        let mut pipeline = HookPipeline::new();
        pipeline.extend(first);
        pipeline.extend(second);

        let node = pipeline
            .run_before(ExprKind::Text, Node::from("x"))
            .expect("hooks succeed");
        assert_eq!(node.as_str(), Some("x12"));
        assert!(pipeline.has_before(ExprKind::Text));
        assert!(!pipeline.has_before(ExprKind::Tag));
    }

    #[test]
    fn after_hook_none_keeps_markup() {
        let mut hooks = Hooks::new("noop");
        hooks.after(ExprKind::Raw, |_, _| Ok(None));
        let mut pipeline = HookPipeline::new();
        pipeline.extend(hooks);

        let html = pipeline
            .run_after(ExprKind::Raw, &Node::null(), "<i></i>".into())
            .expect("hook succeeds");
        assert_eq!(html, "<i></i>");
        assert!(pipeline.has_after(ExprKind::Raw));
    }

    #[test]
    fn failing_hook_reports_plugin_and_stage() {
        let mut hooks = Hooks::new("audit");
        hooks.after(ExprKind::Tag, |_, _| Err(anyhow::anyhow!("denied")));
        let mut pipeline = HookPipeline::new();
        pipeline.extend(hooks);

        let error = pipeline
            .run_after(ExprKind::Tag, &Node::null(), String::new())
            .expect_err("hook fails");
        assert!(matches!(
            error,
            Error::Hook { ref plugin, stage: HookStage::After(ExprKind::Tag), .. } if plugin == "audit"
        ));
    }
}
