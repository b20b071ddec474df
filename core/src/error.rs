//! Error types produced by the rendering engine.

use core::fmt;

use thiserror::Error;

use crate::{expr::ExprKind, hooks::HookStage};

/// Errors that abort a render call or a plugin registration.
///
/// Failures inside user callbacks (component render functions, deferred nodes,
/// hooks, plugin setup) are carried as [`anyhow::Error`] and wrapped with the
/// context of where they happened.
#[derive(Debug, Error)]
pub enum Error {
    /// A plugin with the same name was already registered on the engine.
    #[error("a plugin named `{0}` is already registered")]
    DuplicatePlugin(String),
    /// A plugin failed while registering its hooks or preparing itself.
    #[error("plugin `{name}` failed to set up: {cause}")]
    PluginSetup {
        /// Name of the failing plugin.
        name: String,
        /// The underlying failure.
        cause: anyhow::Error,
    },
    /// A component render function returned an error.
    #[error("component `{name}` failed to render: {cause}")]
    Component {
        /// Display name of the component.
        name: String,
        /// The underlying failure.
        cause: anyhow::Error,
    },
    /// A deferred-function node returned an error.
    #[error("deferred node failed to render: {0}")]
    Deferred(anyhow::Error),
    /// A plugin hook returned an error.
    #[error("{stage} hook of plugin `{plugin}` failed: {cause}")]
    Hook {
        /// Name of the plugin owning the hook.
        plugin: String,
        /// Where in the pipeline the hook ran.
        stage: HookStage,
        /// The underlying failure.
        cause: anyhow::Error,
    },
    /// No expression claimed the node and the engine runs in strict mode.
    #[error("no expression matches {0} node")]
    Unmatched(&'static str),
    /// Deferred values kept producing new deferred values past the configured bound.
    #[error("deferred values were still pending after {0} drain rounds")]
    DrainLimit(usize),
    /// Before hooks kept changing a node's kind, so no expression could settle on it.
    #[error("before hooks changed the node kind more than {0} times in a row")]
    Redispatch(usize),
    /// An expression was handed a node of a kind it does not render.
    #[error("{expected} expression cannot render {found} node")]
    KindMismatch {
        /// The expression that received the node.
        expected: ExprKind,
        /// The kind of node it received.
        found: &'static str,
    },
}

impl Error {
    pub(crate) fn mismatch(expected: ExprKind, node: &crate::Node) -> Self {
        Self::KindMismatch {
            expected,
            found: node.kind_name(),
        }
    }
}

/// The error value a future settles with when it fails.
///
/// Rejections are clonable so one settled future can be observed from several
/// positions in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Rejection {
    message: String,
}

impl Rejection {
    /// Creates a rejection carrying the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates a rejection from anything printable, such as an error value.
    pub fn from_display(error: &impl fmt::Display) -> Self {
        Self::new(error.to_string())
    }

    /// The message carried by this rejection.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_plugin_display() {
        let error = Error::DuplicatePlugin("styled".into());
        assert_eq!(error.to_string(), "a plugin named `styled` is already registered");
    }

    #[test]
    fn hook_error_names_stage_and_plugin() {
        let error = Error::Hook {
            plugin: "audit".into(),
            stage: HookStage::Before(ExprKind::Tag),
            cause: anyhow::anyhow!("boom"),
        };
        assert_eq!(
            error.to_string(),
            "before `tag` hook of plugin `audit` failed: boom"
        );
    }

    #[test]
    fn rejection_from_io_error() {
        let io = std::io::Error::other("socket closed");
        let rejection = Rejection::from_display(&io);
        assert_eq!(rejection.message(), "socket closed");
        assert_eq!(rejection.clone(), rejection);
    }
}
