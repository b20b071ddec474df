//! Engine configuration.
//!
//! Every option has a default that reproduces the lenient, unbounded behavior of the
//! engine, so `EngineConfig::default()` is always a valid choice. Options can also be
//! deserialized from any serde format or read from the process environment.

use serde::{Deserialize, Serialize};

/// Environment variable bounding the number of drain rounds.
pub const DRAIN_LIMIT_VAR: &str = "RECAST_DRAIN_LIMIT";
/// Environment variable enabling strict dispatch.
pub const STRICT_VAR: &str = "RECAST_STRICT";

/// Options controlling a single [`Engine`](crate::Engine).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Upper bound on drain rounds. `None` drains until no deferred value is left,
    /// which never terminates for a future that keeps yielding new futures.
    pub drain_limit: Option<usize>,
    /// When set, nodes that no expression claims fail the render instead of being
    /// coerced to text.
    pub strict: bool,
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            drain_limit: None,
            strict: false,
        }
    }

    /// Bounds the number of drain rounds.
    #[must_use]
    pub const fn drain_limit(mut self, limit: usize) -> Self {
        self.drain_limit = Some(limit);
        self
    }

    /// Enables or disables strict dispatch.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Reads the configuration from `RECAST_DRAIN_LIMIT` and `RECAST_STRICT`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// Unparsable values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();
        if let Some(raw) = lookup(DRAIN_LIMIT_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(limit) => config.drain_limit = Some(limit),
                Err(err) => tracing::warn!(
                    variable = DRAIN_LIMIT_VAR,
                    value = %raw,
                    error = %err,
                    "ignoring invalid drain limit"
                ),
            }
        }
        if let Some(raw) = lookup(STRICT_VAR) {
            let raw = raw.trim();
            config.strict = raw != "0" && !raw.eq_ignore_ascii_case("false") && !raw.is_empty();
        }
        config
    }
}
