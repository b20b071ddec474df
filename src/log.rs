//! Tracing subscriber installation.
//!
//! Every crate in the workspace reports through `tracing`. Applications that do not
//! install their own subscriber can call [`install`] once at startup; the filter is
//! read from `RECAST_LOG` using the usual `EnvFilter` directive syntax.

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "RECAST_LOG";

const DEFAULT_FILTER: &str = "info";

static TRACING_INSTALLED: Once = Once::new();

/// Installs a formatting subscriber filtered by `RECAST_LOG` (idempotent).
///
/// If another global subscriber is already set, the call leaves it in place.
pub fn install() {
    TRACING_INSTALLED.call_once(|| {
        let layer = fmt::layer().with_target(true).with_filter(filter_from_env());
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            eprintln!("recast tracing subscriber failed to initialize");
        }
    });
}

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
