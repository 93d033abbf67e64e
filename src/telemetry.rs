//! Tracing subscriber setup for binaries and examples.
//!
//! The library only emits `tracing` events; nothing is printed unless the
//! embedding application installs a subscriber, for instance with
//! [`init_tracing`].

use tracing_subscriber::EnvFilter;

use crate::{Error, Result};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `default_directive` (e.g.
/// `"artifact_sink=info"`) is used.
///
/// # Errors
///
/// Returns [`Error::Other`] if the directive is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| Error::Other(format!("invalid log directive '{default_directive}': {e}")))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Other(format!("failed to install tracing subscriber: {e}")))
}
