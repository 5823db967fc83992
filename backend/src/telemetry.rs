//! Tracing bootstrap helpers.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; `default_filter` applies when it is unset.
/// Initialisation failure (for example, a second call) is logged and
/// otherwise ignored so test harnesses can call this freely.
pub fn init_telemetry(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    if let Err(error) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %error, "tracing init failed");
    }
}
