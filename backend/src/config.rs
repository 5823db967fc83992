//! Application configuration loaded via OrthoConfig.
//!
//! Values come from CLI arguments, `ACADEMY_*` environment variables, or a
//! configuration file, in OrthoConfig's usual precedence order.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/academy";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILTER: &str = "info";

/// Settings for the backend's store connection and telemetry.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACADEMY")]
pub struct AppConfig {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum number of pooled connections.
    #[ortho_config(default = 8)]
    pub max_connections: u32,
    /// Pool checkout timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl AppConfig {
    /// Return the configured database URL, falling back to a local default.
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }

    /// Return the pool checkout timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Return the configured log filter, falling back to `info`.
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration fallbacks.

    use super::*;

    #[test]
    fn accessors_fall_back_to_defaults() {
        let config = AppConfig {
            database_url: None,
            max_connections: 8,
            connect_timeout_secs: None,
            log_filter: None,
        };

        assert_eq!(config.database_url(), DEFAULT_DATABASE_URL);
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn accessors_prefer_configured_values() {
        let config = AppConfig {
            database_url: Some("postgres://db.internal/academy".to_owned()),
            max_connections: 20,
            connect_timeout_secs: Some(5),
            log_filter: Some("debug".to_owned()),
        };

        assert_eq!(config.database_url(), "postgres://db.internal/academy");
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_filter(), "debug");
    }
}
