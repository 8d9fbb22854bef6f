//! HTTP server settings read from `HRMS_*` environment variables

use anyhow::Result;
use axum::http::{HeaderValue, Method, header};
use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::rate_limit::{ClientRateLimiter, client_rate_limiter};

/// Listener and CORS settings shared by the services
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed browser origin; any origin when unset
    #[serde(default)]
    pub cors_origin: Option<String>,
    /// Requests each client may make per window
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
}

impl ServerConfig {
    /// Load from `HRMS_HOST`, `HRMS_PORT`, `HRMS_CORS_ORIGIN`,
    /// `HRMS_RATE_LIMIT_MAX` and `HRMS_RATE_LIMIT_WINDOW_SECS`
    pub fn from_env(default_port: u16) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", i64::from(default_port))?
            .set_default("rate_limit_max", 100)?
            .set_default("rate_limit_window_secs", 900)?
            .add_source(Environment::with_prefix("HRMS").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn rate_limiter(&self) -> Result<ClientRateLimiter> {
        client_rate_limiter(
            self.rate_limit_max,
            Duration::from_secs(self.rate_limit_window_secs),
        )
    }

    /// CORS policy for browser clients
    pub fn cors_layer(&self) -> Result<CorsLayer> {
        let layer = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        Ok(match &self.cors_origin {
            Some(origin) => layer
                .allow_origin(
                    HeaderValue::from_str(origin)
                        .map_err(|e| anyhow::anyhow!("Invalid HRMS_CORS_ORIGIN: {}", e))?,
                )
                .allow_credentials(true),
            None => layer.allow_origin(Any),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_apply_without_env() {
        unsafe {
            std::env::remove_var("HRMS_HOST");
            std::env::remove_var("HRMS_PORT");
            std::env::remove_var("HRMS_CORS_ORIGIN");
            std::env::remove_var("HRMS_RATE_LIMIT_MAX");
            std::env::remove_var("HRMS_RATE_LIMIT_WINDOW_SECS");
        }

        let config = ServerConfig::from_env(3001).expect("defaults load");
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.cors_origin, None);
        assert_eq!(config.rate_limit_max, 100);
        assert_eq!(config.rate_limit_window_secs, 900);
        assert!(config.rate_limiter().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides_defaults() {
        unsafe {
            std::env::set_var("HRMS_HOST", "127.0.0.1");
            std::env::set_var("HRMS_PORT", "8088");
            std::env::set_var("HRMS_CORS_ORIGIN", "http://localhost:5173");
            std::env::set_var("HRMS_RATE_LIMIT_MAX", "0");
        }

        let config = ServerConfig::from_env(3000).expect("env loads");
        assert_eq!(config.bind_address(), "127.0.0.1:8088");
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:5173"));
        assert_eq!(config.rate_limit_max, 0);
        assert!(config.rate_limiter().is_err());

        unsafe {
            std::env::remove_var("HRMS_HOST");
            std::env::remove_var("HRMS_PORT");
            std::env::remove_var("HRMS_CORS_ORIGIN");
            std::env::remove_var("HRMS_RATE_LIMIT_MAX");
        }
    }

    #[test]
    fn test_invalid_cors_origin_is_rejected() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: Some("bad\norigin".to_string()),
            rate_limit_max: 100,
            rate_limit_window_secs: 900,
        };
        assert!(config.cors_layer().is_err());

        let open = ServerConfig {
            cors_origin: None,
            ..config
        };
        assert!(open.cors_layer().is_ok());
    }
}
