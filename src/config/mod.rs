//! Service configuration, loaded from the environment.
//!
//! The engine itself needs only the store URL; the rest configures the HTTP
//! surface. A `.env` file is honored when present (loaded in `main`).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::utils::error::{RateGateError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    /// Whether any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store connection URL: `memory://` or `redis://…`
    pub url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: "memory://".to_string(),
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Storage settings
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognized variables: `RATEGATE_HOST`, `RATEGATE_PORT`,
    /// `RATEGATE_CORS_ORIGINS` (comma-separated), `RATEGATE_STORE_URL`.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = std::env::var("RATEGATE_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("RATEGATE_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| RateGateError::Config(format!("Invalid RATEGATE_PORT: {port}")))?;
        }
        if let Ok(origins) = std::env::var("RATEGATE_CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }
        if let Ok(url) = std::env::var("RATEGATE_STORE_URL") {
            config.storage.url = url;
        }

        config.validate()?;
        info!(
            host = %config.server.host,
            port = config.server.port,
            store = %config.storage.url,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Reject configurations that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(RateGateError::Config("Server host is empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(RateGateError::Config("Server port is 0".to_string()));
        }
        if self.storage.url.is_empty() {
            return Err(RateGateError::Config("Store URL is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.url, "memory://");
        assert!(config.server.allows_any_origin());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(RateGateError::Config(_))
        ));
    }

    #[test]
    fn test_explicit_origins_disable_wildcard() {
        let mut config = Config::default();
        config.server.cors_origins = vec!["http://localhost:3000".to_string()];
        assert!(!config.server.allows_any_origin());
    }
}
