//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `WOO_CONFIG_DIR` - Directory for the stored credential record
//!   (default: `<platform config dir>/woo-orders`)
//! - `WOO_API_PREFIX` - REST API prefix (default: `/wp-json/wc/v3`)
//! - `WOO_HTTP_TIMEOUT_SECS` - Client-side request timeout (default: none)
//! - `WOO_DEFAULT_CURRENCY` - Currency for empty statistics (default: USD)
//!
//! ## Optional (setup bootstrap)
//! - `WOO_STORE_URL` - Store base URL
//! - `WOO_CONSUMER_KEY` - REST API consumer key
//! - `WOO_CONSUMER_SECRET` - REST API consumer secret

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use woo_orders_core::Credentials;

/// Default WooCommerce REST API prefix.
pub const DEFAULT_API_PREFIX: &str = "/wp-json/wc/v3";

/// Default currency reported when nothing else reveals the store's.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Directory name under the platform config dir.
const APP_DIR_NAME: &str = "woo-orders";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Directory holding the durable credential record.
    pub config_dir: PathBuf,
    /// REST API prefix appended to the store URL.
    pub api_prefix: String,
    /// Client-side timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    /// Currency for statistics when no order reveals the store's.
    pub default_currency: String,
}

impl ClientConfig {
    /// Configuration with defaults, storing credentials under `config_dir`.
    #[must_use]
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: None,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed, or if no config
    /// directory is set and the platform has none.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config_dir = match get_optional_env("WOO_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or_else(|| ConfigError::MissingEnvVar("WOO_CONFIG_DIR".to_string()))?,
        };

        let api_prefix = normalize_prefix(&get_env_or_default("WOO_API_PREFIX", DEFAULT_API_PREFIX));

        let timeout = get_optional_env("WOO_HTTP_TIMEOUT_SECS")
            .map(|secs| {
                secs.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    ConfigError::InvalidEnvVar("WOO_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let default_currency = get_env_or_default("WOO_DEFAULT_CURRENCY", DEFAULT_CURRENCY);

        Ok(Self {
            config_dir,
            api_prefix,
            timeout,
            default_currency,
        })
    }

    /// Set the API prefix.
    #[must_use]
    pub fn with_api_prefix(mut self, prefix: &str) -> Self {
        self.api_prefix = normalize_prefix(prefix);
        self
    }

    /// Set a client-side timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Credentials supplied through the environment, if all three are set.
#[must_use]
pub fn credentials_from_env() -> Option<Credentials> {
    let _ = dotenvy::dotenv();

    let store_url = get_optional_env("WOO_STORE_URL")?;
    let api_key = get_optional_env("WOO_CONSUMER_KEY")?;
    let api_secret = get_optional_env("WOO_CONSUMER_SECRET")?;
    Some(Credentials::new(store_url, api_key, api_secret))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Leading slash, no trailing slash.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Get an optional environment variable. Blank counts as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new("/tmp/woo");
        assert_eq!(config.config_dir, PathBuf::from("/tmp/woo"));
        assert_eq!(config.api_prefix, "/wp-json/wc/v3");
        assert!(config.timeout.is_none());
        assert_eq!(config.default_currency, "USD");
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("wp-json/wc/v3/"), "/wp-json/wc/v3");
        assert_eq!(normalize_prefix("/wc/v2"), "/wc/v2");
        assert_eq!(normalize_prefix("/"), "");
    }

    #[test]
    fn test_with_api_prefix_and_timeout() {
        let config = ClientConfig::new("/tmp/woo")
            .with_api_prefix("custom/api/")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.api_prefix, "/custom/api");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
