//! Credential setup and connection checks.
//!
//! # Environment Variables
//!
//! - `WOO_STORE_URL` - Store URL when `--url` is not given
//! - `WOO_CONSUMER_KEY` - Consumer key when `--key` is not given
//! - `WOO_CONSUMER_SECRET` - Consumer secret when `--secret` is not given

use woo_orders_client::credentials_from_env;
use woo_orders_core::Credentials;

use super::{CommandError, client};
use crate::output;

/// Store credentials, then test them.
///
/// The credentials are kept even when the connection test fails, so a
/// store that is only temporarily unreachable does not need a second setup.
pub async fn run(
    url: Option<String>,
    key: Option<String>,
    secret: Option<String>,
) -> Result<(), CommandError> {
    let credentials = resolve(url, key, secret, credentials_from_env())?;
    let client = client()?;

    tracing::info!(store_url = %credentials.store_url, "Saving WooCommerce credentials");
    client.set_credentials(credentials).await?;

    if client.test_connection().await {
        output::connection_ok();
        Ok(())
    } else {
        Err(CommandError::ConnectionFailed)
    }
}

/// Test the stored credentials.
pub async fn test() -> Result<(), CommandError> {
    let client = client()?;
    if client.get_credentials().await.is_none() {
        return Err(woo_orders_client::WooError::NotConfigured.into());
    }

    if client.test_connection().await {
        output::connection_ok();
        Ok(())
    } else {
        Err(CommandError::ConnectionFailed)
    }
}

/// Flags first, then the environment. The URL loses one trailing slash.
fn resolve(
    url: Option<String>,
    key: Option<String>,
    secret: Option<String>,
    env: Option<Credentials>,
) -> Result<Credentials, CommandError> {
    let (env_url, env_key, env_secret) = env
        .map(|c| (Some(c.store_url), Some(c.api_key), Some(c.api_secret)))
        .unwrap_or_default();

    let url = non_blank(url)
        .or(env_url)
        .ok_or(CommandError::MissingField("store URL", "WOO_STORE_URL"))?;
    let key = non_blank(key)
        .or(env_key)
        .ok_or(CommandError::MissingField("consumer key", "WOO_CONSUMER_KEY"))?;
    let secret = non_blank(secret)
        .or(env_secret)
        .ok_or(CommandError::MissingField("consumer secret", "WOO_CONSUMER_SECRET"))?;

    let url = url.trim();
    let url = url.strip_suffix('/').unwrap_or(url);
    Ok(Credentials::new(url, key.trim(), secret.trim()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_from_flags_strips_trailing_slash() {
        let creds = resolve(
            Some("https://shop.example.com/".to_string()),
            Some("ck_1".to_string()),
            Some("cs_1".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(creds.store_url, "https://shop.example.com");
        assert_eq!(creds.api_key, "ck_1");
    }

    #[test]
    fn test_resolve_falls_back_to_env() {
        let env = Credentials::new("https://env.example.com", "ck_env", "cs_env");
        let creds = resolve(None, Some("ck_flag".to_string()), None, Some(env)).unwrap();
        assert_eq!(creds.store_url, "https://env.example.com");
        assert_eq!(creds.api_key, "ck_flag");
        assert_eq!(creds.api_secret, "cs_env");
    }

    #[test]
    fn test_resolve_missing_field() {
        let result = resolve(Some("https://shop.example.com".to_string()), None, None, None);
        assert!(matches!(
            result,
            Err(CommandError::MissingField("consumer key", _))
        ));
    }
}
