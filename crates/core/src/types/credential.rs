//! Store API credentials.
//!
//! Three opaque strings entered once during setup and reused for every
//! request: the store URL, the REST API consumer key and consumer secret.

use serde::{Deserialize, Serialize};

/// WooCommerce REST API credentials.
///
/// Serialized with camelCase field names so a record written by an earlier
/// setup reads back unchanged. Implements `Debug` manually to redact the key
/// and secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Base URL of the store (e.g., `https://shop.example.com`).
    pub store_url: String,
    /// REST API consumer key (`ck_...`).
    #[serde(alias = "consumerKey")]
    pub api_key: String,
    /// REST API consumer secret (`cs_...`).
    #[serde(alias = "consumerSecret")]
    pub api_secret: String,
}

impl Credentials {
    /// Create a new set of credentials.
    #[must_use]
    pub fn new(
        store_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            store_url: store_url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// All three fields are non-empty.
    ///
    /// Network calls are only attempted with complete credentials.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.store_url.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    /// Store URL with a single trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.store_url
            .strip_suffix('/')
            .unwrap_or(&self.store_url)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("store_url", &self.store_url)
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_strips_one_trailing_slash() {
        let creds = Credentials::new("https://shop.example.com/", "ck_1", "cs_1");
        assert_eq!(creds.base_url(), "https://shop.example.com");

        let creds = Credentials::new("https://shop.example.com//", "ck_1", "cs_1");
        assert_eq!(creds.base_url(), "https://shop.example.com/");
    }

    #[test]
    fn test_is_complete() {
        assert!(Credentials::new("https://a", "k", "s").is_complete());
        assert!(!Credentials::new("", "k", "s").is_complete());
        assert!(!Credentials::new("https://a", "", "s").is_complete());
        assert!(!Credentials::new("https://a", "k", "").is_complete());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("https://shop.example.com", "ck_live_key", "cs_live_secret");
        let debug_output = format!("{creds:?}");

        assert!(debug_output.contains("https://shop.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("ck_live_key"));
        assert!(!debug_output.contains("cs_live_secret"));
    }

    #[test]
    fn test_reads_consumer_key_field_names() {
        let json = r#"{"storeUrl":"https://a","consumerKey":"ck","consumerSecret":"cs"}"#;
        let creds: Credentials = serde_json::from_str(json).expect("deserialize");
        assert_eq!(creds, Credentials::new("https://a", "ck", "cs"));
    }
}
