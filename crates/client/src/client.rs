//! WooCommerce REST API gateway.
//!
//! Builds authenticated requests against `<store>/<prefix>/<endpoint>` and
//! normalizes transport and HTTP failures into [`WooError`]. Every call is a
//! single attempt: no retry, no backoff.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;
use woo_orders_core::Credentials;

use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::WooError;

/// Header carrying the total number of results for a listing.
pub const TOTAL_HEADER: &str = "x-wp-total";

/// Header carrying the total number of pages for a listing.
pub const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

const CLIENT_USER_AGENT: &str = concat!("woo-orders/", env!("CARGO_PKG_VERSION"));

/// WooCommerce REST API client.
///
/// Cheap to clone; clones share the HTTP connection pool and the credential
/// cache.
#[derive(Clone)]
pub struct WooClient {
    inner: Arc<WooClientInner>,
}

struct WooClientInner {
    http: reqwest::Client,
    credentials: CredentialStore,
    api_prefix: String,
    default_currency: String,
}

/// A successful response: the JSON body plus the listing totals headers.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub body: serde_json::Value,
    /// `X-WP-Total`, when present and numeric.
    pub total: Option<u64>,
    /// `X-WP-TotalPages`, when present and numeric.
    pub total_pages: Option<u32>,
}

impl ApiResponse {
    /// Deserialize the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns `WooError::MalformedResponse` if the body has another shape.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, WooError> {
        serde_json::from_value(self.body)
            .map_err(|e| WooError::MalformedResponse(format!("Unexpected response shape: {e}")))
    }
}

impl WooClient {
    /// Create a client whose credentials live in `config.config_dir`.
    ///
    /// # Errors
    ///
    /// Returns `WooError::Transport` if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, WooError> {
        Self::with_store(config, CredentialStore::file(&config.config_dir))
    }

    /// Create a client over an explicit credential store.
    ///
    /// # Errors
    ///
    /// Returns `WooError::Transport` if the HTTP client fails to build.
    pub fn with_store(config: &ClientConfig, credentials: CredentialStore) -> Result<Self, WooError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            inner: Arc::new(WooClientInner {
                http,
                credentials,
                api_prefix: config.api_prefix.clone(),
                default_currency: config.default_currency.clone(),
            }),
        })
    }

    /// Currency reported by statistics when no order reveals the store's.
    #[must_use]
    pub fn default_currency(&self) -> &str {
        &self.inner.default_currency
    }

    /// Overwrite the stored credentials.
    ///
    /// # Errors
    ///
    /// Returns `WooError::Storage` if the durable write fails.
    pub async fn set_credentials(&self, credentials: Credentials) -> Result<(), WooError> {
        self.inner.credentials.set_credentials(credentials).await
    }

    /// The stored credentials, if any.
    pub async fn get_credentials(&self) -> Option<Credentials> {
        self.inner.credentials.get_credentials().await
    }

    // =========================================================================
    // Request Execution
    // =========================================================================

    /// GET `endpoint` (path plus optional query string) and return its JSON.
    ///
    /// # Errors
    ///
    /// Returns `WooError::NotConfigured` before any I/O if credentials are
    /// missing, `WooError::Transport` on network failure,
    /// `WooError::Upstream` on a non-2xx status and
    /// `WooError::MalformedResponse` if the body is not JSON.
    pub async fn request(&self, endpoint: &str) -> Result<serde_json::Value, WooError> {
        Ok(self.get(endpoint, &[]).await?.body)
    }

    /// GET `endpoint` with extra query parameters.
    ///
    /// # Errors
    ///
    /// Same as [`WooClient::request`].
    #[instrument(skip(self, params))]
    pub async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, WooError> {
        let credentials = self.inner.credentials.require().await?;
        let url = build_url(&credentials, &self.inner.api_prefix, endpoint, params)?;
        let auth = basic_auth_value(&credentials)?;

        tracing::debug!(path = url.path(), "WooCommerce request");

        let response = self
            .inner
            .http
            .get(url)
            .header(AUTHORIZATION, auth)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(response).await);
        }

        let total = header_number(response.headers(), TOTAL_HEADER);
        let total_pages = header_number(response.headers(), TOTAL_PAGES_HEADER);

        let text = response.text().await?;
        let body = serde_json::from_str(&text)
            .map_err(|e| WooError::MalformedResponse(format!("Response is not JSON: {e}")))?;

        Ok(ApiResponse {
            body,
            total,
            total_pages,
        })
    }

    /// Check the stored credentials with a one-order query.
    ///
    /// The specific failure is logged and collapsed to `false`.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> bool {
        match self.get("/orders", &[("per_page", "1".to_string())]).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "WooCommerce connection test failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for WooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooClient")
            .field("api_prefix", &self.inner.api_prefix)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// `<store url without one trailing slash><prefix><endpoint>?<params>`.
fn build_url(
    credentials: &Credentials,
    api_prefix: &str,
    endpoint: &str,
    params: &[(&str, String)],
) -> Result<Url, WooError> {
    let raw = format!("{}{api_prefix}{endpoint}", credentials.base_url());
    let mut url = Url::parse(&raw).map_err(|e| WooError::InvalidUrl(format!("{raw}: {e}")))?;

    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// `Basic base64(key:secret)`, marked sensitive so it never shows in debug
/// output.
fn basic_auth_value(credentials: &Credentials) -> Result<HeaderValue, WooError> {
    let token = SecretString::from(BASE64_STANDARD.encode(format!(
        "{}:{}",
        credentials.api_key, credentials.api_secret
    )));

    let mut value = HeaderValue::from_str(&format!("Basic {}", token.expose_secret()))
        .map_err(|e| WooError::InvalidUrl(format!("Credentials cannot form a header: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

/// Build an `Upstream` error, preferring the API's own `message` field.
async fn upstream_error(response: reqwest::Response) -> WooError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or(text);

    tracing::debug!(status, %message, "WooCommerce returned an error");
    WooError::Upstream { status, message }
}
