//! Integration test harness for woo-orders.
//!
//! Starts a mock WooCommerce REST API on an ephemeral local port and hands
//! out real [`WooClient`]s pointed at it. Every request is recorded so tests
//! can assert on paths, query strings, auth headers and hit counts.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p woo-orders-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let store = MockStore::start().await;
//! store.stub("/orders", Reply::json(json!([order_json(1, "1001", "processing", "10.00")])));
//!
//! let client = store.client().await;
//! let page = client.list_orders(&OrderQuery::default()).await?;
//! assert_eq!(store.hits(), 1);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use woo_orders_client::{ClientConfig, CredentialStore, WooClient};
use woo_orders_core::Credentials;

/// REST prefix the mock serves under.
pub const API_PREFIX: &str = "/wp-json/wc/v3";

/// Consumer key given to clients from [`MockStore::client`].
pub const TEST_KEY: &str = "ck_test";

/// Consumer secret given to clients from [`MockStore::client`].
pub const TEST_SECRET: &str = "cs_test";

// =============================================================================
// Replies
// =============================================================================

/// A canned response.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    body: String,
    headers: Vec<(String, String)>,
}

impl Reply {
    /// 200 with a JSON body.
    #[must_use]
    pub fn json(body: Value) -> Self {
        Self::status(200, body)
    }

    /// Any status with a JSON body.
    #[must_use]
    pub fn status(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.to_string(),
            headers: Vec::new(),
        }
    }

    /// Any status with a raw body, sent as JSON regardless of content.
    #[must_use]
    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.into(),
            headers: Vec::new(),
        }
    }

    /// WooCommerce-style error body.
    #[must_use]
    pub fn error(status: u16, code: &str, message: &str) -> Self {
        Self::status(
            status,
            json!({ "code": code, "message": message, "data": { "status": status } }),
        )
    }

    /// Add a response header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Add the listing totals headers.
    #[must_use]
    pub fn with_totals(self, total: u64, total_pages: u32) -> Self {
        self.with_header("X-WP-Total", total)
            .with_header("X-WP-TotalPages", total_pages)
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }
        (self.status, headers, self.body).into_response()
    }
}

// =============================================================================
// Recorded Requests
// =============================================================================

/// One request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Path with the API prefix removed.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    /// First value of a query parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// =============================================================================
// Mock Store
// =============================================================================

#[derive(Debug, Clone)]
struct Stub {
    path: String,
    query: Vec<(String, String)>,
    reply: Reply,
}

impl Stub {
    fn matches(&self, request: &RecordedRequest) -> bool {
        self.path == request.path
            && self
                .query
                .iter()
                .all(|(k, v)| request.param(k) == Some(v.as_str()))
    }
}

#[derive(Debug, Default)]
struct MockState {
    stubs: Mutex<Vec<Stub>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A running mock WooCommerce store.
#[derive(Debug)]
pub struct MockStore {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockStore {
    /// Start the mock on `127.0.0.1` with an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock store");
        let addr = listener.local_addr().expect("Mock store has no address");

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock store stopped");
            }
        });

        Self { addr, state }
    }

    /// Store URL, as a user would type it.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer every request to `path` (without the API prefix).
    pub fn stub(&self, path: &str, reply: Reply) -> &Self {
        self.stub_query(path, &[], reply)
    }

    /// Answer requests to `path` that carry all of `query`.
    ///
    /// When several stubs match, the one requiring the most query pairs
    /// wins, then the most recently added.
    pub fn stub_query(&self, path: &str, query: &[(&str, &str)], reply: Reply) -> &Self {
        lock(&self.state.stubs).push(Stub {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            reply,
        });
        self
    }

    /// Number of requests received.
    #[must_use]
    pub fn hits(&self) -> usize {
        lock(&self.state.requests).len()
    }

    /// Every request received, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Requests to one path, oldest first.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// A client configured against this store with in-memory credentials.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    pub async fn client(&self) -> WooClient {
        let client = unconfigured_client();
        client
            .set_credentials(Credentials::new(self.url(), TEST_KEY, TEST_SECRET))
            .await
            .expect("Failed to store test credentials");
        client
    }
}

/// A client with an empty in-memory credential store.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn unconfigured_client() -> WooClient {
    WooClient::with_store(
        &ClientConfig::new(std::env::temp_dir()),
        CredentialStore::memory(),
    )
    .expect("Failed to build client")
}

async fn handle(State(state): State<Arc<MockState>>, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or_else(|| uri.path())
        .to_string();
    let query: Vec<(String, String)> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let request = RecordedRequest {
        path,
        query,
        authorization,
    };

    let reply = lock(&state.stubs)
        .iter()
        .enumerate()
        .filter(|(_, stub)| stub.matches(&request))
        .max_by_key(|(i, stub)| (stub.query.len(), *i))
        .map(|(_, stub)| stub.reply.clone());

    lock(&state.requests).push(request);

    reply
        .unwrap_or_else(|| {
            Reply::error(
                404,
                "rest_no_route",
                "No route was found matching the URL and request method.",
            )
        })
        .into_response()
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Fixtures
// =============================================================================

/// A minimal order as the store returns it.
#[must_use]
pub fn order_json(id: u64, number: &str, status: &str, total: &str) -> Value {
    json!({
        "id": id,
        "number": number,
        "status": status,
        "currency": "USD",
        "date_created": "2024-03-10T14:05:00",
        "date_modified": "2024-03-10T14:10:00",
        "total": total,
        "total_tax": "0.00",
        "shipping_total": "0.00",
        "discount_total": "0.00",
        "payment_method": "stripe",
        "payment_method_title": "Credit card",
        "customer_id": 0,
        "billing": {
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com"
        },
        "shipping": {},
        "line_items": [
            { "id": id * 10, "name": "Widget", "product_id": 5, "quantity": 2, "total": total, "price": total }
        ],
        "customer_note": ""
    })
}

/// `count` orders numbered from `first_id`.
#[must_use]
pub fn orders_json(first_id: u64, count: u64) -> Value {
    Value::Array(
        (first_id..first_id + count)
            .map(|id| order_json(id, &id.to_string(), "processing", "10.00"))
            .collect(),
    )
}

/// A `/reports/sales` body.
#[must_use]
pub fn sales_report_json(total_sales: &str, orders: u64, items: u64, customers: u64) -> Value {
    json!([{
        "total_sales": total_sales,
        "net_sales": total_sales,
        "average_sales": "0.00",
        "total_orders": orders,
        "total_items": items,
        "total_tax": "0.00",
        "total_shipping": "0.00",
        "total_refunds": 0,
        "total_discount": "0.00",
        "totals_grouped_by": "day",
        "totals": {},
        "total_customers": customers
    }])
}
