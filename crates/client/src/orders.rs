//! Order queries.
//!
//! Listings are always sorted by creation date, newest first, on the server.
//! Page totals come from the `X-WP-Total*` headers when the store sends them
//! and from the short-page heuristic otherwise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use woo_orders_core::{Order, OrderId, OrderStatus, PageTotals, Period};

use crate::client::WooClient;
use crate::error::WooError;

/// Default page size for order listings.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// WooCommerce timestamp format for `after`/`before` (no offset, UTC).
const QUERY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parameters for an order listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    /// 1-based page number.
    pub page: u32,
    /// Results per page. The store caps this (typically at 100).
    pub per_page: u32,
    /// `None` includes every status.
    pub status: Option<OrderStatus>,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    /// Server-side search term.
    pub search: Option<String>,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            status: None,
            after: None,
            before: None,
            search: None,
        }
    }
}

impl OrderQuery {
    /// Query for one page. A page of 0 is treated as 1.
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to orders created inside `period`.
    #[must_use]
    pub fn within(mut self, period: Period) -> Self {
        self.after = Some(period.start);
        self.before = Some(period.end);
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.trim().is_empty()).then_some(search);
        self
    }

    /// Query string pairs, in the order they are sent.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("per_page", self.per_page.max(1).to_string()),
            ("orderby", "date".to_string()),
            ("order", "desc".to_string()),
        ];
        if let Some(status) = &self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(after) = self.after {
            params.push(("after", after.format(QUERY_TIMESTAMP_FORMAT).to_string()));
        }
        if let Some(before) = self.before {
            params.push(("before", before.format(QUERY_TIMESTAMP_FORMAT).to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

/// One page of orders plus what is known about the rest of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page: u32,
    pub per_page: u32,
    pub totals: PageTotals,
}

impl OrderPage {
    /// Whether another page is known or assumed to exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.totals.has_more()
    }
}

impl WooClient {
    /// Fetch one page of orders.
    ///
    /// # Errors
    ///
    /// Propagates every gateway error unchanged.
    #[instrument(skip(self), fields(page = query.page, per_page = query.per_page))]
    pub async fn list_orders(&self, query: &OrderQuery) -> Result<OrderPage, WooError> {
        let params = query.to_params();
        let response = self.get("/orders", &params).await?;
        let (total, total_pages) = (response.total, response.total_pages);
        let orders: Vec<Order> = response.into_json()?;

        let page = query.page.max(1);
        let per_page = query.per_page.max(1);
        let totals = PageTotals::resolve(page, per_page, orders.len(), total, total_pages);

        if !totals.exact {
            tracing::debug!(
                returned = orders.len(),
                "Listing totals missing from response headers, estimating"
            );
        }

        Ok(OrderPage {
            orders,
            page,
            per_page,
            totals,
        })
    }

    /// Fetch one page of orders, newest first, optionally of one status.
    ///
    /// # Errors
    ///
    /// Propagates every gateway error unchanged.
    pub async fn list_orders_simple(
        &self,
        page: u32,
        per_page: u32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, WooError> {
        let mut query = OrderQuery::new(page, per_page);
        query.status = status;
        Ok(self.list_orders(&query).await?.orders)
    }

    /// Fetch a single order.
    ///
    /// # Errors
    ///
    /// Returns `WooError::Upstream` with status 404 if the store has no
    /// such order, and propagates every other gateway error unchanged.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, WooError> {
        self.get(&format!("/orders/{id}"), &[]).await?.into_json()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_default_query() {
        let params = OrderQuery::default().to_params();
        assert_eq!(param(&params, "page"), Some("1"));
        assert_eq!(param(&params, "per_page"), Some("20"));
        assert_eq!(param(&params, "orderby"), Some("date"));
        assert_eq!(param(&params, "order"), Some("desc"));
        assert_eq!(param(&params, "status"), None);
        assert_eq!(param(&params, "search"), None);
    }

    #[test]
    fn test_page_zero_becomes_one() {
        let query = OrderQuery::new(0, 0);
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 1);
    }

    #[test]
    fn test_status_is_sent_verbatim() {
        let params = OrderQuery::new(2, 50)
            .with_status(OrderStatus::OnHold)
            .to_params();
        assert_eq!(param(&params, "status"), Some("on-hold"));

        let custom = OrderQuery::default()
            .with_status(OrderStatus::Other("awaiting-pickup".to_string()))
            .to_params();
        assert_eq!(param(&custom, "status"), Some("awaiting-pickup"));
    }

    #[test]
    fn test_period_bounds() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap();
        let params = OrderQuery::default()
            .within(Period::new(start, end))
            .to_params();

        assert_eq!(param(&params, "after"), Some("2024-03-01T00:00:00"));
        assert_eq!(param(&params, "before"), Some("2024-03-31T23:59:59"));
    }

    #[test]
    fn test_blank_search_is_dropped() {
        assert!(OrderQuery::default().with_search("   ").search.is_none());
        let params = OrderQuery::default().with_search("jane").to_params();
        assert_eq!(param(&params, "search"), Some("jane"));
    }
}
