//! Store statistics.
//!
//! A snapshot is derived from three independent fetches: the sales report
//! for the period, a sample of up to [`SAMPLE_SIZE`] orders created in the
//! period, and a sample of up to [`SAMPLE_SIZE`] customers. Report totals
//! win when present; the samples fill in whatever the report leaves out.
//! Sample-derived counts undercount any period with more than
//! [`SAMPLE_SIZE`] orders or customers. That is a known approximation.
//!
//! The dashboard-facing calls never fail. [`WooClient::fetch_stats`] is the
//! fallible core and [`fail_soft`] is the only place errors are swallowed.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::instrument;
use woo_orders_core::{CustomerId, Order, Period, StatsSnapshot, parse_timestamp};

use crate::client::WooClient;
use crate::error::WooError;
use crate::orders::OrderQuery;

/// Upper bound on sampled orders and customers.
pub const SAMPLE_SIZE: u32 = 100;

const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// `date_min` for an all-time report. Without any range the store reports
/// only the current day.
pub const ALL_TIME_START: &str = "2000-01-01";

// =============================================================================
// Wire Types
// =============================================================================

/// Totals from `/reports/sales`. Each field is `None` when the report
/// omits it or sends something that is not a number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesReport {
    pub total_sales: Option<Decimal>,
    pub total_orders: Option<u64>,
    pub total_items: Option<u64>,
    pub total_customers: Option<u64>,
}

impl SalesReport {
    /// Read the report from a response body. The store wraps it in a
    /// one-element array; a bare object is accepted too.
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        let report = match body {
            Value::Array(items) => items.first(),
            Value::Object(_) => Some(body),
            _ => None,
        };
        let Some(report) = report else {
            return Self::default();
        };

        Self {
            total_sales: report.get("total_sales").and_then(json_decimal),
            total_orders: report.get("total_orders").and_then(json_count),
            total_items: report.get("total_items").and_then(json_count),
            total_customers: report.get("total_customers").and_then(json_count),
        }
    }
}

/// The parts of a `/customers` entry the aggregator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSummary {
    pub id: CustomerId,
    /// Account creation time, UTC.
    pub created_gmt: Option<NaiveDateTime>,
}

impl CustomerSummary {
    /// Read every well-formed entry from a customer listing. Anything that
    /// is not an object is skipped.
    #[must_use]
    pub fn list_from_json(body: &Value) -> Vec<Self> {
        body.as_array()
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(|item| Self {
                        id: CustomerId::new(item.get("id").and_then(Value::as_u64).unwrap_or(0)),
                        created_gmt: item
                            .get("date_created_gmt")
                            .and_then(Value::as_str)
                            .and_then(parse_timestamp),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Combine a report and the two samples into one snapshot.
///
/// Customers are counted from the sample only when the report has no
/// customer total, and then only those created inside `period` (all of
/// them when there is no period).
#[must_use]
pub fn aggregate(
    report: &SalesReport,
    orders: &[Order],
    customers: &[CustomerSummary],
    period: Option<&Period>,
    default_currency: &str,
) -> StatsSnapshot {
    let total_revenue = report
        .total_sales
        .unwrap_or_else(|| sample_revenue(orders));

    let total_orders = report
        .total_orders
        .unwrap_or(orders.len() as u64);

    let total_items = report
        .total_items
        .unwrap_or_else(|| orders.iter().map(Order::item_count).sum());

    let active_customers = report.total_customers.unwrap_or_else(|| {
        customers
            .iter()
            .filter(|customer| match (period, customer.created_gmt) {
                (None, _) => true,
                (Some(period), Some(created)) => period.contains(created.and_utc()),
                (Some(_), None) => false,
            })
            .count() as u64
    });

    let currency = orders
        .iter()
        .map(|order| order.currency.as_str())
        .find(|currency| !currency.is_empty())
        .unwrap_or(default_currency)
        .to_string();

    StatsSnapshot {
        total_revenue,
        total_orders,
        total_items,
        active_customers,
        currency,
        ..StatsSnapshot::zeroed(String::new())
    }
}

/// Collapse a failed statistics fetch to a zeroed snapshot.
#[must_use]
pub fn fail_soft(result: Result<StatsSnapshot, WooError>, currency: &str) -> StatsSnapshot {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Statistics unavailable, showing zeroes");
        StatsSnapshot::zeroed(currency)
    })
}

// =============================================================================
// Client Operations
// =============================================================================

impl WooClient {
    /// Fetch and derive a snapshot, propagating the first failure.
    ///
    /// # Errors
    ///
    /// Returns whichever gateway error the report, order or customer fetch
    /// hit first.
    #[instrument(skip(self))]
    pub async fn fetch_stats(&self, period: Option<Period>) -> Result<StatsSnapshot, WooError> {
        let report_params = report_range(period.as_ref(), Utc::now());
        let order_query = period.map_or_else(
            || OrderQuery::new(1, SAMPLE_SIZE),
            |period| OrderQuery::new(1, SAMPLE_SIZE).within(period),
        );
        let order_params = order_query.to_params();
        let customer_params = [("per_page", SAMPLE_SIZE.to_string())];

        let (report, orders, customers) = tokio::try_join!(
            self.get("/reports/sales", &report_params),
            self.get("/orders", &order_params),
            self.get("/customers", &customer_params),
        )?;

        let report = SalesReport::from_json(&report.body);
        let orders: Vec<Order> = orders.into_json()?;
        let customers = CustomerSummary::list_from_json(&customers.body);

        tracing::debug!(
            sampled_orders = orders.len(),
            sampled_customers = customers.len(),
            "Derived statistics"
        );

        Ok(aggregate(
            &report,
            &orders,
            &customers,
            period.as_ref(),
            self.default_currency(),
        ))
    }

    /// Statistics for `period` (all time when `None`). Never fails: any
    /// fetch error yields a zeroed snapshot.
    #[instrument(skip(self))]
    pub async fn get_stats(&self, period: Option<Period>) -> StatsSnapshot {
        fail_soft(self.fetch_stats(period).await, self.default_currency())
    }

    /// Statistics for `period` with percentage deltas against the
    /// preceding period of equal length.
    ///
    /// Never fails. If the current period cannot be fetched the result is
    /// zeroed; if only the comparison period fails the current snapshot is
    /// returned without deltas.
    #[instrument(skip(self))]
    pub async fn get_stats_with_comparison(&self, period: Period) -> StatsSnapshot {
        let previous_period = period.preceding();
        let (current, previous) = tokio::join!(
            self.fetch_stats(Some(period)),
            self.fetch_stats(Some(previous_period)),
        );

        let current = match current {
            Ok(current) => current,
            Err(e) => return fail_soft(Err(e), self.default_currency()),
        };

        match previous {
            Ok(previous) => current.with_comparison(&previous),
            Err(e) => {
                tracing::warn!(error = %e, "Comparison period unavailable, omitting deltas");
                current
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// `date_min`/`date_max` for the sales report. All time runs from
/// [`ALL_TIME_START`] to `today`.
fn report_range(period: Option<&Period>, today: DateTime<Utc>) -> Vec<(&'static str, String)> {
    let (min, max) = period.map_or_else(
        || {
            (
                ALL_TIME_START.to_string(),
                today.format(REPORT_DATE_FORMAT).to_string(),
            )
        },
        |period| {
            (
                period.start.format(REPORT_DATE_FORMAT).to_string(),
                period.end.format(REPORT_DATE_FORMAT).to_string(),
            )
        },
    );
    vec![("date_min", min), ("date_max", max)]
}

/// Sum of sampled order totals, saturating at `Decimal::MAX`.
fn sample_revenue(orders: &[Order]) -> Decimal {
    orders
        .iter()
        .try_fold(Decimal::ZERO, |sum, order| sum.checked_add(order.total))
        .unwrap_or_else(|| {
            tracing::warn!(
                sampled_orders = orders.len(),
                "Sampled revenue overflows, capping"
            );
            Decimal::MAX
        })
}

/// Money sent as a string (`"150.00"`) or a bare number.
fn json_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

/// Counts sent as a number or a numeric string.
fn json_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn order(total: &str, currency: &str, quantities: &[u32]) -> Order {
        serde_json::from_value(json!({
            "id": 1,
            "currency": currency,
            "total": total,
            "line_items": quantities
                .iter()
                .map(|q| json!({ "quantity": q }))
                .collect::<Vec<_>>(),
        }))
        .unwrap()
    }

    fn march() -> Period {
        Period::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
        )
    }

    #[test]
    fn test_sales_report_from_array() {
        let report = SalesReport::from_json(&json!([{
            "total_sales": "150.50",
            "total_orders": 4,
            "total_items": "9",
            "total_customers": null,
        }]));

        assert_eq!(report.total_sales, Some(Decimal::new(15050, 2)));
        assert_eq!(report.total_orders, Some(4));
        assert_eq!(report.total_items, Some(9));
        assert_eq!(report.total_customers, None);
    }

    #[test]
    fn test_sales_report_from_unexpected_shape() {
        assert_eq!(SalesReport::from_json(&json!([])), SalesReport::default());
        assert_eq!(SalesReport::from_json(&json!("nope")), SalesReport::default());
    }

    #[test]
    fn test_customer_list_from_json() {
        let customers = CustomerSummary::list_from_json(&json!([
            { "id": 7, "date_created_gmt": "2024-03-05T10:00:00" },
            { "id": 8 },
            "garbage",
        ]));

        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].id, CustomerId::new(7));
        assert!(customers[0].created_gmt.is_some());
        assert!(customers[1].created_gmt.is_none());
    }

    #[test]
    fn test_aggregate_prefers_report() {
        let report = SalesReport {
            total_sales: Some(Decimal::from(500)),
            total_orders: Some(12),
            total_items: Some(30),
            total_customers: Some(5),
        };
        let orders = vec![order("10.00", "EUR", &[1])];

        let snap = aggregate(&report, &orders, &[], None, "USD");
        assert_eq!(snap.total_revenue, Decimal::from(500));
        assert_eq!(snap.total_orders, 12);
        assert_eq!(snap.total_items, 30);
        assert_eq!(snap.active_customers, 5);
        assert_eq!(snap.currency, "EUR");
        assert!(!snap.has_comparison());
    }

    #[test]
    fn test_aggregate_falls_back_to_samples() {
        let orders = vec![
            order("19.90", "GBP", &[2, 1]),
            order("5.10", "GBP", &[4]),
        ];
        let customers = vec![
            CustomerSummary {
                id: CustomerId::new(1),
                created_gmt: parse_timestamp("2024-03-10T08:00:00"),
            },
            CustomerSummary {
                id: CustomerId::new(2),
                created_gmt: parse_timestamp("2023-12-01T08:00:00"),
            },
            CustomerSummary {
                id: CustomerId::new(3),
                created_gmt: None,
            },
        ];

        let snap = aggregate(
            &SalesReport::default(),
            &orders,
            &customers,
            Some(&march()),
            "USD",
        );
        assert_eq!(snap.total_revenue, Decimal::from(25));
        assert_eq!(snap.total_orders, 2);
        assert_eq!(snap.total_items, 7);
        assert_eq!(snap.active_customers, 1);
        assert_eq!(snap.currency, "GBP");

        let all_time = aggregate(&SalesReport::default(), &[], &customers, None, "USD");
        assert_eq!(all_time.active_customers, 3);
        assert_eq!(all_time.currency, "USD");
    }

    #[test]
    fn test_sample_revenue_saturates() {
        let huge = Decimal::MAX.to_string();
        let orders = vec![order(&huge, "USD", &[1]), order(&huge, "USD", &[1])];

        let snap = aggregate(&SalesReport::default(), &orders, &[], None, "USD");
        assert_eq!(snap.total_revenue, Decimal::MAX);
        assert_eq!(snap.total_orders, 2);
    }

    #[test]
    fn test_report_range_all_time_is_explicit() {
        let today = Utc.with_ymd_and_hms(2024, 6, 2, 18, 30, 0).unwrap();
        let params = report_range(None, today);
        assert_eq!(
            params,
            vec![
                ("date_min", ALL_TIME_START.to_string()),
                ("date_max", "2024-06-02".to_string()),
            ]
        );

        let bounded = report_range(Some(&march()), today);
        assert_eq!(bounded[0], ("date_min", "2024-03-01".to_string()));
        assert_eq!(bounded[1], ("date_max", "2024-03-31".to_string()));
    }

    #[test]
    fn test_fail_soft_zeroes() {
        let snap = fail_soft(Err(WooError::NotConfigured), "CAD");
        assert!(snap.is_zero());
        assert_eq!(snap.currency, "CAD");

        let ok = StatsSnapshot {
            total_orders: 3,
            ..StatsSnapshot::zeroed("USD")
        };
        assert_eq!(fail_soft(Ok(ok.clone()), "CAD"), ok);
    }
}
