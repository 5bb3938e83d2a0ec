//! Store statistics snapshots and period-over-period comparison.
//!
//! A snapshot is computed on demand and never stored. Two snapshots taken
//! back to back may disagree because the store keeps taking orders between
//! the fetches; nothing here tries to reconcile them.

use chrono::{DateTime, Days, Duration, Months, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Price;

// =============================================================================
// Snapshot
// =============================================================================

/// Revenue, order, item and customer totals for one period.
///
/// The `*_change` fields are percentages relative to the preceding period of
/// equal length and are only present on snapshots built by a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_revenue: Decimal,
    pub total_orders: u64,
    /// Units sold.
    pub total_items: u64,
    pub active_customers: u64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers_change: Option<f64>,
}

impl StatsSnapshot {
    /// All-zero snapshot with no deltas.
    #[must_use]
    pub fn zeroed(currency: impl Into<String>) -> Self {
        Self {
            total_revenue: Decimal::ZERO,
            total_orders: 0,
            total_items: 0,
            active_customers: 0,
            currency: currency.into(),
            revenue_change: None,
            orders_change: None,
            sales_change: None,
            customers_change: None,
        }
    }

    /// Whether every numeric field is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.total_revenue.is_zero()
            && self.total_orders == 0
            && self.total_items == 0
            && self.active_customers == 0
    }

    /// Whether deltas have been attached.
    #[must_use]
    pub const fn has_comparison(&self) -> bool {
        self.revenue_change.is_some()
    }

    /// Revenue with currency, for display.
    #[must_use]
    pub fn revenue(&self) -> Price {
        Price::new(self.total_revenue, self.currency.clone())
    }

    /// Attach percentage deltas against `previous`.
    #[must_use]
    pub fn with_comparison(mut self, previous: &Self) -> Self {
        self.revenue_change = Some(percent_change_decimal(
            self.total_revenue,
            previous.total_revenue,
        ));
        self.orders_change = Some(percent_change_count(self.total_orders, previous.total_orders));
        self.sales_change = Some(percent_change_count(self.total_items, previous.total_items));
        self.customers_change = Some(percent_change_count(
            self.active_customers,
            previous.active_customers,
        ));
        self
    }
}

/// `(current - previous) / previous * 100`.
///
/// Defined as `0.0` when `previous` is zero, so growth from nothing reads
/// as "no change" rather than infinity.
#[must_use]
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// Same as [`percent_change`], and also `0.0` when the ratio does not fit
/// in a `Decimal`.
fn percent_change_decimal(current: Decimal, previous: Decimal) -> f64 {
    if previous.is_zero() {
        return 0.0;
    }
    current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|percent| percent.to_f64())
        .unwrap_or(0.0)
}

// Order and customer counts never approach 2^52.
#[allow(clippy::cast_precision_loss)]
fn percent_change_count(current: u64, previous: u64) -> f64 {
    percent_change(current as f64, previous as f64)
}

// =============================================================================
// Periods
// =============================================================================

/// A closed UTC time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Create a period. Bounds given in reverse are swapped.
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Length of the period.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The immediately preceding period of the same length.
    ///
    /// It ends one millisecond before `start`.
    #[must_use]
    pub fn preceding(&self) -> Self {
        let end = self.start - Duration::milliseconds(1);
        Self {
            start: end - self.duration(),
            end,
        }
    }

    /// Whether `instant` falls inside the period (inclusive).
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Whole-day period from the start of `from`'s day to the end of `to`'s.
    #[must_use]
    pub fn whole_days(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self::new(start_of_day(from), end_of_day(to))
    }
}

fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(instant) + Duration::days(1) - Duration::milliseconds(1)
}

/// Preset ranges offered by the dashboard's range picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePreset {
    Last24h,
    Last7d,
    Last30d,
    Last4m,
}

impl DatePreset {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Last24h => "Last 24 hours",
            Self::Last7d => "Last 7 days",
            Self::Last30d => "Last 30 days",
            Self::Last4m => "Last 4 months",
        }
    }

    /// Resolve against `now`, widened to whole UTC days.
    #[must_use]
    pub fn period(self, now: DateTime<Utc>) -> Period {
        let from = match self {
            Self::Last24h => now.checked_sub_days(Days::new(1)),
            Self::Last7d => now.checked_sub_days(Days::new(7)),
            Self::Last30d => now.checked_sub_days(Days::new(30)),
            Self::Last4m => now.checked_sub_months(Months::new(4)),
        }
        .unwrap_or(now);
        Period::whole_days(from, now)
    }
}

/// Unknown preset name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown date range preset: {0} (expected last24h, last7d, last30d or last4m)")]
pub struct ParsePresetError(pub String);

impl std::str::FromStr for DatePreset {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "last24h" | "24h" => Ok(Self::Last24h),
            "last7d" | "7d" => Ok(Self::Last7d),
            "last30d" | "30d" => Ok(Self::Last30d),
            "last4m" | "4m" => Ok(Self::Last4m),
            _ => Err(ParsePresetError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;

    use super::*;

    fn snapshot(revenue: i64, orders: u64, items: u64, customers: u64) -> StatsSnapshot {
        StatsSnapshot {
            total_revenue: Decimal::from(revenue),
            total_orders: orders,
            total_items: items,
            active_customers: customers,
            ..StatsSnapshot::zeroed("USD")
        }
    }

    #[test]
    fn test_percent_change() {
        assert!((percent_change(150.0, 100.0) - 50.0).abs() < f64::EPSILON);
        assert!((percent_change(50.0, 100.0) + 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_change_from_zero_is_zero() {
        assert!(percent_change(150.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_comparison() {
        let current = snapshot(150, 4, 10, 3);
        let previous = snapshot(100, 2, 0, 3);
        let compared = current.with_comparison(&previous);

        assert!((compared.revenue_change.unwrap() - 50.0).abs() < f64::EPSILON);
        assert!((compared.orders_change.unwrap() - 100.0).abs() < f64::EPSILON);
        assert!(compared.sales_change.unwrap().abs() < f64::EPSILON);
        assert!(compared.customers_change.unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_comparison_extreme_ratio_is_zero() {
        let cent = StatsSnapshot {
            total_revenue: Decimal::new(1, 2),
            ..StatsSnapshot::zeroed("USD")
        };
        let huge = StatsSnapshot {
            total_revenue: Decimal::from_str("79228162514264337593543950").unwrap(),
            ..StatsSnapshot::zeroed("USD")
        };
        let max = StatsSnapshot {
            total_revenue: Decimal::MAX,
            ..StatsSnapshot::zeroed("USD")
        };

        assert!(huge.with_comparison(&cent).revenue_change.unwrap().abs() < f64::EPSILON);
        assert!(max.clone().with_comparison(&cent).revenue_change.unwrap().abs() < f64::EPSILON);

        let collapse = cent.with_comparison(&max).revenue_change.unwrap();
        assert!((collapse + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zeroed() {
        let snap = StatsSnapshot::zeroed("EUR");
        assert!(snap.is_zero());
        assert!(!snap.has_comparison());
        assert_eq!(snap.currency, "EUR");
    }

    #[test]
    fn test_preceding_period() {
        let start = Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 14, 23, 59, 59).unwrap();
        let period = Period::new(start, end);
        let previous = period.preceding();

        assert_eq!(previous.end, start - Duration::milliseconds(1));
        assert_eq!(previous.duration(), period.duration());
        assert!(previous.end < period.start);
    }

    #[test]
    fn test_period_new_swaps_reversed_bounds() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let period = Period::new(b, a);
        assert_eq!(period.start, a);
        assert!(period.contains(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_preset_last7d_whole_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 14, 15, 30, 0).unwrap();
        let period = DatePreset::Last7d.period(now);

        assert_eq!(period.start, Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap());
        assert_eq!(
            period.end,
            Utc.with_ymd_and_hms(2024, 3, 14, 23, 59, 59).unwrap() + Duration::milliseconds(999)
        );
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(DatePreset::from_str("last4m"), Ok(DatePreset::Last4m));
        assert_eq!(DatePreset::from_str("30D"), Ok(DatePreset::Last30d));
        assert!(DatePreset::from_str("yesterday").is_err());
    }
}
