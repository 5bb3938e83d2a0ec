//! Store statistics command.

use chrono::{NaiveDate, NaiveTime, Utc};
use woo_orders_core::{DatePreset, Period};

use super::{CommandError, client};
use crate::output;

/// The period a `stats` invocation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    AllTime,
    Preset(DatePreset),
    Days { from: NaiveDate, to: NaiveDate },
}

impl Range {
    /// `--range` wins; `--from`/`--to` come as a pair (clap enforces it).
    #[must_use]
    pub const fn from_args(
        preset: Option<DatePreset>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Self {
        match (preset, from, to) {
            (Some(preset), _, _) => Self::Preset(preset),
            (None, Some(from), Some(to)) => Self::Days { from, to },
            _ => Self::AllTime,
        }
    }

    /// Resolve to UTC bounds. `--compare` without a range compares the
    /// last 30 days.
    fn period(self, compare: bool) -> Option<Period> {
        let now = Utc::now();
        match self {
            Self::AllTime if compare => Some(DatePreset::Last30d.period(now)),
            Self::AllTime => None,
            Self::Preset(preset) => Some(preset.period(now)),
            Self::Days { from, to } => Some(Period::whole_days(
                from.and_time(NaiveTime::MIN).and_utc(),
                to.and_time(NaiveTime::MIN).and_utc(),
            )),
        }
    }

    fn label(self) -> String {
        match self {
            Self::AllTime => "All time".to_string(),
            Self::Preset(preset) => preset.label().to_string(),
            Self::Days { from, to } => format!("{from} to {to}"),
        }
    }
}

/// Show statistics, optionally against the preceding period.
///
/// Statistics never fail: an unreachable store shows zeroes and logs a
/// warning.
pub async fn show(range: Range, compare: bool, json: bool) -> Result<(), CommandError> {
    let client = client()?;
    let period = range.period(compare);

    let snapshot = match period {
        Some(period) if compare => client.get_stats_with_comparison(period).await,
        _ => client.get_stats(period).await,
    };

    if json {
        output::json(&snapshot)
    } else {
        let label = if compare && range == Range::AllTime {
            DatePreset::Last30d.label().to_string()
        } else {
            range.label()
        };
        output::stats(&snapshot, &label);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_range_from_args() {
        assert_eq!(Range::from_args(None, None, None), Range::AllTime);
        assert_eq!(
            Range::from_args(Some(DatePreset::Last7d), None, None),
            Range::Preset(DatePreset::Last7d)
        );

        let from = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(
            Range::from_args(None, Some(from), Some(to)),
            Range::Days { from, to }
        );
    }

    #[test]
    fn test_days_cover_whole_days() {
        let from = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let period = Range::Days { from, to }.period(false).unwrap();

        assert_eq!(period.start.date_naive(), from);
        assert_eq!(period.end.date_naive(), to);
        assert_eq!(period.end.time().format("%H:%M:%S").to_string(), "23:59:59");
    }

    #[test]
    fn test_all_time_has_no_period_unless_comparing() {
        assert!(Range::AllTime.period(false).is_none());
        assert!(Range::AllTime.period(true).is_some());
    }
}
