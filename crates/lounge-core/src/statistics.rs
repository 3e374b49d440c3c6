//! # Statistics
//!
//! Daily aggregates over the history archive, shaped for a bar chart.
//!
//! ```text
//! history ──► filter by business date ──► group by day ──► BarSeries
//!                  (start..=end)             (BTreeMap)      points + max
//!
//!   value │      ▇
//!         │  ▇   ▇       fullness = value / max × 100
//!         │  ▇   ▇   ▇
//!         └──────────────
//!           19  20  21
//! ```
//!
//! Business dates are taken in the venue's UTC offset, so a visitor closed at
//! 01:00 local time on the 20th counts for the 20th even though it is still
//! the 19th in UTC.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::HistoryRecord;
use crate::validation::validate_date_range;

// =============================================================================
// Indicator
// =============================================================================

/// What a bar measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Number of archived visitors.
    #[default]
    Visitors,
    /// Revenue in minor units.
    Revenue,
    /// Billed minutes.
    Minutes,
    /// Revenue per visitor in minor units.
    AverageCheck,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::Visitors,
        Indicator::Revenue,
        Indicator::Minutes,
        Indicator::AverageCheck,
    ];

    /// Whether values are amounts of money (minor units).
    pub fn is_money(&self) -> bool {
        matches!(self, Indicator::Revenue | Indicator::AverageCheck)
    }

    fn measure(&self, day: &DayTotals) -> i64 {
        match self {
            Indicator::Visitors => day.visitors,
            Indicator::Revenue => day.revenue.cents(),
            Indicator::Minutes => day.minutes,
            Indicator::AverageCheck => day.revenue.average_over(day.visitors).cents(),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Indicator::Visitors => "visitors",
            Indicator::Revenue => "revenue",
            Indicator::Minutes => "minutes",
            Indicator::AverageCheck => "average_check",
        };
        f.write_str(label)
    }
}

impl FromStr for Indicator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_lowercase();
        Indicator::ALL
            .into_iter()
            .find(|indicator| indicator.to_string() == wanted)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "indicator".to_string(),
                reason: format!("unknown indicator '{s}'"),
            })
    }
}

// =============================================================================
// Query
// =============================================================================

/// The statistics screen's filter: an optional inclusive date range and the
/// indicator to chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatisticsQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub indicator: Indicator,
}

impl StatisticsQuery {
    pub fn validate(&self) -> CoreResult<()> {
        validate_date_range(self.start, self.end)?;
        Ok(())
    }

    /// Whether `date` falls inside the range. Open ends match everything.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

// =============================================================================
// Series
// =============================================================================

/// One bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BarPoint {
    pub date: NaiveDate,
    pub value: i64,
}

impl BarPoint {
    /// Bar height relative to the tallest bar, in percent.
    pub fn fullness_percent(&self, max: i64) -> f64 {
        if max <= 0 {
            return 0.0;
        }
        self.value as f64 / max as f64 * 100.0
    }
}

/// Chart data: one point per business day with history, ascending by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarSeries {
    pub indicator: Indicator,
    pub points: Vec<BarPoint>,
    pub max_value: i64,
}

impl BarSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of all bars. Meaningless for averages, so callers chart those only.
    pub fn total(&self) -> i64 {
        self.points.iter().map(|p| p.value).sum()
    }
}

#[derive(Debug, Default)]
struct DayTotals {
    visitors: i64,
    revenue: Money,
    minutes: i64,
}

/// Groups history by business date in `offset` and measures each day.
pub fn daily_series(
    history: &[HistoryRecord],
    query: &StatisticsQuery,
    offset: FixedOffset,
) -> CoreResult<BarSeries> {
    query.validate()?;

    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for record in history {
        let date = record.closed_at.with_timezone(&offset).date_naive();
        if !query.contains(date) {
            continue;
        }
        let day = days.entry(date).or_default();
        day.visitors += 1;
        day.revenue += record.cost;
        day.minutes += record.duration_minutes;
    }

    let points: Vec<BarPoint> = days
        .iter()
        .map(|(date, totals)| BarPoint {
            date: *date,
            value: query.indicator.measure(totals),
        })
        .collect();
    let max_value = points.iter().map(|p| p.value).max().unwrap_or(0);

    Ok(BarSeries {
        indicator: query.indicator,
        points,
        max_value,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Discount, TariffId, Visitor, VisitorId};
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn record(closed_at: DateTime<Utc>, minutes: i64, cost: i64) -> HistoryRecord {
        HistoryRecord {
            record_id: Uuid::new_v4(),
            visitor: Visitor::check_in(
                VisitorId::new(1),
                "Franz",
                TariffId::new(1),
                Discount::none(),
                closed_at,
            ),
            tariff_title: "2,5р/мин".to_string(),
            duration_minutes: minutes,
            cost: Money::from_cents(cost),
            closed_at,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 8, d).unwrap()
    }

    fn history() -> Vec<HistoryRecord> {
        vec![
            record(Utc.with_ymd_and_hms(2020, 8, 19, 20, 0, 0).unwrap(), 30, 7_500),
            record(Utc.with_ymd_and_hms(2020, 8, 19, 20, 0, 0).unwrap(), 60, 15_000),
            record(Utc.with_ymd_and_hms(2020, 8, 21, 20, 0, 0).unwrap(), 10, 2_500),
        ]
    }

    fn query(indicator: Indicator) -> StatisticsQuery {
        StatisticsQuery {
            indicator,
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_by_day() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let series = daily_series(&history(), &query(Indicator::Visitors), utc).unwrap();
        assert_eq!(
            series.points,
            vec![BarPoint { date: day(19), value: 2 }, BarPoint { date: day(21), value: 1 }]
        );
        assert_eq!(series.max_value, 2);
    }

    #[test]
    fn test_indicators() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let revenue = daily_series(&history(), &query(Indicator::Revenue), utc).unwrap();
        assert_eq!(revenue.points[0].value, 22_500);
        assert_eq!(revenue.total(), 25_000);

        let minutes = daily_series(&history(), &query(Indicator::Minutes), utc).unwrap();
        assert_eq!(minutes.points[0].value, 90);

        let average = daily_series(&history(), &query(Indicator::AverageCheck), utc).unwrap();
        assert_eq!(average.points[0].value, 11_250);
        assert_eq!(average.max_value, 11_250);
    }

    #[test]
    fn test_business_date_uses_offset() {
        // 20:00 UTC is 23:00 in Moscow, 01:00 next day in Omsk
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        let omsk = FixedOffset::east_opt(6 * 3600).unwrap();
        let q = query(Indicator::Visitors);

        assert_eq!(daily_series(&history(), &q, moscow).unwrap().points[0].date, day(19));
        assert_eq!(daily_series(&history(), &q, omsk).unwrap().points[0].date, day(20));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let q = StatisticsQuery {
            start: Some(day(20)),
            end: Some(day(21)),
            indicator: Indicator::Visitors,
        };
        let series = daily_series(&history(), &q, utc).unwrap();
        assert_eq!(series.points, vec![BarPoint { date: day(21), value: 1 }]);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let q = StatisticsQuery {
            start: Some(day(21)),
            end: Some(day(19)),
            indicator: Indicator::Revenue,
        };
        assert!(daily_series(&history(), &q, utc).is_err());
    }

    #[test]
    fn test_empty_history() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let series = daily_series(&[], &query(Indicator::Revenue), utc).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.max_value, 0);
    }

    #[test]
    fn test_fullness_percent() {
        let point = BarPoint { date: day(19), value: 1 };
        assert_eq!(point.fullness_percent(4), 25.0);
        assert_eq!(point.fullness_percent(0), 0.0);
    }

    #[test]
    fn test_indicator_from_str() {
        assert_eq!("revenue".parse::<Indicator>().unwrap(), Indicator::Revenue);
        assert_eq!("Average-Check".parse::<Indicator>().unwrap(), Indicator::AverageCheck);
        assert!("profit".parse::<Indicator>().is_err());
    }
}
