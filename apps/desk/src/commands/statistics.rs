//! # Statistics Commands
//!
//! The daily bar chart over history. The filter (period and indicator) is
//! kept in [`StatisticsState`] so repeated `stats` calls keep the last view.

use chrono::NaiveDate;
use lounge_core::statistics::daily_series;
use lounge_core::validation::parse_date;
use lounge_core::{Indicator, Money, StatisticsQuery};
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use crate::error::ApiError;
use crate::output::bar;
use crate::state::{ConfigState, StatisticsState, VisitorsState};

/// Width of a full bar in the table view.
const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, Default)]
pub struct StatisticsRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub indicator: Option<Indicator>,
    /// Start from an empty filter instead of the previous one.
    pub reset: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarDto {
    pub date: NaiveDate,
    pub value: i64,
    pub fullness_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsDto {
    pub indicator: Indicator,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub points: Vec<BarDto>,
    pub max_value: i64,
}

#[derive(Tabled)]
pub struct BarRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "")]
    bar: String,
}

impl BarRow {
    pub fn new(point: &BarDto, indicator: Indicator, config: &ConfigState) -> Self {
        let value = if indicator.is_money() {
            config.format_currency(Money::from_cents(point.value))
        } else {
            point.value.to_string()
        };
        BarRow {
            date: point.date.format("%d.%m.%Y").to_string(),
            value,
            bar: bar(point.fullness_percent, BAR_WIDTH),
        }
    }
}

/// Builds the chart, remembering the filter for next time.
///
/// Business dates are taken in the venue's configured UTC offset.
pub fn get_statistics(
    statistics: &StatisticsState,
    visitors: &VisitorsState,
    config: &ConfigState,
    request: StatisticsRequest,
) -> Result<StatisticsDto, ApiError> {
    debug!(?request, "get_statistics command");

    let mut query = if request.reset {
        StatisticsQuery::default()
    } else {
        statistics.query()
    };
    if let Some(from) = &request.from {
        query.start = Some(parse_date("from", from)?);
    }
    if let Some(to) = &request.to {
        query.end = Some(parse_date("to", to)?);
    }
    if let Some(indicator) = request.indicator {
        query.indicator = indicator;
    }

    let offset = config.utc_offset();
    let series = visitors.with_book(|book| daily_series(book.history(), &query, offset))?;
    statistics.set_query(query);

    let points = series
        .points
        .iter()
        .map(|p| BarDto {
            date: p.date,
            value: p.value,
            fullness_percent: p.fullness_percent(series.max_value),
        })
        .collect();

    Ok(StatisticsDto {
        indicator: series.indicator,
        start: query.start,
        end: query.end,
        points,
        max_value: series.max_value,
    })
}
