//! # Billing Module
//!
//! Duration and cost calculation for visitor sessions.
//!
//! ## Active Time
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  times:  Active 12:00   Paused 12:40   Active 13:00   Finished 13:30   │
//! │                                                                         │
//! │          ├───── 40 min ─────┤            ├──── 30 min ────┤             │
//! │                             └─ not billed┘                              │
//! │                                                                         │
//! │  active duration = 70 min                                               │
//! │                                                                         │
//! │  A trailing Active event (no closing event yet) is measured to "now".   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cost
//! - per-minute: `min(rate × minutes − discount, max_cost)`
//! - flat: `max_cost − discount`

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::CoreResult;
use crate::money::Money;
use crate::tariffs::TariffBook;
use crate::types::{BillingMode, Tariff, TimeEvent, Visitor, VisitorStatus};

// =============================================================================
// Duration
// =============================================================================

/// Sums the active spans of a visitor timeline.
///
/// Each span opens at an `Active` event and closes at the next pause or
/// finish. Consecutive `Active` events extend the same span. Spans that would
/// be negative (clock skew between events) count as zero.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use lounge_core::billing::active_duration;
/// use lounge_core::{TimeEvent, VisitorStatus};
///
/// let t = |h, m| Utc.with_ymd_and_hms(2020, 8, 19, h, m, 0).unwrap();
/// let times = [
///     TimeEvent::new(VisitorStatus::Active, t(12, 0)),
///     TimeEvent::new(VisitorStatus::Paused, t(12, 40)),
///     TimeEvent::new(VisitorStatus::Active, t(13, 0)),
///     TimeEvent::new(VisitorStatus::Finished, t(13, 30)),
/// ];
/// assert_eq!(active_duration(&times, t(23, 0)).num_minutes(), 70);
/// ```
pub fn active_duration(times: &[TimeEvent], now: DateTime<Utc>) -> Duration {
    let mut total = Duration::zero();
    let mut open: Option<DateTime<Utc>> = None;

    for event in times {
        match (event.status, open) {
            (VisitorStatus::Active, None) => open = Some(event.at),
            (VisitorStatus::Active, Some(_)) => {}
            (_, Some(start)) => {
                total = total + span(start, event.at);
                open = None;
            }
            (_, None) => {}
        }
    }

    if let Some(start) = open {
        total = total + span(start, now);
    }

    total
}

fn span(start: DateTime<Utc>, end: DateTime<Utc>) -> Duration {
    (end - start).max(Duration::zero())
}

/// Whole elapsed minutes; partial minutes are not billed.
#[inline]
pub fn billable_minutes(duration: Duration) -> i64 {
    duration.num_minutes().max(0)
}

// =============================================================================
// Cost
// =============================================================================

/// Cost of a visitor session under `tariff` as of `now`.
///
/// `now` only matters while the visitor is unsettled; a finished timeline is
/// closed and its cost is fixed.
pub fn visitor_cost(visitor: &Visitor, tariff: &Tariff, now: DateTime<Utc>) -> Money {
    summarize(visitor, tariff, now).cost
}

/// Duration and cost for one visitor, as shown in listings and receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisitSummary {
    pub duration_minutes: i64,
    pub cost: Money,
}

/// Computes duration and cost in one pass.
///
/// A visitor who has paid keeps the summary on their receipt; the tariff is
/// not consulted again.
pub fn summarize(visitor: &Visitor, tariff: &Tariff, now: DateTime<Utc>) -> VisitSummary {
    if let Some(paid) = visitor.paid() {
        return paid;
    }

    let duration_minutes = billable_minutes(active_duration(visitor.times(), now));
    let discount = visitor.discount.percent();

    let cost = match tariff.billing {
        BillingMode::PerMinute { rate } => rate
            .for_minutes(duration_minutes)
            .less_percent(discount)
            .min(tariff.max_cost),
        BillingMode::Flat => tariff.max_cost.less_percent(discount),
    };

    VisitSummary {
        duration_minutes,
        cost,
    }
}

/// Looks up the visitor's tariff and summarizes the session.
pub fn summarize_with(
    visitor: &Visitor,
    tariffs: &TariffBook,
    now: DateTime<Utc>,
) -> CoreResult<VisitSummary> {
    let tariff = tariffs.get(visitor.tariff_id)?;
    Ok(summarize(visitor, tariff, now))
}

/// Total cost of a selection of visitors.
///
/// Fails if any visitor refers to a tariff that no longer exists.
pub fn total_cost<'a, I>(
    visitors: I,
    tariffs: &TariffBook,
    now: DateTime<Utc>,
) -> CoreResult<Money>
where
    I: IntoIterator<Item = &'a Visitor>,
{
    visitors
        .into_iter()
        .map(|visitor| summarize_with(visitor, tariffs, now).map(|s| s.cost))
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
