//! # Day Commands
//!
//! Payment of a selection and the end-of-day close.
//!
//! ## Evening Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   pay 1 2 ──► quote shown ──┬── confirm ──► visitors finished           │
//! │                             └── cancel  ──► nothing changes             │
//! │                                                                         │
//! │   close-day ──┬── everyone finished ──► history + empty room           │
//! │               └── someone unpaid    ──► "settle all visitors" + names  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use lounge_core::{DayReport, HistoryRecord, Money, Receipt, ReceiptLine, Settlement, VisitorId};
use serde::Serialize;
use tabled::Tabled;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ErrorCode};
use crate::state::{ConfigState, TariffsState, VisitorsState};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct ReceiptLineRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Min")]
    minutes: i64,
    #[tabled(rename = "Cost")]
    cost: String,
}

impl ReceiptLineRow {
    pub fn new(line: &ReceiptLine, config: &ConfigState) -> Self {
        ReceiptLineRow {
            id: line.visitor_id.get(),
            name: line.name.clone(),
            minutes: line.duration_minutes,
            cost: config.format_currency(line.cost),
        }
    }
}

/// An archived visitor.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryDto {
    pub record_id: String,
    pub visitor_id: u64,
    pub name: String,
    pub tariff: String,
    pub checked_in_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    pub cost_cents: i64,
    pub closed_at: DateTime<Utc>,
}

impl From<&HistoryRecord> for HistoryDto {
    fn from(record: &HistoryRecord) -> Self {
        HistoryDto {
            record_id: record.record_id.to_string(),
            visitor_id: record.visitor.id.get(),
            name: record.visitor.name.clone(),
            tariff: record.tariff_title.clone(),
            checked_in_at: record.visitor.checked_in_at(),
            finished_at: record.visitor.finished_at(),
            duration_minutes: record.duration_minutes,
            cost_cents: record.cost.cents(),
            closed_at: record.closed_at,
        }
    }
}

#[derive(Tabled)]
pub struct HistoryRow {
    #[tabled(rename = "Closed")]
    closed: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Tariff")]
    tariff: String,
    #[tabled(rename = "In")]
    checked_in: String,
    #[tabled(rename = "Out")]
    finished: String,
    #[tabled(rename = "Min")]
    minutes: i64,
    #[tabled(rename = "Cost")]
    cost: String,
}

impl HistoryRow {
    pub fn new(dto: &HistoryDto, config: &ConfigState) -> Self {
        HistoryRow {
            closed: config.format_datetime(dto.closed_at),
            name: dto.name.clone(),
            tariff: dto.tariff.clone(),
            checked_in: config.format_time(dto.checked_in_at),
            finished: dto
                .finished_at
                .map(|at| config.format_time(at))
                .unwrap_or_else(|| "-".to_string()),
            minutes: dto.duration_minutes,
            cost: config.format_currency(Money::from_cents(dto.cost_cents)),
        }
    }
}

// ── Payment ─────────────────────────────────────────────────────────

/// Prices the selection and holds it until `confirm` or `cancel`.
///
/// With `all`, every unsettled visitor is selected.
pub fn quote_payment(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    ids: &[u64],
    all: bool,
    now: DateTime<Utc>,
) -> Result<Settlement, ApiError> {
    debug!(?ids, all, "quote_payment command");

    tariffs.with_tariffs(|t| {
        visitors.with_book_mut(|book| -> Result<Settlement, ApiError> {
            let selection: Vec<VisitorId> = if all {
                book.live().iter().filter(|v| !v.is_finished()).map(|v| v.id).collect()
            } else {
                ids.iter().copied().map(VisitorId::new).collect()
            };
            let settlement = book.begin_settlement(&selection, t, now)?.clone();
            info!(visitors = settlement.lines.len(), total = %settlement.total, "Payment quoted");
            Ok(settlement)
        })
    })
}

/// Marks the pending selection as paid.
pub fn confirm_payment(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    now: DateTime<Utc>,
) -> Result<Receipt, ApiError> {
    debug!("confirm_payment command");

    let receipt = tariffs
        .with_tariffs(|t| visitors.with_book_mut(|book| book.confirm_settlement(t, now)))?;
    info!(visitors = receipt.lines.len(), total = %receipt.total, "Payment confirmed");
    Ok(receipt)
}

/// Drops the pending selection.
pub fn cancel_payment(visitors: &VisitorsState) -> Result<Settlement, ApiError> {
    debug!("cancel_payment command");
    let dropped = visitors.with_book_mut(|book| book.cancel_settlement())?;
    info!(visitors = dropped.lines.len(), "Payment cancelled");
    Ok(dropped)
}

/// The payment waiting for confirmation, if any.
pub fn pending_payment(visitors: &VisitorsState) -> Option<Settlement> {
    visitors.with_book(|book| book.pending().cloned())
}

// ── Day close ───────────────────────────────────────────────────────

/// Whether the day can be closed and who is holding it up.
#[derive(Debug, Clone, Serialize)]
pub struct DayStatus {
    pub live: usize,
    pub unsettled: Vec<String>,
    pub can_close: bool,
}

pub fn day_status(visitors: &VisitorsState) -> DayStatus {
    visitors.with_book(|book| DayStatus {
        live: book.len(),
        unsettled: book.unsettled(),
        can_close: book.can_close_day(),
    })
}

/// Archives everyone into history.
///
/// Refused while anyone has not paid; the error lists who.
pub fn close_day(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    now: DateTime<Utc>,
) -> Result<DayReport, ApiError> {
    debug!("close_day command");

    let result = tariffs.with_tariffs(|t| visitors.with_book_mut(|book| book.close_day(t, now)));
    match result {
        Ok(report) => {
            info!(
                visitors = report.visitors,
                revenue = %report.revenue,
                minutes = report.minutes,
                "Day closed"
            );
            Ok(report)
        }
        Err(err) => {
            let err = ApiError::from(err);
            if err.code == ErrorCode::DayNotClosable {
                warn!("Day close refused: {}", err.message);
            }
            Err(err)
        }
    }
}

/// Everyone archived so far, oldest first.
pub fn get_history(visitors: &VisitorsState) -> Vec<HistoryDto> {
    debug!("get_history command");
    visitors.with_book(|book| book.history().iter().map(HistoryDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::visitor::{add_visitor, toggle_pause, AddVisitorRequest};
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 8, 19, hour, min, 0).unwrap()
    }

    fn setup(names: &[&str]) -> (TariffsState, VisitorsState, Vec<u64>) {
        let tariffs = TariffsState::default();
        let visitors = VisitorsState::new();
        let ids = names
            .iter()
            .map(|name| {
                add_visitor(
                    &tariffs,
                    &visitors,
                    AddVisitorRequest {
                        name: name.to_string(),
                        ..Default::default()
                    },
                    at(12, 0),
                )
                .unwrap()
                .id
            })
            .collect();
        (tariffs, visitors, ids)
    }

    #[test]
    fn test_pay_confirm_close() {
        let (tariffs, visitors, ids) = setup(&["Franz", "Hans"]);

        let quote = quote_payment(&tariffs, &visitors, &ids, false, at(12, 30)).unwrap();
        assert_eq!(quote.total, Money::from_cents(15_000));
        assert!(pending_payment(&visitors).is_some());

        let receipt = confirm_payment(&tariffs, &visitors, at(12, 30)).unwrap();
        assert_eq!(receipt.total, Money::from_cents(15_000));
        assert!(day_status(&visitors).can_close);

        let report = close_day(&tariffs, &visitors, at(23, 0)).unwrap();
        assert_eq!(report.visitors, 2);
        assert_eq!(report.revenue, Money::from_cents(15_000));

        let history = get_history(&visitors);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].finished_at, Some(at(12, 30)));
        assert_eq!(day_status(&visitors).live, 0);
    }

    #[test]
    fn test_history_keeps_paid_cost_after_tariff_edit() {
        use crate::commands::tariff::{update_tariff, UpdateTariffRequest};

        let (tariffs, visitors, ids) = setup(&["Franz"]);
        quote_payment(&tariffs, &visitors, &ids, false, at(12, 30)).unwrap();
        let receipt = confirm_payment(&tariffs, &visitors, at(12, 30)).unwrap();

        update_tariff(
            &tariffs,
            &visitors,
            1,
            UpdateTariffRequest {
                rate: Some("5".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let report = close_day(&tariffs, &visitors, at(23, 0)).unwrap();
        assert_eq!(report.revenue, receipt.total);
        assert_eq!(get_history(&visitors)[0].cost_cents, 7_500);
    }

    #[test]
    fn test_pay_all_skips_settled() {
        let (tariffs, visitors, ids) = setup(&["Franz", "Hans"]);
        quote_payment(&tariffs, &visitors, &ids[..1], false, at(12, 30)).unwrap();
        confirm_payment(&tariffs, &visitors, at(12, 30)).unwrap();

        let quote = quote_payment(&tariffs, &visitors, &[], true, at(13, 0)).unwrap();
        assert_eq!(quote.lines.len(), 1);
        assert_eq!(quote.lines[0].name, "Hans");
    }

    #[test]
    fn test_cancel_keeps_visitors_running() {
        let (tariffs, visitors, ids) = setup(&["Franz"]);
        quote_payment(&tariffs, &visitors, &ids, false, at(12, 30)).unwrap();
        cancel_payment(&visitors).unwrap();

        assert!(pending_payment(&visitors).is_none());
        assert_eq!(day_status(&visitors).unsettled, vec!["Franz".to_string()]);
        assert_eq!(
            confirm_payment(&tariffs, &visitors, at(12, 31)).unwrap_err().code,
            ErrorCode::SettlementError
        );
    }

    #[test]
    fn test_close_day_refused_with_names() {
        let (tariffs, visitors, ids) = setup(&["Franz", "Hans"]);
        toggle_pause(&tariffs, &visitors, ids[1], at(12, 10)).unwrap();

        let err = close_day(&tariffs, &visitors, at(23, 0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::DayNotClosable);
        assert!(err.message.contains("Franz, Hans"));
        assert_eq!(day_status(&visitors).live, 2);
        assert!(get_history(&visitors).is_empty());
    }

    #[test]
    fn test_empty_selection() {
        let (tariffs, visitors, _) = setup(&[]);
        let err = quote_payment(&tariffs, &visitors, &[], true, at(12, 0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::SettlementError);
    }
}
