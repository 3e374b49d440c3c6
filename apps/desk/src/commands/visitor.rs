//! # Visitor Commands
//!
//! Check-in, edits, removal and pause/resume of live visitors.
//!
//! ## Visitor Board
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ID  Name      Status    Tariff     Disc  In     Min   Cost            │
//! │  3   Hans      active    2,5р/мин   0%    12:10   50   125.00 ₽        │
//! │  2   Franz     paused    2,5р/мин   10%   12:00   40    90.00 ₽        │
//! │  1   Grete     finished  OneGame    0%    11:30   15   100.00 ₽        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use lounge_core::billing::summarize_with;
use lounge_core::{
    Discount, NewVisitor, TariffBook, TariffId, Visitor, VisitorId, VisitorStatus, VisitorUpdate,
};
use serde::Serialize;
use tabled::Tabled;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{ConfigState, TariffsState, VisitorsState};

/// A live visitor as shown on the board.
#[derive(Debug, Clone, Serialize)]
pub struct VisitorDto {
    pub id: u64,
    pub name: String,
    pub status: VisitorStatus,
    pub tariff_id: u32,
    pub tariff: String,
    pub discount_percent: u8,
    pub checked_in_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    pub cost_cents: i64,
}

impl VisitorDto {
    fn build(
        visitor: &Visitor,
        tariffs: &TariffBook,
        now: DateTime<Utc>,
    ) -> Result<Self, ApiError> {
        let tariff = tariffs.get(visitor.tariff_id)?;
        let summary = summarize_with(visitor, tariffs, now)?;
        Ok(VisitorDto {
            id: visitor.id.get(),
            name: visitor.name.clone(),
            status: visitor.status(),
            tariff_id: visitor.tariff_id.get(),
            tariff: tariff.title.clone(),
            discount_percent: visitor.discount.percent(),
            checked_in_at: visitor.checked_in_at(),
            finished_at: visitor.finished_at(),
            duration_minutes: summary.duration_minutes,
            cost_cents: summary.cost.cents(),
        })
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct VisitorRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Tariff")]
    tariff: String,
    #[tabled(rename = "Disc")]
    discount: String,
    #[tabled(rename = "In")]
    checked_in: String,
    #[tabled(rename = "Min")]
    minutes: i64,
    #[tabled(rename = "Cost")]
    cost: String,
}

impl VisitorRow {
    pub fn new(dto: &VisitorDto, config: &ConfigState) -> Self {
        VisitorRow {
            id: dto.id,
            name: dto.name.clone(),
            status: dto.status.to_string(),
            tariff: dto.tariff.clone(),
            discount: format!("{}%", dto.discount_percent),
            checked_in: config.format_time(dto.checked_in_at),
            minutes: dto.duration_minutes,
            cost: config.format_currency(lounge_core::Money::from_cents(dto.cost_cents)),
        }
    }
}

// ── Requests ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AddVisitorRequest {
    pub name: String,
    /// `None` picks the default tariff.
    pub tariff_id: Option<u32>,
    pub discount: Option<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct EditVisitorRequest {
    pub name: Option<String>,
    pub tariff_id: Option<u32>,
    pub discount: Option<u8>,
}

// ── Commands ────────────────────────────────────────────────────────

/// Lists live visitors: active first, then paused, then settled.
pub fn list_visitors(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    now: DateTime<Utc>,
) -> Result<Vec<VisitorDto>, ApiError> {
    debug!("list_visitors command");
    tariffs.with_tariffs(|t| {
        visitors.with_book(|book| {
            book.listing()
                .into_iter()
                .map(|v| VisitorDto::build(v, t, now))
                .collect::<Result<Vec<_>, _>>()
        })
    })
}

/// Checks a visitor in.
///
/// Without a tariff this is the quick check-in: default tariff, no
/// discount unless one is given.
pub fn add_visitor(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    request: AddVisitorRequest,
    now: DateTime<Utc>,
) -> Result<VisitorDto, ApiError> {
    debug!(
        name = %request.name,
        tariff_id = ?request.tariff_id,
        discount = ?request.discount,
        "add_visitor command"
    );

    let discount = match request.discount {
        Some(percent) => Discount::new(percent)?,
        None => Discount::none(),
    };

    tariffs.with_tariffs(|t| -> Result<VisitorDto, ApiError> {
        visitors.with_book_mut(|book| -> Result<VisitorDto, ApiError> {
            let id = match request.tariff_id {
                Some(tariff_id) => {
                    let new = NewVisitor::new(request.name, Some(TariffId::new(tariff_id)))
                        .with_discount(discount);
                    book.add(new, t, now)?
                }
                None => {
                    let id = book.quick_add(&request.name, t, now)?;
                    if discount != Discount::none() {
                        let update = VisitorUpdate {
                            discount: Some(discount),
                            ..Default::default()
                        };
                        book.edit(id, update, t)?;
                    }
                    id
                }
            };
            let visitor = book.get(id)?;
            info!(
                visitor_id = %id,
                name = %visitor.name,
                tariff_id = %visitor.tariff_id,
                "Visitor checked in"
            );
            VisitorDto::build(visitor, t, now)
        })
    })
}

/// Edits a visitor. Settled visitors can only be renamed.
pub fn edit_visitor(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    id: u64,
    request: EditVisitorRequest,
    now: DateTime<Utc>,
) -> Result<VisitorDto, ApiError> {
    debug!(visitor_id = id, ?request, "edit_visitor command");

    let update = VisitorUpdate {
        name: request.name,
        tariff_id: request.tariff_id.map(TariffId::new),
        discount: request.discount.map(Discount::new).transpose()?,
    };
    let id = VisitorId::new(id);

    tariffs.with_tariffs(|t| {
        visitors.with_book_mut(|book| -> Result<VisitorDto, ApiError> {
            book.edit(id, update, t)?;
            VisitorDto::build(book.get(id)?, t, now)
        })
    })
}

/// Removes visitors. Either all of them go or none does.
///
/// Returns the removed visitors' names.
pub fn delete_visitors(visitors: &VisitorsState, ids: &[u64]) -> Result<Vec<String>, ApiError> {
    debug!(?ids, "delete_visitors command");
    let ids: Vec<VisitorId> = ids.iter().copied().map(VisitorId::new).collect();

    let removed = visitors.with_book_mut(|book| book.delete_selected(&ids))?;
    let names: Vec<String> = removed.into_iter().map(|v| v.name).collect();
    info!(count = names.len(), "Visitors removed");
    Ok(names)
}

/// Pauses or resumes a visitor.
pub fn toggle_pause(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    id: u64,
    now: DateTime<Utc>,
) -> Result<VisitorDto, ApiError> {
    debug!(visitor_id = id, "toggle_pause command");
    let id = VisitorId::new(id);

    tariffs.with_tariffs(|t| {
        visitors.with_book_mut(|book| -> Result<VisitorDto, ApiError> {
            let status = book.toggle_pause(id, now)?;
            info!(visitor_id = %id, %status, "Visitor status changed");
            VisitorDto::build(book.get(id)?, t, now)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 8, 19, hour, min, 0).unwrap()
    }

    fn add(
        tariffs: &TariffsState,
        visitors: &VisitorsState,
        name: &str,
        now: DateTime<Utc>,
    ) -> VisitorDto {
        add_visitor(
            tariffs,
            visitors,
            AddVisitorRequest {
                name: name.to_string(),
                ..Default::default()
            },
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_quick_add_uses_default_tariff() {
        let tariffs = TariffsState::default();
        let visitors = VisitorsState::new();
        let dto = add(&tariffs, &visitors, "Franz", at(12, 0));
        assert_eq!(dto.tariff_id, 1);
        assert_eq!(dto.status, VisitorStatus::Active);
        assert_eq!(dto.cost_cents, 0);
    }

    #[test]
    fn test_add_without_tariff_keeps_discount() {
        let tariffs = TariffsState::default();
        let visitors = VisitorsState::new();
        let dto = add_visitor(
            &tariffs,
            &visitors,
            AddVisitorRequest {
                name: "Franz".to_string(),
                tariff_id: None,
                discount: Some(10),
            },
            at(12, 0),
        )
        .unwrap();
        assert_eq!(dto.tariff_id, 1);
        assert_eq!(dto.discount_percent, 10);

        tariffs
            .with_tariffs_mut(|t| t.set_default(TariffId::new(2)))
            .unwrap();
        let dto = add(&tariffs, &visitors, "Hans", at(12, 5));
        assert_eq!(dto.tariff_id, 2);
        assert_eq!(dto.discount_percent, 0);
    }

    #[test]
    fn test_add_rejects_bad_discount() {
        let tariffs = TariffsState::default();
        let visitors = VisitorsState::new();
        let err = add_visitor(
            &tariffs,
            &visitors,
            AddVisitorRequest {
                name: "Franz".to_string(),
                tariff_id: None,
                discount: Some(120),
            },
            at(12, 0),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_duplicate_name() {
        let tariffs = TariffsState::default();
        let visitors = VisitorsState::new();
        add(&tariffs, &visitors, "Franz", at(12, 0));
        let err = add_visitor(
            &tariffs,
            &visitors,
            AddVisitorRequest {
                name: "FRANZ".to_string(),
                ..Default::default()
            },
            at(12, 1),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "This name is already taken: FRANZ");
    }

    #[test]
    fn test_listing_reports_cost_so_far() {
        let tariffs = TariffsState::default();
        let visitors = VisitorsState::new();
        add(&tariffs, &visitors, "Franz", at(12, 0));
        add(&tariffs, &visitors, "Hans", at(12, 20));

        let rows = list_visitors(&tariffs, &visitors, at(12, 30)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cost_cents, 7_500);
        assert_eq!(rows[1].duration_minutes, 10);
    }

    #[test]
    fn test_toggle_pause_and_edit() {
        let tariffs = TariffsState::default();
        let visitors = VisitorsState::new();
        let dto = add(&tariffs, &visitors, "Franz", at(12, 0));

        let paused = toggle_pause(&tariffs, &visitors, dto.id, at(12, 10)).unwrap();
        assert_eq!(paused.status, VisitorStatus::Paused);

        let edited = edit_visitor(
            &tariffs,
            &visitors,
            dto.id,
            EditVisitorRequest {
                tariff_id: Some(4),
                discount: Some(50),
                ..Default::default()
            },
            at(12, 20),
        )
        .unwrap();
        assert_eq!(edited.tariff, "OneGame");
        assert_eq!(edited.cost_cents, 5_000);
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let tariffs = TariffsState::default();
        let visitors = VisitorsState::new();
        let dto = add(&tariffs, &visitors, "Franz", at(12, 0));

        let err = delete_visitors(&visitors, &[dto.id, 99]).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(delete_visitors(&visitors, &[dto.id]).unwrap(), vec!["Franz".to_string()]);
    }

    #[test]
    fn test_row_formats_money_and_time() {
        let tariffs = TariffsState::default();
        let visitors = VisitorsState::new();
        add(&tariffs, &visitors, "Franz", at(12, 0));
        let dto = &list_visitors(&tariffs, &visitors, at(12, 30)).unwrap()[0];

        let config = ConfigState {
            utc_offset_minutes: 180,
            ..Default::default()
        };
        let row = VisitorRow::new(dto, &config);
        assert_eq!(row.cost, "75.00 ₽");
        assert_eq!(row.checked_in, "15:00");
    }
}
