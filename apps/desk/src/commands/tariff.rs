//! # Tariff Commands
//!
//! The tariff catalogue: list, create, edit, delete, enable/disable and the
//! default tariff used for quick check-in.

use lounge_core::validation::parse_amount;
use lounge_core::{
    BillingMode, Money, NewTariff, Tariff, TariffBook, TariffId, TariffStatus, TariffUpdate,
    VisitorBook,
};
use serde::Serialize;
use tabled::Tabled;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{ConfigState, TariffsState, VisitorsState};

/// A tariff as listed for the operator.
#[derive(Debug, Clone, Serialize)]
pub struct TariffDto {
    pub id: u32,
    pub title: String,
    pub billing: BillingMode,
    pub max_cost_cents: i64,
    pub status: TariffStatus,
    pub is_default: bool,
    /// Live visitors on this tariff
    pub in_use: usize,
}

impl TariffDto {
    fn build(tariff: &Tariff, book: &TariffBook, visitors: &VisitorBook) -> Self {
        TariffDto {
            id: tariff.id.get(),
            title: tariff.title.clone(),
            billing: tariff.billing,
            max_cost_cents: tariff.max_cost.cents(),
            status: tariff.status,
            is_default: book.default_id() == Some(tariff.id),
            in_use: visitors.count_using(tariff.id),
        }
    }
}

#[derive(Tabled)]
pub struct TariffRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Billing")]
    billing: String,
    #[tabled(rename = "Max")]
    max_cost: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "In use")]
    in_use: usize,
}

impl TariffRow {
    pub fn new(dto: &TariffDto, config: &ConfigState) -> Self {
        let billing = match dto.billing {
            BillingMode::PerMinute { rate } => format!("{} / min", config.format_currency(rate)),
            BillingMode::Flat => "flat".to_string(),
        };
        TariffRow {
            id: dto.id,
            title: dto.title.clone(),
            billing,
            max_cost: config.format_currency(Money::from_cents(dto.max_cost_cents)),
            status: dto.status.to_string(),
            default: if dto.is_default { "*" } else { "" }.to_string(),
            in_use: dto.in_use,
        }
    }
}

// ── Requests ────────────────────────────────────────────────────────

/// Amounts arrive as typed by the operator (`"2,50"`).
#[derive(Debug, Clone, Default)]
pub struct CreateTariffRequest {
    pub title: String,
    /// Per-minute rate; `None` makes a flat tariff.
    pub rate: Option<String>,
    pub max_cost: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTariffRequest {
    pub title: Option<String>,
    pub rate: Option<String>,
    /// Switch to a flat fee.
    pub flat: bool,
    pub max_cost: Option<String>,
}

// ── Commands ────────────────────────────────────────────────────────

pub fn list_tariffs(tariffs: &TariffsState, visitors: &VisitorsState) -> Vec<TariffDto> {
    debug!("list_tariffs command");
    tariffs.with_tariffs(|t| {
        visitors.with_book(|v| {
            t.all()
                .iter()
                .map(|tariff| TariffDto::build(tariff, t, v))
                .collect()
        })
    })
}

pub fn create_tariff(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    request: CreateTariffRequest,
) -> Result<TariffDto, ApiError> {
    debug!(?request, "create_tariff command");

    let max_cost = parse_amount("max cost", &request.max_cost)?;
    let new = match &request.rate {
        Some(rate) => {
            let rate = parse_amount("rate", rate)?;
            NewTariff::per_minute(request.title.clone(), rate, max_cost)
        }
        None => NewTariff::flat(request.title.clone(), max_cost),
    };

    tariffs.with_tariffs_mut(|t| -> Result<TariffDto, ApiError> {
        let id = t.add(new)?;
        info!(tariff_id = %id, "Tariff created");
        describe(t, visitors, id)
    })
}

pub fn update_tariff(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    id: u32,
    request: UpdateTariffRequest,
) -> Result<TariffDto, ApiError> {
    debug!(tariff_id = id, ?request, "update_tariff command");

    let billing = match (&request.rate, request.flat) {
        (Some(_), true) => {
            return Err(ApiError::validation("A tariff is either per-minute or flat, not both"));
        }
        (Some(rate), false) => Some(BillingMode::PerMinute {
            rate: parse_amount("rate", rate)?,
        }),
        (None, true) => Some(BillingMode::Flat),
        (None, false) => None,
    };
    let update = TariffUpdate {
        title: request.title,
        billing,
        max_cost: request.max_cost.as_deref().map(|v| parse_amount("max cost", v)).transpose()?,
    };
    let id = TariffId::new(id);

    tariffs.with_tariffs_mut(|t| -> Result<TariffDto, ApiError> {
        t.edit(id, update)?;
        info!(tariff_id = %id, "Tariff updated");
        describe(t, visitors, id)
    })
}

/// Deletes a tariff. Refused while a live visitor is on it.
pub fn delete_tariff(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    id: u32,
) -> Result<TariffDto, ApiError> {
    debug!(tariff_id = id, "delete_tariff command");
    let id = TariffId::new(id);

    tariffs.with_tariffs_mut(|t| -> Result<TariffDto, ApiError> {
        let removed = visitors.with_book(|v| t.delete(id, v))?;
        info!(tariff_id = %id, title = %removed.title, "Tariff deleted");
        Ok(visitors.with_book(|v| TariffDto::build(&removed, t, v)))
    })
}

/// Enables or disables a tariff for new visitors.
pub fn set_tariff_active(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    id: u32,
    active: bool,
) -> Result<TariffDto, ApiError> {
    debug!(tariff_id = id, active, "set_tariff_active command");
    let id = TariffId::new(id);
    let status = if active {
        TariffStatus::Active
    } else {
        TariffStatus::Inactive
    };

    tariffs.with_tariffs_mut(|t| -> Result<TariffDto, ApiError> {
        t.set_status(id, status)?;
        info!(tariff_id = %id, %status, default = ?t.default_id(), "Tariff status changed");
        describe(t, visitors, id)
    })
}

pub fn set_default_tariff(
    tariffs: &TariffsState,
    visitors: &VisitorsState,
    id: u32,
) -> Result<TariffDto, ApiError> {
    debug!(tariff_id = id, "set_default_tariff command");
    let id = TariffId::new(id);

    tariffs.with_tariffs_mut(|t| -> Result<TariffDto, ApiError> {
        t.set_default(id)?;
        info!(tariff_id = %id, "Default tariff changed");
        describe(t, visitors, id)
    })
}

fn describe(
    book: &TariffBook,
    visitors: &VisitorsState,
    id: TariffId,
) -> Result<TariffDto, ApiError> {
    let tariff = book.get(id)?;
    Ok(visitors.with_book(|v| TariffDto::build(tariff, book, v)))
}
