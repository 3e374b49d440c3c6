//! # Tariff Catalogue
//!
//! The list of billing plans and the default plan used for quick check-in.
//!
//! ## Rules
//! - Titles are unique, case-insensitive.
//! - Per-minute rates are positive; max costs are non-negative.
//! - The default tariff is always active. Deactivating or deleting it moves
//!   the default to the first remaining active tariff (or none).
//! - A tariff referenced by a live visitor cannot be deleted. It can be
//!   deactivated: existing visitors keep it, new visitors cannot pick it.

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{BillingMode, Tariff, TariffId, TariffStatus};
use crate::validation::{same_name, validate_max_cost, validate_rate, validate_tariff_title};
use crate::visitors::VisitorBook;

/// Input for a new tariff.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTariff {
    pub title: String,
    pub billing: BillingMode,
    pub max_cost: Money,
}

impl NewTariff {
    pub fn per_minute(title: impl Into<String>, rate: Money, max_cost: Money) -> Self {
        NewTariff {
            title: title.into(),
            billing: BillingMode::PerMinute { rate },
            max_cost,
        }
    }

    pub fn flat(title: impl Into<String>, fee: Money) -> Self {
        NewTariff {
            title: title.into(),
            billing: BillingMode::Flat,
            max_cost: fee,
        }
    }
}

/// Partial edit of a tariff. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TariffUpdate {
    pub title: Option<String>,
    pub billing: Option<BillingMode>,
    pub max_cost: Option<Money>,
}

/// The tariff catalogue.
#[derive(Debug, Clone, Serialize)]
pub struct TariffBook {
    tariffs: Vec<Tariff>,
    default_tariff: Option<TariffId>,
    #[serde(skip)]
    next_id: u32,
}

impl Default for TariffBook {
    fn default() -> Self {
        Self::new()
    }
}

impl TariffBook {
    /// An empty catalogue.
    pub fn new() -> Self {
        TariffBook {
            tariffs: Vec::new(),
            default_tariff: None,
            next_id: 1,
        }
    }

    /// The venue's standard catalogue; tariff 1 is the default.
    ///
    /// | id | title              | billing     | max    |
    /// |----|--------------------|-------------|--------|
    /// | 1  | 2,5р/мин           | 2.50 / min  | 600.00 |
    /// | 2  | Ночефка без буфета | flat        | 400.00 |
    /// | 3  | Ночефка с буфетом  | flat        | 600.00 |
    /// | 4  | OneGame            | flat        | 100.00 |
    pub fn with_defaults() -> Self {
        let seeds = [
            NewTariff::per_minute("2,5р/мин", Money::from_cents(250), Money::from_cents(60_000)),
            NewTariff::flat("Ночефка без буфета", Money::from_cents(40_000)),
            NewTariff::flat("Ночефка с буфетом", Money::from_cents(60_000)),
            NewTariff::flat("OneGame", Money::from_cents(10_000)),
        ];

        let mut book = TariffBook::new();
        for seed in seeds {
            book.insert(seed);
        }
        book.default_tariff = Some(TariffId::new(1));
        book
    }

    /// Builds a catalogue from configured tariffs, validating each one.
    ///
    /// The first active tariff becomes the default.
    pub fn from_seed(seeds: Vec<(NewTariff, TariffStatus)>) -> CoreResult<Self> {
        let mut book = TariffBook::new();
        for (seed, status) in seeds {
            let id = book.add(seed)?;
            if status == TariffStatus::Inactive {
                book.set_status(id, TariffStatus::Inactive)?;
            }
        }
        Ok(book)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get(&self, id: TariffId) -> CoreResult<&Tariff> {
        self.tariffs
            .iter()
            .find(|t| t.id == id)
            .ok_or(CoreError::TariffNotFound(id))
    }

    /// A tariff that can be assigned to a visitor right now.
    pub fn get_active(&self, id: TariffId) -> CoreResult<&Tariff> {
        let tariff = self.get(id)?;
        if !tariff.is_active() {
            return Err(CoreError::TariffInactive(id));
        }
        Ok(tariff)
    }

    pub fn all(&self) -> &[Tariff] {
        &self.tariffs
    }

    /// Tariffs offered when checking a visitor in.
    pub fn active(&self) -> impl Iterator<Item = &Tariff> {
        self.tariffs.iter().filter(|t| t.is_active())
    }

    pub fn default_id(&self) -> Option<TariffId> {
        self.default_tariff
    }

    pub fn default_tariff(&self) -> CoreResult<&Tariff> {
        let id = self.default_tariff.ok_or(CoreError::NoDefaultTariff)?;
        self.get_active(id)
    }

    pub fn len(&self) -> usize {
        self.tariffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tariffs.is_empty()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a tariff and returns its id.
    ///
    /// The first tariff added to an empty catalogue becomes the default.
    pub fn add(&mut self, new: NewTariff) -> CoreResult<TariffId> {
        let title = validate_tariff_title(&new.title)?;
        validate_billing(&new.billing, new.max_cost)?;
        self.ensure_unique_title(&title, None)?;

        let id = self.insert(NewTariff { title, ..new });
        if self.default_tariff.is_none() {
            self.default_tariff = Some(id);
        }
        Ok(id)
    }

    /// Applies a partial edit. Validation happens on the merged result, so
    /// switching to per-minute billing requires a valid rate.
    pub fn edit(&mut self, id: TariffId, update: TariffUpdate) -> CoreResult<()> {
        let current = self.get(id)?.clone();

        let title = match update.title {
            Some(title) => {
                let title = validate_tariff_title(&title)?;
                self.ensure_unique_title(&title, Some(id))?;
                title
            }
            None => current.title,
        };
        let billing = update.billing.unwrap_or(current.billing);
        let max_cost = update.max_cost.unwrap_or(current.max_cost);
        validate_billing(&billing, max_cost)?;

        let tariff = self.get_mut(id)?;
        tariff.title = title;
        tariff.billing = billing;
        tariff.max_cost = max_cost;
        Ok(())
    }

    /// Removes a tariff no live visitor is using.
    pub fn delete(&mut self, id: TariffId, visitors: &VisitorBook) -> CoreResult<Tariff> {
        self.get(id)?;
        let in_use = visitors.count_using(id);
        if in_use > 0 {
            return Err(CoreError::TariffInUse {
                tariff_id: id,
                visitors: in_use,
            });
        }

        let index = self
            .tariffs
            .iter()
            .position(|t| t.id == id)
            .ok_or(CoreError::TariffNotFound(id))?;
        let removed = self.tariffs.remove(index);
        if self.default_tariff == Some(id) {
            self.reassign_default();
        }
        Ok(removed)
    }

    /// Switches a tariff on or off.
    pub fn set_status(&mut self, id: TariffId, status: TariffStatus) -> CoreResult<()> {
        self.get_mut(id)?.status = status;
        if status == TariffStatus::Inactive && self.default_tariff == Some(id) {
            self.reassign_default();
        }
        if status == TariffStatus::Active && self.default_tariff.is_none() {
            self.default_tariff = Some(id);
        }
        Ok(())
    }

    /// Makes an active tariff the default for quick check-in.
    pub fn set_default(&mut self, id: TariffId) -> CoreResult<()> {
        self.get_active(id)?;
        self.default_tariff = Some(id);
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn insert(&mut self, new: NewTariff) -> TariffId {
        let id = TariffId::new(self.next_id);
        self.next_id += 1;
        self.tariffs.push(Tariff {
            id,
            title: new.title,
            billing: new.billing,
            max_cost: new.max_cost,
            status: TariffStatus::Active,
        });
        id
    }

    fn get_mut(&mut self, id: TariffId) -> CoreResult<&mut Tariff> {
        self.tariffs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CoreError::TariffNotFound(id))
    }

    fn ensure_unique_title(&self, title: &str, except: Option<TariffId>) -> CoreResult<()> {
        let taken = self
            .tariffs
            .iter()
            .any(|t| Some(t.id) != except && same_name(&t.title, title));
        if taken {
            return Err(CoreError::DuplicateTariffTitle(title.to_string()));
        }
        Ok(())
    }

    fn reassign_default(&mut self) {
        let next = self.active().next().map(|t| t.id);
        self.default_tariff = next;
    }
}

fn validate_billing(billing: &BillingMode, max_cost: Money) -> CoreResult<()> {
    if let BillingMode::PerMinute { rate } = billing {
        validate_rate(*rate)?;
    }
    validate_max_cost(max_cost)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
