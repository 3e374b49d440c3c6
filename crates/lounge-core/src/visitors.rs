//! # Visitor Book
//!
//! The live set of visitors, payment of a selection, and the day close that
//! archives everyone into history.
//!
//! ## Visitor Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   add ──► Active ◄──toggle_pause──► Paused                              │
//! │             │                         │                                 │
//! │             └──── quote / confirm ────┴──► Finished                     │
//! │                                              │                          │
//! │                   close_day (all Finished) ──┴──► HistoryRecord         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Payment Flow
//! ```text
//! quote(ids) ──► Settlement (lines + total, stored as pending)
//!      │
//!      ├── confirm(now) ──► Finished event at `now` ──► Receipt
//!      └── cancel()     ──► pending discarded, nothing changes
//! ```
//!
//! The receipt is recomputed at confirmation time: the clock keeps running
//! while the operator is looking at the quote.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::billing::{summarize_with, VisitSummary};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::tariffs::TariffBook;
use crate::types::{
    Discount, HistoryRecord, TariffId, TimeEvent, Visitor, VisitorId, VisitorStatus,
};
use crate::validation::{same_name, validate_visitor_name};

// =============================================================================
// Inputs
// =============================================================================

/// Input for checking a visitor in.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisitor {
    pub name: String,
    /// `None` is rejected with [`CoreError::TariffRequired`].
    pub tariff_id: Option<TariffId>,
    pub discount: Discount,
}

impl NewVisitor {
    pub fn new(name: impl Into<String>, tariff_id: Option<TariffId>) -> Self {
        NewVisitor {
            name: name.into(),
            tariff_id,
            discount: Discount::none(),
        }
    }

    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = discount;
        self
    }
}

/// Partial edit of a visitor. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitorUpdate {
    pub name: Option<String>,
    pub tariff_id: Option<TariffId>,
    pub discount: Option<Discount>,
}

// =============================================================================
// Outputs
// =============================================================================

/// One visitor's share of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptLine {
    pub visitor_id: VisitorId,
    pub name: String,
    pub duration_minutes: i64,
    pub cost: Money,
}

/// A pending payment: what the selection costs as of `quoted_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub lines: Vec<ReceiptLine>,
    pub total: Money,
    pub quoted_at: DateTime<Utc>,
}

impl Settlement {
    pub fn visitor_ids(&self) -> impl Iterator<Item = VisitorId> + '_ {
        self.lines.iter().map(|line| line.visitor_id)
    }
}

/// A confirmed payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub lines: Vec<ReceiptLine>,
    pub total: Money,
    pub paid_at: DateTime<Utc>,
}

/// Summary of a closed day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayReport {
    pub visitors: usize,
    pub revenue: Money,
    pub minutes: i64,
    pub closed_at: DateTime<Utc>,
}

// =============================================================================
// Visitor Book
// =============================================================================

/// Live visitors, the pending payment, and the archive of closed days.
#[derive(Debug, Clone, Serialize)]
pub struct VisitorBook {
    visitors: Vec<Visitor>,
    history: Vec<HistoryRecord>,
    pending: Option<Settlement>,
    #[serde(skip)]
    next_id: u64,
}

impl Default for VisitorBook {
    fn default() -> Self {
        Self::new()
    }
}

impl VisitorBook {
    pub fn new() -> Self {
        VisitorBook {
            visitors: Vec::new(),
            history: Vec::new(),
            pending: None,
            next_id: 1,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get(&self, id: VisitorId) -> CoreResult<&Visitor> {
        self.visitors
            .iter()
            .find(|v| v.id == id)
            .ok_or(CoreError::VisitorNotFound(id))
    }

    /// Live visitors in check-in order.
    pub fn live(&self) -> &[Visitor] {
        &self.visitors
    }

    /// Live visitors as the operator sees them: active first, then paused,
    /// then settled; check-in order within each group.
    pub fn listing(&self) -> Vec<&Visitor> {
        let mut rows: Vec<&Visitor> = self.visitors.iter().collect();
        rows.sort_by_key(|v| (v.status(), v.id));
        rows
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn pending(&self) -> Option<&Settlement> {
        self.pending.as_ref()
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    /// Number of live visitors on a tariff.
    pub fn count_using(&self, tariff_id: TariffId) -> usize {
        self.visitors
            .iter()
            .filter(|v| v.tariff_id == tariff_id)
            .count()
    }

    /// Whether `name` collides with a live visitor other than `except`.
    pub fn is_name_taken(&self, name: &str, except: Option<VisitorId>) -> bool {
        self.visitors
            .iter()
            .any(|v| Some(v.id) != except && same_name(&v.name, name))
    }

    /// Current duration and cost of one visitor.
    pub fn summary_of(
        &self,
        id: VisitorId,
        tariffs: &TariffBook,
        now: DateTime<Utc>,
    ) -> CoreResult<VisitSummary> {
        summarize_with(self.get(id)?, tariffs, now)
    }

    pub fn cost_of(
        &self,
        id: VisitorId,
        tariffs: &TariffBook,
        now: DateTime<Utc>,
    ) -> CoreResult<Money> {
        Ok(self.summary_of(id, tariffs, now)?.cost)
    }

    // =========================================================================
    // Live Set
    // =========================================================================

    /// Checks a visitor in. They start active at `now`.
    ///
    /// ## Rejections
    /// - empty or overlong name
    /// - name already used by a live visitor (case-insensitive)
    /// - no tariff, unknown tariff, inactive tariff
    pub fn add(
        &mut self,
        new: NewVisitor,
        tariffs: &TariffBook,
        now: DateTime<Utc>,
    ) -> CoreResult<VisitorId> {
        let name = validate_visitor_name(&new.name)?;
        if self.is_name_taken(&name, None) {
            return Err(CoreError::DuplicateVisitorName(name));
        }
        let tariff_id = new.tariff_id.ok_or(CoreError::TariffRequired)?;
        tariffs.get_active(tariff_id)?;

        let id = VisitorId::new(self.next_id);
        self.next_id += 1;
        self.visitors
            .push(Visitor::check_in(id, name, tariff_id, new.discount, now));
        Ok(id)
    }

    /// Checks a visitor in on the default tariff with no discount.
    pub fn quick_add(
        &mut self,
        name: &str,
        tariffs: &TariffBook,
        now: DateTime<Utc>,
    ) -> CoreResult<VisitorId> {
        let tariff_id = tariffs.default_tariff()?.id;
        self.add(NewVisitor::new(name, Some(tariff_id)), tariffs, now)
    }

    /// Edits a live visitor.
    ///
    /// Settled visitors can still be renamed, but their tariff and discount
    /// are locked because they have already paid.
    pub fn edit(
        &mut self,
        id: VisitorId,
        update: VisitorUpdate,
        tariffs: &TariffBook,
    ) -> CoreResult<()> {
        let current = self.get(id)?;

        if current.is_finished() {
            let retariff = update.tariff_id.is_some_and(|t| t != current.tariff_id);
            let rediscount = update.discount.is_some_and(|d| d != current.discount);
            if retariff || rediscount {
                return Err(CoreError::VisitorSettled(id));
            }
        }

        let name = match update.name {
            Some(name) => {
                let name = validate_visitor_name(&name)?;
                if self.is_name_taken(&name, Some(id)) {
                    return Err(CoreError::DuplicateVisitorName(name));
                }
                Some(name)
            }
            None => None,
        };

        if let Some(tariff_id) = update.tariff_id {
            if tariff_id != current.tariff_id {
                tariffs.get_active(tariff_id)?;
            }
        }

        let visitor = self.get_mut(id)?;
        if let Some(name) = name {
            visitor.name = name;
        }
        if let Some(tariff_id) = update.tariff_id {
            visitor.tariff_id = tariff_id;
        }
        if let Some(discount) = update.discount {
            visitor.discount = discount;
        }
        Ok(())
    }

    /// Removes a single visitor.
    pub fn delete(&mut self, id: VisitorId) -> CoreResult<Visitor> {
        self.delete_selected(&[id])?
            .pop()
            .ok_or(CoreError::VisitorNotFound(id))
    }

    /// Removes several visitors at once. Unknown ids reject the whole call.
    ///
    /// Deleted visitors are dropped from a pending payment as well.
    pub fn delete_selected(&mut self, ids: &[VisitorId]) -> CoreResult<Vec<Visitor>> {
        if ids.is_empty() {
            return Err(CoreError::EmptySelection);
        }
        for id in ids {
            self.get(*id)?;
        }

        let (removed, kept): (Vec<Visitor>, Vec<Visitor>) = std::mem::take(&mut self.visitors)
            .into_iter()
            .partition(|v| ids.contains(&v.id));
        self.visitors = kept;

        if let Some(pending) = self.pending.as_mut() {
            pending.lines.retain(|line| !ids.contains(&line.visitor_id));
            pending.total = pending.lines.iter().map(|line| line.cost).sum();
            if pending.lines.is_empty() {
                self.pending = None;
            }
        }

        Ok(removed)
    }

    /// Pauses an active visitor or resumes a paused one.
    ///
    /// Returns the visitor's new status.
    pub fn toggle_pause(&mut self, id: VisitorId, now: DateTime<Utc>) -> CoreResult<VisitorStatus> {
        let next = match self.get(id)?.status() {
            VisitorStatus::Active => VisitorStatus::Paused,
            VisitorStatus::Paused => VisitorStatus::Active,
            VisitorStatus::Finished => {
                return Err(CoreError::InvalidTransition {
                    visitor_id: id,
                    from: VisitorStatus::Finished,
                    to: VisitorStatus::Active,
                })
            }
        };
        self.record_event(id, next, now)?;
        Ok(next)
    }

    /// Appends a lifecycle event after checking the transition and ordering.
    pub fn record_event(
        &mut self,
        id: VisitorId,
        status: VisitorStatus,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        let visitor = self.get_mut(id)?;
        let from = visitor.status();
        if !from.can_become(status) {
            return Err(CoreError::InvalidTransition {
                visitor_id: id,
                from,
                to: status,
            });
        }
        if now < visitor.last_event_at() {
            return Err(CoreError::EventOutOfOrder { visitor_id: id });
        }
        visitor.push_event(TimeEvent::new(status, now));
        Ok(())
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Prices a selection without changing anything.
    ///
    /// Visitors who have already paid are skipped; if nobody is left the
    /// selection is rejected.
    pub fn quote(
        &self,
        ids: &[VisitorId],
        tariffs: &TariffBook,
        now: DateTime<Utc>,
    ) -> CoreResult<Settlement> {
        let mut lines = Vec::new();
        for id in dedup(ids) {
            let visitor = self.get(id)?;
            if visitor.is_finished() {
                continue;
            }
            let summary = summarize_with(visitor, tariffs, now)?;
            lines.push(ReceiptLine {
                visitor_id: id,
                name: visitor.name.clone(),
                duration_minutes: summary.duration_minutes,
                cost: summary.cost,
            });
        }

        if lines.is_empty() {
            return Err(CoreError::EmptySelection);
        }

        let total = lines.iter().map(|line| line.cost).sum();
        Ok(Settlement {
            lines,
            total,
            quoted_at: now,
        })
    }

    /// Quotes a selection and holds it as the pending payment, replacing any
    /// earlier one.
    pub fn begin_settlement(
        &mut self,
        ids: &[VisitorId],
        tariffs: &TariffBook,
        now: DateTime<Utc>,
    ) -> CoreResult<&Settlement> {
        let settlement = self.quote(ids, tariffs, now)?;
        Ok(&*self.pending.insert(settlement))
    }

    /// Marks every visitor of the pending payment as finished at `now`.
    ///
    /// Visitors settled in the meantime are skipped. The receipt reflects
    /// time up to `now`, not the quote, and each visitor keeps their receipt
    /// line as the cost archived at day close.
    pub fn confirm_settlement(
        &mut self,
        tariffs: &TariffBook,
        now: DateTime<Utc>,
    ) -> CoreResult<Receipt> {
        let pending = self.pending.as_ref().ok_or(CoreError::NoPendingSettlement)?;
        let ids: Vec<VisitorId> = pending
            .visitor_ids()
            .filter(|id| self.get(*id).is_ok_and(|v| !v.is_finished()))
            .collect();

        for id in &ids {
            let visitor = self.get(*id)?;
            summarize_with(visitor, tariffs, now)?;
            if now < visitor.last_event_at() {
                return Err(CoreError::EventOutOfOrder { visitor_id: *id });
            }
        }

        let mut lines = Vec::with_capacity(ids.len());
        for id in ids {
            self.record_event(id, VisitorStatus::Finished, now)?;
            let visitor = self.get_mut(id)?;
            let summary = summarize_with(visitor, tariffs, now)?;
            visitor.settle(summary);
            lines.push(ReceiptLine {
                visitor_id: id,
                name: visitor.name.clone(),
                duration_minutes: summary.duration_minutes,
                cost: summary.cost,
            });
        }

        self.pending = None;
        let total = lines.iter().map(|line| line.cost).sum();
        Ok(Receipt {
            lines,
            total,
            paid_at: now,
        })
    }

    /// Drops the pending payment.
    pub fn cancel_settlement(&mut self) -> CoreResult<Settlement> {
        self.pending.take().ok_or(CoreError::NoPendingSettlement)
    }

    // =========================================================================
    // Day Close
    // =========================================================================

    /// True when every live visitor has paid. An empty room can always close.
    pub fn can_close_day(&self) -> bool {
        self.visitors.iter().all(Visitor::is_finished)
    }

    /// Names of visitors who still have to pay.
    pub fn unsettled(&self) -> Vec<String> {
        self.visitors
            .iter()
            .filter(|v| !v.is_finished())
            .map(|v| v.name.clone())
            .collect()
    }

    /// Archives every live visitor and empties the room.
    ///
    /// Refused with [`CoreError::UnsettledVisitors`] while anyone is active or
    /// paused; in that case nothing changes.
    pub fn close_day(&mut self, tariffs: &TariffBook, now: DateTime<Utc>) -> CoreResult<DayReport> {
        if !self.can_close_day() {
            return Err(CoreError::UnsettledVisitors {
                names: self.unsettled(),
            });
        }

        let mut records = Vec::with_capacity(self.visitors.len());
        for visitor in &self.visitors {
            let tariff = tariffs.get(visitor.tariff_id)?;
            let summary = summarize_with(visitor, tariffs, now)?;
            records.push(HistoryRecord {
                record_id: Uuid::new_v4(),
                visitor: visitor.clone(),
                tariff_title: tariff.title.clone(),
                duration_minutes: summary.duration_minutes,
                cost: summary.cost,
                closed_at: now,
            });
        }

        let report = DayReport {
            visitors: records.len(),
            revenue: records.iter().map(|r| r.cost).sum(),
            minutes: records.iter().map(|r| r.duration_minutes).sum(),
            closed_at: now,
        };

        self.visitors.clear();
        self.pending = None;
        self.history.extend(records);
        Ok(report)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn get_mut(&mut self, id: VisitorId) -> CoreResult<&mut Visitor> {
        self.visitors
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(CoreError::VisitorNotFound(id))
    }
}

/// Keeps the first occurrence of each id, preserving order.
fn dedup(ids: &[VisitorId]) -> Vec<VisitorId> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariffs::TariffUpdate;
    use crate::types::BillingMode;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 8, 19, hour, min, 0).unwrap()
    }

    fn setup() -> (VisitorBook, TariffBook) {
        (VisitorBook::new(), TariffBook::with_defaults())
    }

    fn add(
        book: &mut VisitorBook,
        tariffs: &TariffBook,
        name: &str,
        now: DateTime<Utc>,
    ) -> VisitorId {
        book.quick_add(name, tariffs, now).unwrap()
    }

    #[test]
    fn test_add_starts_active_on_tariff() {
        let (mut book, tariffs) = setup();
        let new = NewVisitor::new("Франц", Some(TariffId::new(2)))
            .with_discount(Discount::new(10).unwrap());
        let id = book.add(new, &tariffs, at(12, 0)).unwrap();

        let visitor = book.get(id).unwrap();
        assert_eq!(visitor.status(), VisitorStatus::Active);
        assert_eq!(visitor.tariff_id, TariffId::new(2));
        assert_eq!(visitor.discount.percent(), 10);
        assert_eq!(visitor.times(), &[TimeEvent::new(VisitorStatus::Active, at(12, 0))]);
    }

    #[test]
    fn test_duplicate_name_is_case_insensitive() {
        let (mut book, tariffs) = setup();
        add(&mut book, &tariffs, "Франц", at(12, 0));

        let err = book.quick_add("франц", &tariffs, at(12, 1)).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateVisitorName(_)));
        assert_eq!(book.len(), 1);

        assert!(book.quick_add("Франц 2", &tariffs, at(12, 1)).is_ok());
    }

    #[test]
    fn test_add_requires_active_tariff() {
        let (mut book, mut tariffs) = setup();
        assert!(matches!(
            book.add(NewVisitor::new("Franz", None), &tariffs, at(12, 0)),
            Err(CoreError::TariffRequired)
        ));
        assert!(matches!(
            book.add(NewVisitor::new("Franz", Some(TariffId::new(99))), &tariffs, at(12, 0)),
            Err(CoreError::TariffNotFound(_))
        ));

        tariffs
            .set_status(TariffId::new(3), crate::types::TariffStatus::Inactive)
            .unwrap();
        assert!(matches!(
            book.add(NewVisitor::new("Franz", Some(TariffId::new(3))), &tariffs, at(12, 0)),
            Err(CoreError::TariffInactive(_))
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "A", at(12, 0));
        book.delete(a).unwrap();
        let b = add(&mut book, &tariffs, "B", at(12, 0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_edit_excludes_self_from_duplicate_check() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));
        add(&mut book, &tariffs, "Hans", at(12, 0));

        book.edit(
            a,
            VisitorUpdate {
                name: Some("FRANZ".to_string()),
                ..Default::default()
            },
            &tariffs,
        )
        .unwrap();
        assert_eq!(book.get(a).unwrap().name, "FRANZ");

        let err = book
            .edit(
                a,
                VisitorUpdate {
                    name: Some("hans".to_string()),
                    ..Default::default()
                },
                &tariffs,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateVisitorName(_)));
    }

    #[test]
    fn test_settled_visitor_keeps_tariff() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));
        book.begin_settlement(&[a], &tariffs, at(12, 30)).unwrap();
        book.confirm_settlement(&tariffs, at(12, 30)).unwrap();

        let err = book
            .edit(
                a,
                VisitorUpdate {
                    tariff_id: Some(TariffId::new(4)),
                    ..Default::default()
                },
                &tariffs,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::VisitorSettled(_)));

        book.edit(
            a,
            VisitorUpdate {
                name: Some("Franz (paid)".to_string()),
                ..Default::default()
            },
            &tariffs,
        )
        .unwrap();
    }

    #[test]
    fn test_toggle_pause() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));

        assert_eq!(book.toggle_pause(a, at(12, 10)).unwrap(), VisitorStatus::Paused);
        assert_eq!(book.toggle_pause(a, at(12, 20)).unwrap(), VisitorStatus::Active);

        let visitor = book.get(a).unwrap();
        assert_eq!(visitor.times().len(), 3);
        assert_eq!(visitor.status(), visitor.times().last().unwrap().status);

        // 10 min before the pause + 10 min after resuming
        assert_eq!(book.summary_of(a, &tariffs, at(12, 30)).unwrap().duration_minutes, 20);
    }

    #[test]
    fn test_finished_visitor_cannot_resume() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));
        book.record_event(a, VisitorStatus::Finished, at(13, 0)).unwrap();

        assert!(matches!(
            book.toggle_pause(a, at(13, 5)),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_out_of_order_event_is_rejected() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));
        assert!(matches!(
            book.record_event(a, VisitorStatus::Paused, at(11, 0)),
            Err(CoreError::EventOutOfOrder { .. })
        ));
        assert_eq!(book.get(a).unwrap().times().len(), 1);
    }

    #[test]
    fn test_quote_skips_settled_and_rejects_empty() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));
        let b = add(&mut book, &tariffs, "Hans", at(12, 0));
        book.record_event(b, VisitorStatus::Finished, at(12, 10)).unwrap();

        let quote = book.quote(&[a, b, a], &tariffs, at(12, 30)).unwrap();
        assert_eq!(quote.lines.len(), 1);
        assert_eq!(quote.total, Money::from_cents(7_500));

        assert!(matches!(book.quote(&[b], &tariffs, at(12, 30)), Err(CoreError::EmptySelection)));
        assert!(matches!(
            book.quote(&[VisitorId::new(42)], &tariffs, at(12, 30)),
            Err(CoreError::VisitorNotFound(_))
        ));
    }

    #[test]
    fn test_confirm_finishes_and_reprices() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));
        let b = add(&mut book, &tariffs, "Hans", at(12, 0));

        let quoted = book.begin_settlement(&[a, b], &tariffs, at(12, 30)).unwrap();
        assert_eq!(quoted.total, Money::from_cents(15_000));

        // operator confirms ten minutes later
        let receipt = book.confirm_settlement(&tariffs, at(12, 40)).unwrap();
        assert_eq!(receipt.total, Money::from_cents(20_000));
        assert_eq!(receipt.paid_at, at(12, 40));
        assert!(book.pending().is_none());
        assert!(book.live().iter().all(Visitor::is_finished));
        assert_eq!(book.get(a).unwrap().finished_at(), Some(at(12, 40)));

        assert!(matches!(
            book.confirm_settlement(&tariffs, at(12, 41)),
            Err(CoreError::NoPendingSettlement)
        ));
    }

    #[test]
    fn test_cancel_settlement_changes_nothing() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));
        book.begin_settlement(&[a], &tariffs, at(12, 30)).unwrap();
        book.cancel_settlement().unwrap();

        assert_eq!(book.get(a).unwrap().status(), VisitorStatus::Active);
        assert!(matches!(book.cancel_settlement(), Err(CoreError::NoPendingSettlement)));
    }

    #[test]
    fn test_delete_selected_updates_pending() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));
        let b = add(&mut book, &tariffs, "Hans", at(12, 0));
        book.begin_settlement(&[a, b], &tariffs, at(12, 30)).unwrap();

        book.delete_selected(&[b]).unwrap();
        let pending = book.pending().unwrap();
        assert_eq!(pending.lines.len(), 1);
        assert_eq!(pending.total, Money::from_cents(7_500));

        book.delete(a).unwrap();
        assert!(book.pending().is_none());
    }

    #[test]
    fn test_delete_selected_is_all_or_nothing() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));
        assert!(book.delete_selected(&[a, VisitorId::new(9)]).is_err());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_close_day_rejected_while_unsettled() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));
        let b = add(&mut book, &tariffs, "Hans", at(12, 0));
        book.toggle_pause(b, at(12, 5)).unwrap();
        book.record_event(a, VisitorStatus::Finished, at(13, 0)).unwrap();

        let before = book.live().to_vec();
        let err = book.close_day(&tariffs, at(23, 0)).unwrap_err();
        match err {
            CoreError::UnsettledVisitors { names } => assert_eq!(names, vec!["Hans".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(book.live(), before.as_slice());
        assert!(book.history().is_empty());
    }

    #[test]
    fn test_close_day_archives_everyone() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "Franz", at(12, 0));
        let b = book
            .add(NewVisitor::new("Hans", Some(TariffId::new(4))), &tariffs, at(12, 0))
            .unwrap();
        book.begin_settlement(&[a, b], &tariffs, at(13, 0)).unwrap();
        book.confirm_settlement(&tariffs, at(13, 0)).unwrap();

        let report = book.close_day(&tariffs, at(23, 0)).unwrap();
        assert_eq!(report.visitors, 2);
        // 60 min × 2.50 + OneGame 100.00
        assert_eq!(report.revenue, Money::from_cents(25_000));
        assert!(book.is_empty());

        let history = book.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].cost, Money::from_cents(15_000));
        assert_eq!(history[1].tariff_title, "OneGame");
        assert!(history.iter().all(|r| r.closed_at == at(23, 0)));
        assert_ne!(history[0].record_id, history[1].record_id);
    }

    #[test]
    fn test_close_day_archives_what_was_paid() {
        let (mut book, mut tariffs) = setup();
        let id = add(&mut book, &tariffs, "Franz", at(12, 0));
        book.begin_settlement(&[id], &tariffs, at(12, 30)).unwrap();
        let receipt = book.confirm_settlement(&tariffs, at(12, 30)).unwrap();
        assert_eq!(receipt.total, Money::from_cents(7_500));

        tariffs
            .edit(
                TariffId::new(1),
                TariffUpdate {
                    billing: Some(BillingMode::PerMinute {
                        rate: Money::from_cents(500),
                    }),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(book.cost_of(id, &tariffs, at(22, 0)).unwrap(), receipt.total);

        let report = book.close_day(&tariffs, at(23, 0)).unwrap();
        assert_eq!(report.revenue, receipt.total);
        assert_eq!(report.minutes, 30);
        assert_eq!(book.history()[0].cost, receipt.total);
    }

    #[test]
    fn test_close_empty_day() {
        let (mut book, tariffs) = setup();
        assert!(book.can_close_day());
        let report = book.close_day(&tariffs, at(23, 0)).unwrap();
        assert_eq!(report.visitors, 0);
        assert_eq!(report.revenue, Money::zero());
    }

    #[test]
    fn test_listing_order() {
        let (mut book, tariffs) = setup();
        let a = add(&mut book, &tariffs, "A", at(12, 0));
        let b = add(&mut book, &tariffs, "B", at(12, 0));
        let c = add(&mut book, &tariffs, "C", at(12, 0));
        book.record_event(a, VisitorStatus::Finished, at(12, 30)).unwrap();
        book.toggle_pause(b, at(12, 30)).unwrap();

        let order: Vec<VisitorId> = book.listing().iter().map(|v| v.id).collect();
        assert_eq!(order, vec![c, b, a]);
    }
}
