//! # Domain Types
//!
//! Core domain types used throughout Lounge.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Visitor      │   │     Tariff      │   │  HistoryRecord  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  id             │   │  record_id UUID │       │
//! │  │  name           │   │  title          │   │  visitor (snap) │       │
//! │  │  tariff_id      │   │  billing        │   │  cost           │       │
//! │  │  discount       │   │  max_cost       │   │  closed_at      │       │
//! │  │  times[]        │   │  status         │   └─────────────────┘       │
//! │  │  status         │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  VisitorStatus: Active ⇄ Paused ──► Finished                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Visitors and tariffs carry small sequential ids so the operator can type
//! them. History records get a UUID since they outlive the session counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::billing::VisitSummary;
use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_DISCOUNT_PERCENT;

// =============================================================================
// Identifiers
// =============================================================================

/// Identity of a visitor within the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(u64);

impl VisitorId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        VisitorId(id)
    }

    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TariffId(u32);

impl TariffId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        TariffId(id)
    }

    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TariffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Visitor Status
// =============================================================================

/// Where a visitor is in their session.
///
/// Ordering follows the listing order: active visitors first, settled last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitorStatus {
    /// The clock is running.
    Active,
    /// The clock is stopped until the visitor resumes.
    Paused,
    /// Paid; no further billing.
    Finished,
}

impl VisitorStatus {
    #[inline]
    pub const fn is_finished(&self) -> bool {
        matches!(self, VisitorStatus::Finished)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// ```text
    /// Active ──pause──► Paused ──resume──► Active
    ///   │                 │
    ///   └──────pay────────┴──────────────► Finished
    /// ```
    pub const fn can_become(&self, next: VisitorStatus) -> bool {
        matches!(
            (self, next),
            (VisitorStatus::Active, VisitorStatus::Paused)
                | (VisitorStatus::Paused, VisitorStatus::Active)
                | (VisitorStatus::Active, VisitorStatus::Finished)
                | (VisitorStatus::Paused, VisitorStatus::Finished)
        )
    }
}

impl fmt::Display for VisitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VisitorStatus::Active => "active",
            VisitorStatus::Paused => "paused",
            VisitorStatus::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// One entry of a visitor's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEvent {
    pub status: VisitorStatus,
    pub at: DateTime<Utc>,
}

impl TimeEvent {
    #[inline]
    pub const fn new(status: VisitorStatus, at: DateTime<Utc>) -> Self {
        TimeEvent { status, at }
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A visitor discount in whole percent, `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Discount(u8);

impl Discount {
    pub fn new(percent: u8) -> Result<Self, ValidationError> {
        if percent > MAX_DISCOUNT_PERCENT {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: MAX_DISCOUNT_PERCENT as i64,
            });
        }
        Ok(Discount(percent))
    }

    #[inline]
    pub const fn none() -> Self {
        Discount(0)
    }

    #[inline]
    pub const fn percent(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Discount {
    type Error = ValidationError;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        Discount::new(percent)
    }
}

impl From<Discount> for u8 {
    fn from(discount: Discount) -> u8 {
        discount.0
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// =============================================================================
// Visitor
// =============================================================================

/// A tracked customer session.
///
/// ## Invariants
/// - `times` is never empty: a visitor is created with its check-in event
/// - the latest event's status always equals `status`
/// - events are ordered by time
///
/// They are maintained by keeping `times` and `status` private; the only
/// mutation path is [`Visitor::push_event`], used by the visitor book.
/// Visitors are only ever serialized, never read back.
///
/// Once paid, `paid` holds the duration and cost on the receipt. Billing
/// returns it as-is from then on, whatever happens to the tariff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visitor {
    pub id: VisitorId,
    pub name: String,
    pub tariff_id: TariffId,
    pub discount: Discount,
    times: Vec<TimeEvent>,
    status: VisitorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    paid: Option<VisitSummary>,
}

impl Visitor {
    /// Checks a new visitor in. The session starts active at `at`.
    pub fn check_in(
        id: VisitorId,
        name: impl Into<String>,
        tariff_id: TariffId,
        discount: Discount,
        at: DateTime<Utc>,
    ) -> Self {
        Visitor {
            id,
            name: name.into(),
            tariff_id,
            discount,
            times: vec![TimeEvent::new(VisitorStatus::Active, at)],
            status: VisitorStatus::Active,
            paid: None,
        }
    }

    #[inline]
    pub fn status(&self) -> VisitorStatus {
        self.status
    }

    #[inline]
    pub fn times(&self) -> &[TimeEvent] {
        &self.times
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// When the visitor checked in.
    pub fn checked_in_at(&self) -> DateTime<Utc> {
        self.times[0].at
    }

    /// Timestamp of the most recent event.
    pub fn last_event_at(&self) -> DateTime<Utc> {
        self.times[self.times.len() - 1].at
    }

    /// When the visitor was settled, if they were.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.times
            .iter()
            .rev()
            .find(|event| event.status.is_finished())
            .map(|event| event.at)
    }

    /// What the visitor was charged, once settled through a payment.
    #[inline]
    pub fn paid(&self) -> Option<VisitSummary> {
        self.paid
    }

    pub(crate) fn settle(&mut self, summary: VisitSummary) {
        self.paid = Some(summary);
    }

    /// Appends an event and moves the visitor to its status.
    ///
    /// Callers validate the transition and ordering first.
    pub(crate) fn push_event(&mut self, event: TimeEvent) {
        self.status = event.status;
        self.times.push(event);
    }
}

// =============================================================================
// Tariff
// =============================================================================

/// How a tariff charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BillingMode {
    /// `rate` per whole minute of active time, capped at the tariff's max cost.
    PerMinute { rate: Money },
    /// A fixed fee equal to the tariff's max cost.
    Flat,
}

impl BillingMode {
    /// The per-minute rate, if this is a duration-based tariff.
    pub fn rate(&self) -> Option<Money> {
        match self {
            BillingMode::PerMinute { rate } => Some(*rate),
            BillingMode::Flat => None,
        }
    }
}

/// Whether a tariff can be picked for new visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TariffStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for TariffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TariffStatus::Active => f.write_str("active"),
            TariffStatus::Inactive => f.write_str("inactive"),
        }
    }
}

/// A billing plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    pub id: TariffId,
    pub title: String,
    pub billing: BillingMode,
    /// Upper bound for per-minute tariffs; the fee itself for flat tariffs.
    pub max_cost: Money,
    pub status: TariffStatus,
}

impl Tariff {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == TariffStatus::Active
    }

    #[inline]
    pub fn is_per_minute(&self) -> bool {
        matches!(self.billing, BillingMode::PerMinute { .. })
    }
}

// =============================================================================
// History Record
// =============================================================================

/// A settled visitor archived when the day was closed.
///
/// Cost and duration are the ones on the visitor's receipt, so later tariff
/// edits never rewrite past revenue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub record_id: Uuid,
    pub visitor: Visitor,
    /// Tariff title at close-out (frozen).
    pub tariff_title: String,
    pub duration_minutes: i64,
    pub cost: Money,
    pub closed_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
