//! # lounge-core: Pure Business Logic for Lounge
//!
//! This crate holds the rules of a pay-per-time venue: visitors check in on a
//! tariff, pause and resume, get settled, and at the end of the business day
//! everyone is archived into history.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Lounge Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Operator console (apps/desk)                    │   │
//! │  │     add ──► pause ──► pay ──► confirm ──► close-day ──► stats   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lounge-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │ billing  │ │ tariffs  │ │    visitors      │  │   │
//! │  │   │ Visitor  │ │ duration │ │ catalog  │ │ lifecycle, pay,  │  │   │
//! │  │   │ Tariff   │ │ cost     │ │ default  │ │ close day        │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • PURE FUNCTIONS                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Visitor, Tariff, HistoryRecord, ids)
//! - [`money`] - Money type with integer arithmetic
//! - [`billing`] - Active duration and cost calculation
//! - [`tariffs`] - The tariff catalogue
//! - [`visitors`] - Live visitors, settlement and day close
//! - [`statistics`] - Daily aggregates over history
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use lounge_core::{NewVisitor, TariffBook, TariffId, VisitorBook};
//!
//! let tariffs = TariffBook::with_defaults();
//! let mut book = VisitorBook::new();
//!
//! let check_in = Utc.with_ymd_and_hms(2020, 8, 19, 12, 0, 0).unwrap();
//! let id = book
//!     .add(NewVisitor::new("Franz", Some(TariffId::new(1))), &tariffs, check_in)
//!     .unwrap();
//!
//! // 30 minutes at 2.50 per minute
//! let later = Utc.with_ymd_and_hms(2020, 8, 19, 12, 30, 0).unwrap();
//! let cost = book.cost_of(id, &tariffs, later).unwrap();
//! assert_eq!(cost.cents(), 7500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod money;
pub mod statistics;
pub mod tariffs;
pub mod types;
pub mod validation;
pub mod visitors;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use statistics::{BarPoint, BarSeries, Indicator, StatisticsQuery};
pub use tariffs::{NewTariff, TariffBook, TariffUpdate};
pub use types::*;
pub use visitors::{
    DayReport, NewVisitor, Receipt, ReceiptLine, Settlement, VisitorBook, VisitorUpdate,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a visitor's display name, in characters.
pub const MAX_VISITOR_NAME_LEN: usize = 100;

/// Maximum length of a tariff title, in characters.
pub const MAX_TARIFF_TITLE_LEN: usize = 100;

/// Upper bound of a visitor discount, in percent.
pub const MAX_DISCOUNT_PERCENT: u8 = 100;
