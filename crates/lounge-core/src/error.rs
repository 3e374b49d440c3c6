//! # Error Types
//!
//! Domain-specific error types for lounge-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lounge-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  Console errors (apps/desk)                                            │
//! │  └── ApiError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Operator               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error here is local and recoverable: the operator corrects the input
//! and tries again. Nothing in this crate is fatal.

use thiserror::Error;

use crate::types::{TariffId, VisitorId, VisitorStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No live visitor has this id.
    #[error("Visitor not found: {0}")]
    VisitorNotFound(VisitorId),

    /// No tariff has this id.
    #[error("Tariff not found: {0}")]
    TariffNotFound(TariffId),

    /// A visitor was added or edited without a tariff.
    #[error("Select a tariff")]
    TariffRequired,

    /// Quick add was used but no default tariff is configured.
    #[error("No default tariff is set")]
    NoDefaultTariff,

    /// The tariff exists but is switched off.
    #[error("Tariff {0} is inactive")]
    TariffInactive(TariffId),

    /// The tariff is still referenced by live visitors.
    #[error("Tariff {tariff_id} is used by {visitors} visitor(s)")]
    TariffInUse { tariff_id: TariffId, visitors: usize },

    /// Another live visitor already has this name (case-insensitive).
    ///
    /// ## User Workflow
    /// ```text
    /// add "franz"
    ///      │
    ///      ▼
    /// live set already has "Franz"
    ///      │
    ///      ▼
    /// DuplicateVisitorName("franz") → "This name is already taken: franz"
    /// ```
    #[error("This name is already taken: {0}")]
    DuplicateVisitorName(String),

    /// Another tariff already has this title (case-insensitive).
    #[error("Tariff title is already taken: {0}")]
    DuplicateTariffTitle(String),

    /// The requested status change is not part of the visitor lifecycle.
    #[error("Visitor {visitor_id} is {from}, cannot become {to}")]
    InvalidTransition {
        visitor_id: VisitorId,
        from: VisitorStatus,
        to: VisitorStatus,
    },

    /// An event is older than the visitor's latest event.
    #[error("Event for visitor {visitor_id} is earlier than its last recorded event")]
    EventOutOfOrder { visitor_id: VisitorId },

    /// Tariff or discount changes are refused once the visitor has paid.
    #[error("Visitor {0} is already settled")]
    VisitorSettled(VisitorId),

    /// Nothing left to settle in the selection.
    #[error("No unsettled visitors selected")]
    EmptySelection,

    /// `confirm` or `cancel` without a preceding quote.
    #[error("No payment is pending")]
    NoPendingSettlement,

    /// The day cannot be closed while someone is still active or paused.
    ///
    /// ## User Workflow
    /// ```text
    /// close-day
    ///      │
    ///      ▼
    /// any live visitor not finished?
    ///      │ yes
    ///      ▼
    /// UnsettledVisitors → "Settle all visitors before closing the day"
    ///      (nothing changes, operator settles and retries)
    /// ```
    #[error("Settle all visitors before closing the day: {}", .names.join(", "))]
    UnsettledVisitors { names: Vec<String> },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Start of a range lies after its end.
    #[error("{field}: start {start} is after end {end}")]
    InvalidRange {
        field: String,
        start: String,
        end: String,
    },

    /// Invalid format (e.g., unparseable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidTransition {
            visitor_id: VisitorId::new(3),
            from: VisitorStatus::Finished,
            to: VisitorStatus::Paused,
        };
        assert_eq!(err.to_string(), "Visitor 3 is finished, cannot become paused");

        let err = CoreError::UnsettledVisitors {
            names: vec!["Franz".to_string(), "Franz 2".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Settle all visitors before closing the day: Franz, Franz 2"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "discount must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
