//! # API Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Console                            │
//! │                                                                         │
//! │  Operator types `close-day`                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Core rejects? ─── CoreError::UnsettledVisitors ──► ApiError ───►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The shell prints the message (or the JSON object) and keeps running.  │
//! │  No command error ends the session.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use lounge_core::{CoreError, ValidationError};
use serde::Serialize;

use crate::state::ConfigError;

/// Error returned from console commands.
///
/// ## Serialization
/// With `--output json` this is what the operator's tooling receives:
/// ```json
/// {
///   "code": "DAY_NOT_CLOSABLE",
///   "message": "Settle all visitors before closing the day: Franz"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Visitor or tariff does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// A rule of the venue forbids the operation
    BusinessLogic,

    /// Someone still has to pay
    DayNotClosable,

    /// Payment selection or confirmation failed
    SettlementError,

    /// Configuration could not be loaded
    ConfigError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::VisitorNotFound(id) => ApiError::not_found("Visitor", &id.to_string()),
            CoreError::TariffNotFound(id) => ApiError::not_found("Tariff", &id.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::TariffRequired
            | CoreError::DuplicateVisitorName(_)
            | CoreError::DuplicateTariffTitle(_) => ApiError::validation(message),
            CoreError::NoDefaultTariff
            | CoreError::TariffInactive(_)
            | CoreError::TariffInUse { .. }
            | CoreError::InvalidTransition { .. }
            | CoreError::EventOutOfOrder { .. }
            | CoreError::VisitorSettled(_) => ApiError::new(ErrorCode::BusinessLogic, message),
            CoreError::EmptySelection | CoreError::NoPendingSettlement => {
                ApiError::new(ErrorCode::SettlementError, message)
            }
            CoreError::UnsettledVisitors { .. } => {
                ApiError::new(ErrorCode::DayNotClosable, message)
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Console I/O failed: {}", err);
        ApiError::internal(format!("I/O error: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use lounge_core::{TariffId, VisitorId};

    #[test]
    fn test_core_error_codes() {
        let err = ApiError::from(CoreError::VisitorNotFound(VisitorId::new(7)));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Visitor not found: 7");

        let err = ApiError::from(CoreError::UnsettledVisitors {
            names: vec!["Franz".to_string(), "Hans".to_string()],
        });
        assert_eq!(err.code, ErrorCode::DayNotClosable);
        assert_eq!(err.message, "Settle all visitors before closing the day: Franz, Hans");

        let err = ApiError::from(CoreError::TariffInUse {
            tariff_id: TariffId::new(1),
            visitors: 2,
        });
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        assert_eq!(ApiError::from(CoreError::EmptySelection).code, ErrorCode::SettlementError);
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_string(&ApiError::validation("name is required")).unwrap();
        assert_eq!(json, r#"{"code":"VALIDATION_ERROR","message":"name is required"}"#);
    }
}
