//! # Validation Module
//!
//! Input validation for visitor and tariff forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console parsing (clap)                                       │
//! │  └── Types: ids are numbers, discount is 0-255                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Field rules: names, titles, ranges, amounts                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Books (TariffBook / VisitorBook)                             │
//! │  └── Cross-record rules: uniqueness, references, lifecycle             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_TARIFF_TITLE_LEN, MAX_VISITOR_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a visitor name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters
///
/// ```rust
/// use lounge_core::validation::validate_visitor_name;
///
/// assert_eq!(validate_visitor_name("  Franz ").unwrap(), "Franz");
/// assert!(validate_visitor_name("   ").is_err());
/// ```
pub fn validate_visitor_name(name: &str) -> ValidationResult<String> {
    validate_text("name", name, MAX_VISITOR_NAME_LEN)
}

/// Validates a tariff title and returns it trimmed.
pub fn validate_tariff_title(title: &str) -> ValidationResult<String> {
    validate_text("title", title, MAX_TARIFF_TITLE_LEN)
}

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Case-insensitive name comparison used for uniqueness checks.
///
/// Uses full Unicode lowercasing, so Cyrillic names compare correctly.
///
/// ```rust
/// use lounge_core::validation::same_name;
///
/// assert!(same_name("Франц", "франц"));
/// assert!(!same_name("Franz", "Franz 2"));
/// ```
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a per-minute rate. Must be strictly positive.
pub fn validate_rate(rate: Money) -> ValidationResult<()> {
    if !rate.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "rate".to_string(),
        });
    }
    Ok(())
}

/// Validates a tariff's maximum cost. Zero is allowed (free tariff).
pub fn validate_max_cost(max_cost: Money) -> ValidationResult<()> {
    if max_cost.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "max cost".to_string(),
        });
    }
    Ok(())
}

/// Parses an operator-typed amount such as `2.50`, `2,5` or `600`.
///
/// At most two fractional digits; a comma is accepted as the decimal mark.
///
/// ```rust
/// use lounge_core::validation::parse_amount;
///
/// assert_eq!(parse_amount("rate", "2,5").unwrap().cents(), 250);
/// assert!(parse_amount("rate", "2.505").is_err());
/// ```
pub fn parse_amount(field: &str, value: &str) -> ValidationResult<Money> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let value = value.trim().replace(',', ".");
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.as_str()),
    };
    let (major, minor) = digits.split_once('.').unwrap_or((digits, ""));

    if major.is_empty() && minor.is_empty() {
        return Err(invalid("expected an amount like 2.50"));
    }
    if !major.chars().all(|c| c.is_ascii_digit()) || !minor.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("expected an amount like 2.50"));
    }
    if minor.len() > 2 {
        return Err(invalid("at most two decimal places"));
    }

    let major: i64 = if major.is_empty() {
        0
    } else {
        major.parse().map_err(|_| invalid("amount is too large"))?
    };
    let minor: i64 = format!("{minor:0<2}")
        .parse()
        .map_err(|_| invalid("expected an amount like 2.50"))?;
    let cents = major
        .checked_mul(100)
        .and_then(|c| c.checked_add(minor))
        .ok_or_else(|| invalid("amount is too large"))?;

    Ok(Money::from_cents(if negative { -cents } else { cents }))
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates an optional inclusive date range.
///
/// Open ends are always fine; a closed range must not be inverted.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ValidationResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ValidationError::InvalidRange {
                field: "period".to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }
    }
    Ok(())
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: e.to_string(),
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
