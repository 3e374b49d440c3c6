//! # Money
//!
//! Amounts in the currency's minor unit (kopecks, cents).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  2.50 per minute, 137 minutes, 10% off                                  │
//! │                                                                         │
//! │  f64:     2.5 * 137 * 0.9         = 308.25000000000006                  │
//! │  Money:   250 * 137 = 34250, -3425 = 30825                              │
//! │                                                                         │
//! │  Rates, caps, totals and revenue never leave the minor unit.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```rust
//! use lounge_core::money::Money;
//!
//! let rate = Money::from_cents(250);
//! let due = rate.for_minutes(137).less_percent(10);
//! assert_eq!(due.cents(), 30_825);
//! assert_eq!(due.to_string(), "308.25");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// Minor units per major unit.
const MINOR_PER_MAJOR: i64 = 100;

/// An amount in the minor unit. Currency symbols are the console's business.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// A per-minute rate charged for `minutes`. Saturates instead of
    /// overflowing on absurd durations.
    ///
    /// ```rust
    /// use lounge_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(250).for_minutes(30).cents(), 7_500);
    /// ```
    #[inline]
    pub const fn for_minutes(&self, minutes: i64) -> Self {
        Money(self.0.saturating_mul(minutes))
    }

    /// The amount after a `percent` discount.
    ///
    /// The discount itself is rounded half-up to the minor unit, so 100% off
    /// is always exactly zero.
    ///
    /// ```rust
    /// use lounge_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(10_000).less_percent(15).cents(), 8_500);
    /// assert_eq!(Money::from_cents(1_005).less_percent(10).cents(), 904);
    /// ```
    pub fn less_percent(&self, percent: u8) -> Self {
        let off = (i128::from(self.0) * i128::from(percent) + 50) / 100;
        Money(self.0 - off as i64)
    }

    /// Average share when the amount is split over `count`, truncated.
    /// Zero for an empty count.
    pub fn average_over(&self, count: i64) -> Self {
        match count {
            0 => Money::zero(),
            n => Money(self.0 / n),
        }
    }
}

/// `600.00`, `-5.50`
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per, abs % per)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
