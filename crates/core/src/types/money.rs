//! Monetary amounts in integer minor units.
//!
//! All cart arithmetic happens in cents (`i64`), so repeated recomputation is
//! exact and independent of evaluation order. Decimal values appear only at
//! the boundaries: parsing amounts from external APIs and formatting for
//! display.

use core::fmt;
use core::ops::{Add, Sub};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when converting into [`Money`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The decimal amount does not fit in 64-bit cents.
    #[error("amount out of range: {0}")]
    OutOfRange(Decimal),
}

/// A monetary amount in minor units (cents).
///
/// Serializes transparently as an integer cent count. Use
/// [`Money::from_decimal`] / [`Money::to_decimal`] when crossing a boundary
/// that speaks decimal currency amounts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Create a `Money` from a cent count.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount as a cent count.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert a decimal currency amount (e.g. `5.99`) into cents.
    ///
    /// The value is rounded to two decimal places, half away from zero, before
    /// conversion so sub-cent inputs cannot leak into cart arithmetic.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::OutOfRange`] if the amount does not fit in `i64`
    /// cents.
    pub fn from_decimal(amount: Decimal) -> Result<Self, MoneyError> {
        let cents = (amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        cents
            .to_i64()
            .map(Self)
            .ok_or(MoneyError::OutOfRange(amount))
    }

    /// The amount as a decimal currency value (e.g. `5.99`).
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Multiply by a quantity, saturating at the `i64` boundary.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    /// Subtract, clamping at zero instead of going negative.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 { Self::ZERO } else { Self(diff) }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Money {
    /// Format as a dollar amount, e.g. `$12.34`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}
