//! Money in integer minor units.
//!
//! Amounts are held as cents so fee arithmetic never drifts. Conversion to
//! and from major units happens only at the edges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors raised when building [`Money`] from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The amount was negative.
    #[error("amount must not be negative")]
    Negative,
    /// The amount was NaN or infinite.
    #[error("amount must be a finite number")]
    NotFinite,
    /// The amount does not fit in the supported range.
    #[error("amount is too large")]
    Overflow,
}

/// Largest accepted major-unit amount (ten million).
const MAX_MAJOR_UNITS: f64 = 10_000_000.0;

/// Non-negative amount of money in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Build from cents, rejecting negative values.
    pub fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        if cents < 0 {
            return Err(MoneyError::Negative);
        }
        Ok(Self(cents))
    }

    /// Build from an unsigned cent count, which is always valid.
    pub fn from_unsigned_cents(cents: u32) -> Self {
        Self(i64::from(cents))
    }

    /// Build from a major-unit amount, rounding to the nearest cent.
    ///
    /// # Examples
    /// ```
    /// use bluecaller::domain::Money;
    ///
    /// let rate = Money::from_major(80.0).expect("valid amount");
    /// assert_eq!(rate.cents(), 8_000);
    /// assert_eq!(rate.to_string(), "80.00");
    /// ```
    pub fn from_major(amount: f64) -> Result<Self, MoneyError> {
        if !amount.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        if amount < 0.0 {
            return Err(MoneyError::Negative);
        }
        if amount > MAX_MAJOR_UNITS {
            return Err(MoneyError::Overflow);
        }
        // Bounded by MAX_MAJOR_UNITS, so the cast cannot truncate.
        let cents = (amount * 100.0).round() as i64;
        Ok(Self(cents))
    }

    /// Amount in cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// True when the amount is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiply by a whole quantity, failing on overflow.
    pub fn checked_mul(self, quantity: u32) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Subtract, failing when the result would be negative.
    pub fn checked_sub(self, other: Self) -> Result<Self, MoneyError> {
        match self.0.checked_sub(other.0) {
            Some(value) if value >= 0 => Ok(Self(value)),
            Some(_) => Err(MoneyError::Negative),
            None => Err(MoneyError::Overflow),
        }
    }

    /// Percentage share rounded half up to the cent.
    ///
    /// Integer arithmetic only: `(cents * percent + 50) / 100`.
    pub fn percentage(self, percent: u32) -> Result<Self, MoneyError> {
        let scaled = self
            .0
            .checked_mul(i64::from(percent))
            .and_then(|value| value.checked_add(50))
            .ok_or(MoneyError::Overflow)?;
        Ok(Self(scaled / 100))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
