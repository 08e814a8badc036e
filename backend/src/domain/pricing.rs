//! Booking charge computation.

use crate::domain::{Money, MoneyError};

/// Platform fee and billable duration applied to booking charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    assumed_hours: u32,
    fee_percent: u32,
}

/// Validation errors for [`PricingPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingPolicyError {
    /// Zero billable hours would produce free bookings.
    #[error("assumed booking hours must be at least 1")]
    ZeroHours,
    /// Fee percentage above 100.
    #[error("platform fee percent must be between 0 and 100, got {0}")]
    FeeOutOfRange(u32),
}

/// Amounts charged for one booking, all in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingCharge {
    /// Amount charged to the customer.
    pub total: Money,
    /// Platform share retained as the application fee.
    pub platform_fee: Money,
    /// Remainder routed to the professional's connected account.
    pub payout: Money,
}

impl PricingPolicy {
    /// Default billable duration in hours.
    pub const DEFAULT_ASSUMED_HOURS: u32 = 2;
    /// Default platform fee percentage.
    pub const DEFAULT_FEE_PERCENT: u32 = 10;

    /// Build a validated policy.
    pub fn new(assumed_hours: u32, fee_percent: u32) -> Result<Self, PricingPolicyError> {
        if assumed_hours == 0 {
            return Err(PricingPolicyError::ZeroHours);
        }
        if fee_percent > 100 {
            return Err(PricingPolicyError::FeeOutOfRange(fee_percent));
        }
        Ok(Self {
            assumed_hours,
            fee_percent,
        })
    }

    /// Billable hours per booking.
    pub const fn assumed_hours(&self) -> u32 {
        self.assumed_hours
    }

    /// Platform fee percentage.
    pub const fn fee_percent(&self) -> u32 {
        self.fee_percent
    }

    /// Compute the charge for a professional's hourly rate.
    ///
    /// # Examples
    /// ```
    /// use bluecaller::domain::{Money, PricingPolicy};
    ///
    /// let policy = PricingPolicy::default();
    /// let charge = policy.charge_for(Money::from_cents(8_000).expect("rate")).expect("charge");
    /// assert_eq!(charge.total.to_string(), "160.00");
    /// assert_eq!(charge.platform_fee.to_string(), "16.00");
    /// ```
    pub fn charge_for(&self, hourly_rate: Money) -> Result<BookingCharge, MoneyError> {
        let total = hourly_rate.checked_mul(self.assumed_hours)?;
        let platform_fee = total.percentage(self.fee_percent)?;
        let payout = total.checked_sub(platform_fee)?;
        Ok(BookingCharge {
            total,
            platform_fee,
            payout,
        })
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            assumed_hours: Self::DEFAULT_ASSUMED_HOURS,
            fee_percent: Self::DEFAULT_FEE_PERCENT,
        }
    }
}
