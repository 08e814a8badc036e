//! Driving port for connected payout account onboarding.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, ProfessionalId, UserId};

/// Request to start or resume payout onboarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPayoutRequest {
    pub user: AuthenticatedUser,
    pub professional_id: ProfessionalId,
    /// Base URL for the onboarding redirects.
    pub origin: String,
}

/// A fresh onboarding link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPayoutResponse {
    pub url: String,
    pub account_id: String,
}

/// Whether a professional can receive payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutStatus {
    pub complete: bool,
}

/// Driving port for the payout onboarding gate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayoutOnboardingCommand: Send + Sync {
    /// Create the connected account once and return a new onboarding link.
    async fn connect(&self, request: ConnectPayoutRequest) -> Result<ConnectPayoutResponse, Error>;

    /// Refresh and persist the onboarding flag from the processor.
    async fn check_status(
        &self,
        user_id: &UserId,
        professional_id: &ProfessionalId,
    ) -> Result<PayoutStatus, Error>;
}
