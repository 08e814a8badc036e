//! Driving port for paid listing promotion.

use async_trait::async_trait;

use crate::domain::{Error, ProfessionalId, UserId};

use super::{CheckoutSession, PaymentVerification};

/// Request to open a promotion checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePromotionRequest {
    pub user_id: UserId,
    pub professional_id: ProfessionalId,
    pub origin: String,
}

/// Driving port for sponsored listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromotionCommand: Send + Sync {
    /// Open a line-item checkout for the promotion price.
    async fn create_checkout(&self, request: CreatePromotionRequest)
    -> Result<CheckoutSession, Error>;

    /// Mark the payer's profile sponsored when the session was paid.
    async fn verify(&self, user_id: &UserId, session_id: &str)
    -> Result<PaymentVerification, Error>;
}
