//! Driving port for booking payment creation and reconciliation.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, BookingId, Error, Money, UserId};

/// Request to open a checkout for a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookingPaymentRequest {
    pub customer: AuthenticatedUser,
    pub booking_id: BookingId,
    /// Base URL for the checkout redirects.
    pub origin: String,
}

/// A checkout the customer is redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookingPaymentResponse {
    pub url: String,
    pub session_id: String,
    pub amount: Money,
    pub platform_fee: Money,
}

/// Request to reconcile a checkout session into booking state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyBookingPaymentRequest {
    pub customer_id: UserId,
    pub booking_id: BookingId,
    pub session_id: String,
}

/// User-facing result of a payment verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentVerification {
    pub success: bool,
    pub message: String,
}

impl PaymentVerification {
    /// Successful verification with `message`.
    pub fn succeeded(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_owned(),
        }
    }

    /// The session has not been paid.
    pub fn not_completed() -> Self {
        Self {
            success: false,
            message: "Payment not completed".to_owned(),
        }
    }
}

/// Driving port for escrowed booking payments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingPaymentCommand: Send + Sync {
    /// Compute the charge, create an intent routed to the professional and
    /// open a checkout session for it.
    async fn create_payment(
        &self,
        request: CreateBookingPaymentRequest,
    ) -> Result<CreateBookingPaymentResponse, Error>;

    /// Read the session back and mark the booking paid when it was.
    async fn verify_payment(
        &self,
        request: VerifyBookingPaymentRequest,
    ) -> Result<PaymentVerification, Error>;
}
