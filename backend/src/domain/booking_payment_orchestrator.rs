//! Booking payment creation and pull-based reconciliation.
//!
//! A booking is charged `hourly_rate × assumed_hours`; the platform keeps
//! its fee as the processor's application fee and the remainder is routed to
//! the professional's connected account. Intent creation is keyed on the
//! booking and amount so a retried request reuses the processor's intent.
//! Reconciliation reads the checkout session back and settles the booking
//! with a conditional update, so verifying twice is harmless.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::domain::ports::{
    BookingPaymentCommand, BookingRepository, CheckoutPayment, CheckoutSessionRequest,
    CheckoutSessionStatus, CreateBookingPaymentRequest, CreateBookingPaymentResponse,
    PaymentGateway, PaymentIntentRecord, PaymentIntentRequest, PaymentMetadata,
    PaymentVerification, ProfessionalRepository, VerifyBookingPaymentRequest,
};
use crate::domain::service_errors::{map_booking_error, map_gateway_error, map_professional_error};
use crate::domain::{
    AuthenticatedUser, Booking, BookingCharge, BookingId, Error, PaymentStatus, PricingPolicy,
    Professional, UserId,
};

/// Commercial terms applied to booking payments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTerms {
    /// Assumed hours and platform fee rate.
    pub pricing: PricingPolicy,
    /// ISO currency code understood by the processor, lower case.
    pub currency: String,
}

impl Default for PaymentTerms {
    fn default() -> Self {
        Self {
            pricing: PricingPolicy::default(),
            currency: "usd".to_owned(),
        }
    }
}

/// Idempotency key for a booking's payment intent.
///
/// Stable for the same booking and amount, so a double submit maps to one
/// intent; a changed amount yields a fresh key.
pub fn payment_idempotency_key(booking_id: &BookingId, charge: &BookingCharge) -> String {
    let mut hasher = Sha256::new();
    hasher.update(booking_id.to_string().as_bytes());
    hasher.update(charge.total.cents().to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Domain service implementing [`BookingPaymentCommand`].
#[derive(Clone)]
pub struct BookingPaymentOrchestrator<B, P> {
    booking_repo: Arc<B>,
    professional_repo: Arc<P>,
    gateway: Arc<dyn PaymentGateway>,
    terms: PaymentTerms,
}

impl<B, P> BookingPaymentOrchestrator<B, P> {
    /// Create the orchestrator.
    pub fn new(
        booking_repo: Arc<B>,
        professional_repo: Arc<P>,
        gateway: Arc<dyn PaymentGateway>,
        terms: PaymentTerms,
    ) -> Self {
        Self {
            booking_repo,
            professional_repo,
            gateway,
            terms,
        }
    }
}

impl<B, P> BookingPaymentOrchestrator<B, P>
where
    B: BookingRepository,
    P: ProfessionalRepository,
{
    /// Load the caller's booking; other customers' bookings read as missing.
    async fn customer_booking(&self, customer: &UserId, id: &BookingId) -> Result<Booking, Error> {
        self.booking_repo
            .find_by_id(id)
            .await
            .map_err(map_booking_error)?
            .filter(|booking| booking.customer_id == *customer)
            .ok_or_else(|| Error::not_found("Booking not found"))
    }

    async fn payable_professional(&self, booking: &Booking) -> Result<(Professional, String), Error> {
        let professional = self
            .professional_repo
            .find_by_id(&booking.professional_id)
            .await
            .map_err(map_professional_error)?
            .ok_or_else(|| Error::not_found("Professional not found"))?;
        let destination = professional
            .payout_account_id
            .clone()
            .filter(|_| professional.can_receive_payouts())
            .ok_or_else(|| Error::precondition_failed("Professional has not completed payment setup"))?;
        Ok((professional, destination))
    }

    async fn processor_customer(&self, customer: &AuthenticatedUser) -> Result<Option<String>, Error> {
        match customer.email.as_deref() {
            Some(email) => self
                .gateway
                .find_customer_by_email(email)
                .await
                .map_err(map_gateway_error),
            None => Ok(None),
        }
    }

    /// Reuse the stored intent for a pending booking at the same amount,
    /// otherwise create and record a new one.
    async fn payment_intent(
        &self,
        booking: &Booking,
        professional: &Professional,
        destination: String,
        charge: &BookingCharge,
        processor_customer: Option<String>,
    ) -> Result<String, Error> {
        let reusable = booking.payment_intent_id.clone().filter(|_| {
            booking.payment_status == PaymentStatus::Pending && booking.amount == Some(charge.total)
        });
        if let Some(intent_id) = reusable {
            debug!(booking_id = %booking.id, "reusing pending payment intent");
            return Ok(intent_id);
        }

        let metadata = PaymentMetadata::from([
            ("booking_id".to_owned(), booking.id.to_string()),
            ("professional_id".to_owned(), professional.id.to_string()),
            ("customer_id".to_owned(), booking.customer_id.to_string()),
        ]);
        let intent_id = self
            .gateway
            .create_payment_intent(&PaymentIntentRequest {
                amount: charge.total,
                currency: self.terms.currency.clone(),
                application_fee: charge.platform_fee,
                destination_account: destination,
                customer_id: processor_customer,
                metadata,
                idempotency_key: payment_idempotency_key(&booking.id, charge),
            })
            .await
            .map_err(map_gateway_error)?;

        let recorded = self
            .booking_repo
            .record_payment_intent(
                &booking.id,
                &PaymentIntentRecord {
                    intent_id: intent_id.clone(),
                    amount: charge.total,
                    platform_fee: charge.platform_fee,
                },
            )
            .await
            .map_err(map_booking_error)?;
        if !recorded {
            return Err(Error::conflict("Booking is already paid"));
        }
        Ok(intent_id)
    }
}

/// A settled checkout for a booking that was cancelled meanwhile.
///
/// The booking is left as it is and the charge has to be refunded by hand.
fn paid_after_cancellation(booking: &Booking, session: &CheckoutSessionStatus) -> Error {
    warn!(
        booking_id = %booking.id,
        session_id = %session.id,
        payment_intent_id = session.payment_intent_id.as_deref().unwrap_or_default(),
        "checkout settled for a cancelled booking; refund required"
    );
    Error::conflict("Booking was cancelled; the payment will be refunded")
}

fn session_is_bound(session: &CheckoutSessionStatus, booking: &Booking) -> bool {
    let by_metadata = session
        .metadata
        .get("booking_id")
        .is_some_and(|id| *id == booking.id.to_string());
    let by_intent = session.payment_intent_id.is_some()
        && session.payment_intent_id == booking.payment_intent_id;
    by_metadata || by_intent
}

#[async_trait]
impl<B, P> BookingPaymentCommand for BookingPaymentOrchestrator<B, P>
where
    B: BookingRepository,
    P: ProfessionalRepository,
{
    async fn create_payment(
        &self,
        request: CreateBookingPaymentRequest,
    ) -> Result<CreateBookingPaymentResponse, Error> {
        let booking = self
            .customer_booking(&request.customer.id, &request.booking_id)
            .await?;
        if booking.payment_status == PaymentStatus::Paid {
            return Err(Error::conflict("Booking is already paid"));
        }
        if !booking.status.accepts_payment() {
            return Err(Error::conflict(format!(
                "A {} booking cannot be paid",
                booking.status
            )));
        }

        let (professional, destination) = self.payable_professional(&booking).await?;
        let charge = self
            .terms
            .pricing
            .charge_for(professional.hourly_rate)
            .map_err(|err| Error::internal(format!("booking charge overflow: {err}")))?;

        let processor_customer = self.processor_customer(&request.customer).await?;
        let intent_id = self
            .payment_intent(
                &booking,
                &professional,
                destination,
                &charge,
                processor_customer.clone(),
            )
            .await?;

        let customer_email = match processor_customer {
            Some(_) => None,
            None => request.customer.email.clone(),
        };
        let session = self
            .gateway
            .create_checkout_session(&CheckoutSessionRequest {
                payment: CheckoutPayment::Intent { intent_id },
                customer_id: processor_customer,
                customer_email,
                success_url: format!(
                    "{}/projects?payment=success&booking={}",
                    request.origin, booking.id
                ),
                cancel_url: format!("{}/projects?payment=cancelled", request.origin),
                metadata: PaymentMetadata::from([(
                    "booking_id".to_owned(),
                    booking.id.to_string(),
                )]),
            })
            .await
            .map_err(map_gateway_error)?;

        info!(
            booking_id = %booking.id,
            session_id = %session.id,
            amount_cents = charge.total.cents(),
            platform_fee_cents = charge.platform_fee.cents(),
            "booking checkout created"
        );
        Ok(CreateBookingPaymentResponse {
            url: session.url,
            session_id: session.id,
            amount: charge.total,
            platform_fee: charge.platform_fee,
        })
    }

    async fn verify_payment(
        &self,
        request: VerifyBookingPaymentRequest,
    ) -> Result<PaymentVerification, Error> {
        let booking = self
            .customer_booking(&request.customer_id, &request.booking_id)
            .await?;
        if booking.payment_status == PaymentStatus::Paid {
            return Ok(PaymentVerification::succeeded("Payment verified successfully"));
        }

        let session = self
            .gateway
            .retrieve_checkout_session(&request.session_id)
            .await
            .map_err(map_gateway_error)?;
        if !session_is_bound(&session, &booking) {
            return Err(Error::forbidden(
                "Checkout session does not belong to this booking",
            ));
        }
        if !session.paid {
            debug!(booking_id = %booking.id, session_id = %session.id, "checkout not paid yet");
            return Ok(PaymentVerification::not_completed());
        }
        if !booking.status.accepts_payment() {
            return Err(paid_after_cancellation(&booking, &session));
        }

        let settlement = self
            .booking_repo
            .mark_paid(&booking.id)
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| Error::not_found("Booking not found"))?;
        if settlement.booking.payment_status != PaymentStatus::Paid {
            return Err(paid_after_cancellation(&settlement.booking, &session));
        }
        info!(
            booking_id = %booking.id,
            status = %settlement.booking.status,
            transitioned = settlement.transitioned,
            "booking payment reconciled"
        );
        Ok(PaymentVerification::succeeded("Payment verified successfully"))
    }
}

#[cfg(test)]
#[path = "booking_payment_orchestrator_tests.rs"]
mod tests;
