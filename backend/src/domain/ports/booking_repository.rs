//! Port for booking persistence and conditional status updates.

use async_trait::async_trait;

use crate::domain::{Booking, BookingId, BookingStatus, Money, ProfessionalId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by booking repository adapters.
    pub enum BookingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "booking repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "booking repository query failed: {message}",
    }
}

/// Payment fields written when an intent is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRecord {
    pub intent_id: String,
    pub amount: Money,
    pub platform_fee: Money,
}

/// Compare-and-set status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingStatusUpdate {
    /// Status the booking must still hold.
    pub from: BookingStatus,
    pub to: BookingStatus,
    /// Refuse the update when the booking has been paid meanwhile.
    pub require_unpaid: bool,
}

/// Booking state after a payment was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSettlement {
    pub booking: Booking,
    /// `false` when the booking was already paid before this call.
    pub transitioned: bool,
}

/// Port for storing bookings and advancing their state machines.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking.
    async fn insert(&self, booking: &Booking) -> Result<(), BookingRepositoryError>;

    /// Find a booking by id.
    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Bookings made by a customer, newest first.
    async fn list_for_customer(
        &self,
        customer_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Bookings assigned to a professional, newest first.
    async fn list_for_professional(
        &self,
        professional_id: &ProfessionalId,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Attach an intent and set `payment_status = pending`.
    ///
    /// Returns `false` when the booking is already paid.
    async fn record_payment_intent(
        &self,
        id: &BookingId,
        record: &PaymentIntentRecord,
    ) -> Result<bool, BookingRepositoryError>;

    /// Set `payment_status = paid` and confirm a pending booking atomically.
    ///
    /// A cancelled booking is returned unchanged with `transitioned: false`.
    /// Returns `None` when the booking does not exist.
    async fn mark_paid(
        &self,
        id: &BookingId,
    ) -> Result<Option<PaymentSettlement>, BookingRepositoryError>;

    /// Apply a compare-and-set status change. Returns `false` on a lost race.
    async fn update_status(
        &self,
        id: &BookingId,
        update: BookingStatusUpdate,
    ) -> Result<bool, BookingRepositoryError>;
}

/// Fixture implementation for tests that do not exercise bookings.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingRepository;

#[async_trait]
impl BookingRepository for FixtureBookingRepository {
    async fn insert(&self, _booking: &Booking) -> Result<(), BookingRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(None)
    }

    async fn list_for_customer(
        &self,
        _customer_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_for_professional(
        &self,
        _professional_id: &ProfessionalId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        Ok(Vec::new())
    }

    async fn record_payment_intent(
        &self,
        _id: &BookingId,
        _record: &PaymentIntentRecord,
    ) -> Result<bool, BookingRepositoryError> {
        Ok(false)
    }

    async fn mark_paid(
        &self,
        _id: &BookingId,
    ) -> Result<Option<PaymentSettlement>, BookingRepositoryError> {
        Ok(None)
    }

    async fn update_status(
        &self,
        _id: &BookingId,
        _update: BookingStatusUpdate,
    ) -> Result<bool, BookingRepositoryError> {
        Ok(false)
    }
}
