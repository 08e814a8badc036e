//! Driving ports for direct bookings.

use async_trait::async_trait;

use crate::domain::{Booking, BookingAction, BookingDetails, BookingId, Error, ProfessionalId, UserId};

/// Request to book a professional directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookingRequest {
    pub customer_id: UserId,
    pub professional_id: ProfessionalId,
    pub details: BookingDetails,
}

/// A status action performed by one side of a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingActionRequest {
    pub user_id: UserId,
    pub booking_id: BookingId,
    pub action: BookingAction,
}

/// A booking with the professional details the caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingView {
    pub booking: Booking,
    pub professional_name: String,
    /// Present for the professional, and for the customer once paid.
    pub professional_phone: Option<String>,
}

/// Driving port for booking writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Create a pending, unpaid booking.
    async fn create(&self, request: CreateBookingRequest) -> Result<Booking, Error>;

    /// Apply a status action with compare-and-set semantics.
    async fn apply_action(&self, request: BookingActionRequest) -> Result<Booking, Error>;
}

/// Driving port for booking reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingQuery: Send + Sync {
    /// One booking, visible to either party.
    async fn get(&self, caller: &UserId, id: &BookingId) -> Result<BookingView, Error>;

    /// Bookings the caller made.
    async fn list_for_customer(&self, customer_id: &UserId) -> Result<Vec<Booking>, Error>;

    /// Bookings assigned to the caller's professional profile.
    async fn list_assigned(&self, user_id: &UserId) -> Result<Vec<Booking>, Error>;
}
