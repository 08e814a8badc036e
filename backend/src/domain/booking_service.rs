//! Direct bookings and their status actions.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    BookingActionRequest, BookingCommand, BookingQuery, BookingRepository, BookingStatusUpdate,
    BookingView, CreateBookingRequest, ProfessionalRepository,
};
use crate::domain::service_errors::{map_booking_error, map_professional_error};
use crate::domain::{
    Booking, BookingAction, BookingActionError, BookingId, BookingParty, Error, Professional,
    ProfessionalId, UserId,
};

/// Domain service implementing [`BookingCommand`] and [`BookingQuery`].
#[derive(Clone)]
pub struct BookingService<B, P> {
    booking_repo: Arc<B>,
    professional_repo: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<B, P> BookingService<B, P> {
    /// Create the booking service.
    pub fn new(booking_repo: Arc<B>, professional_repo: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            booking_repo,
            professional_repo,
            clock,
        }
    }
}

fn action_error(err: BookingActionError) -> Error {
    match err {
        BookingActionError::WrongParty { .. } => Error::forbidden(err.to_string()),
        BookingActionError::InvalidState { .. } | BookingActionError::AlreadyPaid => {
            Error::conflict(err.to_string())
        }
    }
}

impl<B, P> BookingService<B, P>
where
    B: BookingRepository,
    P: ProfessionalRepository,
{
    async fn load_professional(&self, id: &ProfessionalId) -> Result<Professional, Error> {
        self.professional_repo
            .find_by_id(id)
            .await
            .map_err(map_professional_error)?
            .ok_or_else(|| Error::not_found("Professional not found"))
    }

    /// Load a booking together with its professional and the caller's side.
    ///
    /// Callers who are neither party see the booking as missing.
    async fn load_for_party(
        &self,
        caller: &UserId,
        id: &BookingId,
    ) -> Result<(Booking, Professional, BookingParty), Error> {
        let booking = self
            .booking_repo
            .find_by_id(id)
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| Error::not_found("Booking not found"))?;
        let professional = self.load_professional(&booking.professional_id).await?;

        let party = if booking.customer_id == *caller {
            BookingParty::Customer
        } else if professional.user_id == *caller {
            BookingParty::Professional
        } else {
            return Err(Error::not_found("Booking not found"));
        };
        Ok((booking, professional, party))
    }
}

#[async_trait]
impl<B, P> BookingCommand for BookingService<B, P>
where
    B: BookingRepository,
    P: ProfessionalRepository,
{
    async fn create(&self, request: CreateBookingRequest) -> Result<Booking, Error> {
        let details = request
            .details
            .normalised()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let professional = self.load_professional(&request.professional_id).await?;
        if professional.user_id == request.customer_id {
            return Err(Error::invalid_request("You cannot book your own listing"));
        }

        let booking = Booking::new(
            professional.id,
            request.customer_id,
            details,
            self.clock.utc(),
        );
        self.booking_repo
            .insert(&booking)
            .await
            .map_err(map_booking_error)?;

        info!(
            booking_id = %booking.id,
            professional_id = %booking.professional_id,
            "booking created"
        );
        Ok(booking)
    }

    async fn apply_action(&self, request: BookingActionRequest) -> Result<Booking, Error> {
        let (booking, _, party) = self
            .load_for_party(&request.user_id, &request.booking_id)
            .await?;
        let next = request
            .action
            .apply(party, booking.status, booking.payment_status)
            .map_err(action_error)?;

        let update = BookingStatusUpdate {
            from: booking.status,
            to: next,
            require_unpaid: request.action == BookingAction::Cancel,
        };
        let applied = self
            .booking_repo
            .update_status(&booking.id, update)
            .await
            .map_err(map_booking_error)?;
        if !applied {
            return Err(Error::conflict(
                "Booking changed while it was being updated; reload and try again",
            ));
        }

        info!(
            booking_id = %booking.id,
            action = %request.action,
            from = %booking.status,
            to = %next,
            "booking status changed"
        );
        Ok(Booking {
            status: next,
            ..booking
        })
    }
}

#[async_trait]
impl<B, P> BookingQuery for BookingService<B, P>
where
    B: BookingRepository,
    P: ProfessionalRepository,
{
    async fn get(&self, caller: &UserId, id: &BookingId) -> Result<BookingView, Error> {
        let (booking, professional, party) = self.load_for_party(caller, id).await?;
        let professional_phone = match party {
            BookingParty::Professional => Some(professional.phone),
            BookingParty::Customer => booking.reveals_contact().then_some(professional.phone),
        };
        Ok(BookingView {
            booking,
            professional_name: professional.name,
            professional_phone,
        })
    }

    async fn list_for_customer(&self, customer_id: &UserId) -> Result<Vec<Booking>, Error> {
        self.booking_repo
            .list_for_customer(customer_id)
            .await
            .map_err(map_booking_error)
    }

    async fn list_assigned(&self, user_id: &UserId) -> Result<Vec<Booking>, Error> {
        let professional = self
            .professional_repo
            .find_by_user(user_id)
            .await
            .map_err(map_professional_error)?
            .ok_or_else(|| Error::forbidden("Not a professional"))?;
        self.booking_repo
            .list_for_professional(&professional.id)
            .await
            .map_err(map_booking_error)
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
