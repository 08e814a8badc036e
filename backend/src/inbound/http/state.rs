//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BookingCommand, BookingPaymentCommand, BookingQuery, IdentityProvider, NotificationInbox,
    PayoutOnboardingCommand, ProfessionalCommand, ProfessionalQuery, PromotionCommand,
    QuoteLifecycleCommand, QuoteRequestCommand, QuoteRequestQuery, QuoteResponseCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub identity: Arc<dyn IdentityProvider>,
    pub professionals: Arc<dyn ProfessionalCommand>,
    pub professionals_query: Arc<dyn ProfessionalQuery>,
    pub quote_requests: Arc<dyn QuoteRequestCommand>,
    pub quote_requests_query: Arc<dyn QuoteRequestQuery>,
    pub quote_responses: Arc<dyn QuoteResponseCommand>,
    pub quote_lifecycle: Arc<dyn QuoteLifecycleCommand>,
    pub bookings: Arc<dyn BookingCommand>,
    pub bookings_query: Arc<dyn BookingQuery>,
    pub booking_payments: Arc<dyn BookingPaymentCommand>,
    pub payouts: Arc<dyn PayoutOnboardingCommand>,
    pub promotions: Arc<dyn PromotionCommand>,
    pub notifications: Arc<dyn NotificationInbox>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityProvider>,
    pub professionals: Arc<dyn ProfessionalCommand>,
    pub professionals_query: Arc<dyn ProfessionalQuery>,
    pub quote_requests: Arc<dyn QuoteRequestCommand>,
    pub quote_requests_query: Arc<dyn QuoteRequestQuery>,
    pub quote_responses: Arc<dyn QuoteResponseCommand>,
    pub quote_lifecycle: Arc<dyn QuoteLifecycleCommand>,
    pub bookings: Arc<dyn BookingCommand>,
    pub bookings_query: Arc<dyn BookingQuery>,
    pub booking_payments: Arc<dyn BookingPaymentCommand>,
    pub payouts: Arc<dyn PayoutOnboardingCommand>,
    pub promotions: Arc<dyn PromotionCommand>,
    pub notifications: Arc<dyn NotificationInbox>,
    /// Origin used for processor redirect URLs when the request has none.
    pub public_origin: String,
}

impl HttpState {
    /// Construct state from the port bundle and the fallback public origin.
    ///
    /// # Examples
    /// ```ignore
    /// let state = HttpState::new(ports, "https://bluecaller.example");
    /// ```
    pub fn new(ports: HttpStatePorts, public_origin: impl Into<String>) -> Self {
        let HttpStatePorts {
            identity,
            professionals,
            professionals_query,
            quote_requests,
            quote_requests_query,
            quote_responses,
            quote_lifecycle,
            bookings,
            bookings_query,
            booking_payments,
            payouts,
            promotions,
            notifications,
        } = ports;
        Self {
            identity,
            professionals,
            professionals_query,
            quote_requests,
            quote_requests_query,
            quote_responses,
            quote_lifecycle,
            bookings,
            bookings_query,
            booking_payments,
            payouts,
            promotions,
            notifications,
            public_origin: public_origin.into().trim_end_matches('/').to_owned(),
        }
    }
}
