//! Shared helpers for HTTP handler tests.
//!
//! Every driving port defaults to a mock with no expectations, so a handler
//! that touches a port the test did not prepare fails loudly. Identity uses
//! the fixture provider: a UUID bearer token authenticates as that user.

use std::sync::Arc;

use actix_web::http::header;
use actix_web::test::TestRequest;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{
    FixtureIdentityProvider, MockBookingCommand, MockBookingPaymentCommand, MockBookingQuery,
    MockNotificationInbox, MockPayoutOnboardingCommand, MockProfessionalCommand,
    MockProfessionalQuery, MockPromotionCommand, MockQuoteLifecycleCommand,
    MockQuoteRequestCommand, MockQuoteRequestQuery, MockQuoteResponseCommand,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

pub(crate) const PUBLIC_ORIGIN: &str = "https://public.bluecaller.test";

pub(crate) fn mock_ports() -> HttpStatePorts {
    HttpStatePorts {
        identity: Arc::new(FixtureIdentityProvider),
        professionals: Arc::new(MockProfessionalCommand::new()),
        professionals_query: Arc::new(MockProfessionalQuery::new()),
        quote_requests: Arc::new(MockQuoteRequestCommand::new()),
        quote_requests_query: Arc::new(MockQuoteRequestQuery::new()),
        quote_responses: Arc::new(MockQuoteResponseCommand::new()),
        quote_lifecycle: Arc::new(MockQuoteLifecycleCommand::new()),
        bookings: Arc::new(MockBookingCommand::new()),
        bookings_query: Arc::new(MockBookingQuery::new()),
        booking_payments: Arc::new(MockBookingPaymentCommand::new()),
        payouts: Arc::new(MockPayoutOnboardingCommand::new()),
        promotions: Arc::new(MockPromotionCommand::new()),
        notifications: Arc::new(MockNotificationInbox::new()),
    }
}

pub(crate) fn state_from(ports: HttpStatePorts) -> HttpState {
    HttpState::new(ports, PUBLIC_ORIGIN)
}

/// A fresh caller and the header that authenticates as them.
pub(crate) fn caller() -> (UserId, (header::HeaderName, String)) {
    let id = Uuid::new_v4();
    (
        UserId::from_uuid(id),
        (header::AUTHORIZATION, format!("Bearer {id}")),
    )
}

pub(crate) trait AuthenticatedRequest {
    fn bearer(self, header: &(header::HeaderName, String)) -> Self;
}

impl AuthenticatedRequest for TestRequest {
    fn bearer(self, header: &(header::HeaderName, String)) -> Self {
        self.insert_header(header.clone())
    }
}
