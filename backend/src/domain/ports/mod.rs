//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the payment processor, the identity provider
//! and the notification queue) are implemented by outbound adapters. Driving
//! ports are implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod booking_payments;
mod booking_repository;
mod bookings;
mod identity_provider;
mod notification_dispatcher;
mod notification_feed;
mod notification_inbox;
mod notification_repository;
mod payment_gateway;
mod payouts;
mod professional_profiles;
mod professional_repository;
mod promotions;
mod quote_request_repository;
mod quote_requests;
mod quote_response_repository;
mod quote_responses;

#[cfg(test)]
pub use booking_payments::MockBookingPaymentCommand;
pub use booking_payments::{
    BookingPaymentCommand, CreateBookingPaymentRequest, CreateBookingPaymentResponse,
    PaymentVerification, VerifyBookingPaymentRequest,
};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{
    BookingRepository, BookingRepositoryError, BookingStatusUpdate, FixtureBookingRepository,
    PaymentIntentRecord, PaymentSettlement,
};
#[cfg(test)]
pub use bookings::{MockBookingCommand, MockBookingQuery};
pub use bookings::{
    BookingActionRequest, BookingCommand, BookingQuery, BookingView, CreateBookingRequest,
};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use notification_dispatcher::MockNotificationDispatcher;
pub use notification_dispatcher::{
    FixtureNotificationDispatcher, NotificationDispatchError, NotificationDispatcher,
    dispatch_best_effort,
};
#[cfg(test)]
pub use notification_feed::MockNotificationFeed;
pub use notification_feed::{
    FeedEvent, FixtureNotificationFeed, NotificationFeed, NotificationSubscription,
};
#[cfg(test)]
pub use notification_inbox::MockNotificationInbox;
pub use notification_inbox::NotificationInbox;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{
    FixtureNotificationRepository, NotificationRepository, NotificationRepositoryError,
};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{
    CheckoutPayment, CheckoutSession, CheckoutSessionRequest, CheckoutSessionStatus,
    ConnectedAccountStatus, FixturePaymentGateway, OnboardingLinkRequest, PaymentGateway,
    PaymentGatewayError, PaymentIntentRequest, PaymentMetadata,
};
#[cfg(test)]
pub use payouts::MockPayoutOnboardingCommand;
pub use payouts::{ConnectPayoutRequest, ConnectPayoutResponse, PayoutOnboardingCommand, PayoutStatus};
#[cfg(test)]
pub use professional_profiles::{MockProfessionalCommand, MockProfessionalQuery};
pub use professional_profiles::{
    ProfessionalCommand, ProfessionalQuery, RegisterProfessionalRequest,
};
#[cfg(test)]
pub use professional_repository::MockProfessionalRepository;
pub use professional_repository::{
    FixtureProfessionalRepository, ProfessionalRepository, ProfessionalRepositoryError,
};
#[cfg(test)]
pub use promotions::MockPromotionCommand;
pub use promotions::{CreatePromotionRequest, PromotionCommand};
#[cfg(test)]
pub use quote_request_repository::MockQuoteRequestRepository;
pub use quote_request_repository::{
    FixtureQuoteRequestRepository, QuoteRequestRepository, QuoteRequestRepositoryError,
};
#[cfg(test)]
pub use quote_requests::{MockQuoteRequestCommand, MockQuoteRequestQuery};
pub use quote_requests::{
    QuoteRequestCommand, QuoteRequestQuery, QuoteRequestView, SubmitQuoteRequest,
    SubmitQuoteRequestResponse,
};
#[cfg(test)]
pub use quote_response_repository::MockQuoteResponseRepository;
pub use quote_response_repository::{
    FixtureQuoteResponseRepository, InsertOutcome, QuoteResponseRepository,
    QuoteResponseRepositoryError,
};
#[cfg(test)]
pub use quote_responses::{MockQuoteLifecycleCommand, MockQuoteResponseCommand};
pub use quote_responses::{
    QuoteLifecycleCommand, QuoteResponseCommand, SetResponseStatusRequest,
    SetResponseStatusResponse, SubmitQuoteResponseRequest, SubmitQuoteResponseResponse,
};
