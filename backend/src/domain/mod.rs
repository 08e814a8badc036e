//! Domain primitives, aggregates and services.
//!
//! Purpose: Define the marketplace's strongly typed entities and the
//! services that implement the driving ports. Nothing here knows about
//! HTTP, SQL or the payment processor's wire format; those live behind the
//! ports in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Entities: `Professional`, `QuoteRequest`, `QuoteResponse`, `Booking`,
//!   `Notification`, plus the id newtypes and `Money`.
//! - Services: one per driving port, generic over the driven ports.

pub mod auth;
pub mod booking;
pub mod booking_payment_orchestrator;
pub mod booking_service;
pub mod error;
pub mod ids;
pub mod matcher;
pub mod money;
pub mod notification;
pub mod notification_inbox_service;
pub mod payout_onboarding_gate;
pub mod ports;
pub mod pricing;
pub mod professional;
pub mod professional_service;
pub mod promotion_service;
pub mod quote_lifecycle_manager;
pub mod quote_request;
pub mod quote_request_query_service;
pub mod quote_response;
pub mod quote_response_controller;
mod service_errors;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod trace_id;

pub use self::auth::{AuthenticatedUser, BearerToken, BearerTokenError};
pub use self::booking::{
    Booking, BookingAction, BookingActionError, BookingDetails, BookingParty, BookingStatus,
    BookingValidationError, ParseStatusError, PaymentStatus,
};
pub use self::booking_payment_orchestrator::{
    BookingPaymentOrchestrator, PaymentTerms, payment_idempotency_key,
};
pub use self::booking_service::BookingService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ids::{
    BookingId, NotificationId, ProfessionalId, QuoteRequestId, QuoteResponseId, UserId,
};
pub use self::matcher::QuoteMatcher;
pub use self::money::{Money, MoneyError};
pub use self::notification::{NewNotification, Notification};
pub use self::notification_inbox_service::NotificationInboxService;
pub use self::payout_onboarding_gate::PayoutOnboardingGate;
pub use self::pricing::{BookingCharge, PricingPolicy, PricingPolicyError};
pub use self::professional::{Professional, ProfessionalDraft, ProfessionalValidationError};
pub use self::professional_service::ProfessionalService;
pub use self::promotion_service::{PromotionService, PromotionTerms};
pub use self::quote_lifecycle_manager::{DEFAULT_ACCEPTANCE_WINDOW_MINUTES, QuoteLifecycleManager};
pub use self::quote_request::{
    CustomerContact, QuoteRequest, QuoteRequestDraft, QuoteRequestValidationError,
};
pub use self::quote_request_query_service::QuoteRequestQueryService;
pub use self::quote_response::{
    MAX_RESPONSES_PER_REQUEST, NewQuoteResponse, ParseQuoteResponseStatusError, QuoteResponse,
    QuoteResponseStatus, ResponseOrder, StatusChange, StatusTransitionError,
};
pub use self::quote_response_controller::QuoteResponseController;
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use bluecaller::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
