//! Mapping from driven-port errors to domain errors.
//!
//! Connection failures become `service_unavailable`, query failures become
//! `internal` and processor failures become `upstream_failure` with the
//! processor's message preserved.

use tracing::error;

use crate::domain::{Error, ErrorCode};
use crate::domain::ports::{
    BookingRepositoryError, NotificationRepositoryError, PaymentGatewayError,
    ProfessionalRepositoryError, QuoteRequestRepositoryError, QuoteResponseRepositoryError,
};

pub(crate) fn map_professional_error(error: ProfessionalRepositoryError) -> Error {
    match error {
        ProfessionalRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("professional repository unavailable: {message}"))
        }
        ProfessionalRepositoryError::Query { message } => {
            Error::internal(format!("professional repository error: {message}"))
        }
        ProfessionalRepositoryError::DuplicateOwner { .. } => {
            Error::conflict("You already have a professional profile")
        }
    }
}

pub(crate) fn map_quote_request_error(error: QuoteRequestRepositoryError) -> Error {
    match error {
        QuoteRequestRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("quote request repository unavailable: {message}"))
        }
        QuoteRequestRepositoryError::Query { message } => {
            Error::internal(format!("quote request repository error: {message}"))
        }
    }
}

pub(crate) fn map_quote_response_error(error: QuoteResponseRepositoryError) -> Error {
    match error {
        QuoteResponseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("quote response repository unavailable: {message}"))
        }
        QuoteResponseRepositoryError::Query { message } => {
            Error::internal(format!("quote response repository error: {message}"))
        }
    }
}

pub(crate) fn map_booking_error(error: BookingRepositoryError) -> Error {
    match error {
        BookingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("booking repository unavailable: {message}"))
        }
        BookingRepositoryError::Query { message } => {
            Error::internal(format!("booking repository error: {message}"))
        }
    }
}

pub(crate) fn map_notification_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

pub(crate) fn map_gateway_error(error: PaymentGatewayError) -> Error {
    error!(error = %error, "payment processor call failed");
    Error::try_new(ErrorCode::UpstreamFailure, error.to_string())
        .unwrap_or_else(|_| Error::upstream_failure("payment processor request failed"))
}
