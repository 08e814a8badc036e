//! Booking payment HTTP handlers.
//!
//! ```text
//! POST /api/v1/bookings/{id}/payment
//! POST /api/v1/bookings/{id}/payment/verify
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::BookingId;
use crate::domain::ports::{
    CreateBookingPaymentRequest, PaymentVerification, VerifyBookingPaymentRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{Caller, RequestOrigin};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, require_text};

/// Hosted checkout page for a booking.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingPaymentResponseBody {
    /// Where to send the customer to pay.
    pub url: String,
    pub session_id: String,
}

/// Request payload for reconciling a checkout session.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct VerifyPaymentRequestBody {
    /// Checkout session id returned by the payment step.
    pub session_id: Option<String>,
}

/// Outcome of a payment reconciliation or verification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentVerificationBody {
    pub success: bool,
    #[schema(example = "Payment verified successfully")]
    pub message: String,
}

impl From<PaymentVerification> for PaymentVerificationBody {
    fn from(value: PaymentVerification) -> Self {
        Self {
            success: value.success,
            message: value.message,
        }
    }
}

/// Start paying for a booking.
///
/// Computes the total and platform fee, creates an escrowed payment intent
/// routed to the professional's payout account and opens a checkout session.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/payment",
    params(("id" = String, Path, description = "Booking id", format = "uuid")),
    responses(
        (status = 200, description = "Checkout session opened", body = BookingPaymentResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Booking not found", body = ErrorSchema),
        (status = 409, description = "Booking is already paid or was cancelled", body = ErrorSchema),
        (status = 422, description = "Professional has not completed payment setup", body = ErrorSchema),
        (status = 502, description = "Payment processor error", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "createBookingPayment",
    security(("BearerToken" = []))
)]
#[post("/bookings/{id}/payment")]
pub async fn create_booking_payment(
    state: web::Data<HttpState>,
    caller: Caller,
    origin: RequestOrigin,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookingPaymentResponseBody>> {
    let booking_id: BookingId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let created = state
        .booking_payments
        .create_payment(CreateBookingPaymentRequest {
            customer: caller.into_user(),
            booking_id,
            origin: origin.into_inner(),
        })
        .await?;
    info!(
        booking_id = %booking_id,
        amount = %created.amount,
        platform_fee = %created.platform_fee,
        "booking checkout opened"
    );
    Ok(web::Json(BookingPaymentResponseBody {
        url: created.url,
        session_id: created.session_id,
    }))
}

/// Reconcile a booking with its checkout session.
///
/// Safe to call repeatedly; a booking that is already paid reports success
/// without further writes.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/payment/verify",
    params(("id" = String, Path, description = "Booking id", format = "uuid")),
    request_body = VerifyPaymentRequestBody,
    responses(
        (status = 200, description = "Reconciliation outcome", body = PaymentVerificationBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Session belongs to another booking", body = ErrorSchema),
        (status = 404, description = "Booking not found", body = ErrorSchema),
        (status = 409, description = "Booking was cancelled before the payment settled", body = ErrorSchema),
        (status = 502, description = "Payment processor error", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "verifyBookingPayment",
    security(("BearerToken" = []))
)]
#[post("/bookings/{id}/payment/verify")]
pub async fn verify_booking_payment(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<VerifyPaymentRequestBody>,
) -> ApiResult<web::Json<PaymentVerificationBody>> {
    let booking_id: BookingId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let session_id = require_text(payload.into_inner().session_id, FieldName::new("session_id"))?;
    let verification = state
        .booking_payments
        .verify_payment(VerifyBookingPaymentRequest {
            customer_id: caller.id(),
            booking_id,
            session_id: session_id.trim().to_owned(),
        })
        .await?;
    Ok(web::Json(PaymentVerificationBody::from(verification)))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{CreateBookingPaymentResponse, MockBookingPaymentCommand};
    use crate::domain::{Error, Money};
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::{
        AuthenticatedRequest, PUBLIC_ORIGIN, caller, mock_ports, state_from,
    };

    async fn call(ports: HttpStatePorts, req: test::TestRequest) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state_from(ports))).service(
                web::scope("/api/v1")
                    .service(create_booking_payment)
                    .service(verify_booking_payment),
            ),
        )
        .await;
        test::call_service(&app, req.to_request()).await
    }

    #[rstest]
    #[case(Some("https://app.bluecaller.test"), "https://app.bluecaller.test")]
    #[case(None, PUBLIC_ORIGIN)]
    #[actix_web::test]
    async fn payment_returns_the_checkout_url(
        #[case] origin: Option<&'static str>,
        #[case] expected_origin: &'static str,
    ) {
        let (user_id, auth) = caller();
        let booking_id = BookingId::random();
        let mut command = MockBookingPaymentCommand::new();
        command
            .expect_create_payment()
            .withf(move |request| {
                request.customer.id == user_id
                    && request.booking_id == booking_id
                    && request.origin == expected_origin
            })
            .times(1)
            .return_once(|_| {
                Ok(CreateBookingPaymentResponse {
                    url: "https://checkout.processor.test/cs_123".to_owned(),
                    session_id: "cs_123".to_owned(),
                    amount: Money::from_unsigned_cents(16_000),
                    platform_fee: Money::from_unsigned_cents(1_600),
                })
            });
        let mut ports = mock_ports();
        ports.booking_payments = Arc::new(command);

        let mut req = test::TestRequest::post()
            .uri(&format!("/api/v1/bookings/{booking_id}/payment"))
            .bearer(&auth);
        if let Some(origin) = origin {
            req = req.insert_header((header::ORIGIN, origin));
        }
        let res = call(ports, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body,
            json!({"url": "https://checkout.processor.test/cs_123", "sessionId": "cs_123"})
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn unonboarded_professionals_block_payment() {
        let (_, auth) = caller();
        let mut command = MockBookingPaymentCommand::new();
        command.expect_create_payment().times(1).return_once(|_| {
            Err(Error::precondition_failed(
                "Professional has not completed payment setup",
            ))
        });
        let mut ports = mock_ports();
        ports.booking_payments = Arc::new(command);

        let res = call(
            ports,
            test::TestRequest::post()
                .uri(&format!("/api/v1/bookings/{}/payment", BookingId::random()))
                .bearer(&auth),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Professional has not completed payment setup");
    }

    #[rstest]
    #[actix_web::test]
    async fn verification_forwards_the_session_id() {
        let (user_id, auth) = caller();
        let booking_id = BookingId::random();
        let mut command = MockBookingPaymentCommand::new();
        command
            .expect_verify_payment()
            .withf(move |request| {
                request.customer_id == user_id
                    && request.booking_id == booking_id
                    && request.session_id == "cs_123"
            })
            .times(1)
            .return_once(|_| Ok(PaymentVerification::succeeded("Payment verified successfully")));
        let mut ports = mock_ports();
        ports.booking_payments = Arc::new(command);

        let res = call(
            ports,
            test::TestRequest::post()
                .uri(&format!("/api/v1/bookings/{booking_id}/payment/verify"))
                .bearer(&auth)
                .set_json(json!({"session_id": "cs_123"})),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body,
            json!({"success": true, "message": "Payment verified successfully"})
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn verification_requires_a_session_id() {
        let (_, auth) = caller();
        let res = call(
            mock_ports(),
            test::TestRequest::post()
                .uri(&format!("/api/v1/bookings/{}/payment/verify", BookingId::random()))
                .bearer(&auth)
                .set_json(json!({})),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "session_id");
    }
}
