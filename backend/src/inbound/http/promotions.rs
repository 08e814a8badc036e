//! Sponsored listing HTTP handlers.
//!
//! ```text
//! POST /api/v1/professionals/{id}/promotion
//! POST /api/v1/promotions/verify
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ProfessionalId;
use crate::domain::ports::CreatePromotionRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{Caller, RequestOrigin};
use crate::inbound::http::booking_payments::{PaymentVerificationBody, VerifyPaymentRequestBody};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, require_text};

/// Hosted checkout page for a promotion purchase.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromotionCheckoutBody {
    pub url: String,
    pub session_id: String,
}

/// Open a checkout to promote the caller's listing.
#[utoipa::path(
    post,
    path = "/api/v1/professionals/{id}/promotion",
    params(("id" = String, Path, description = "Professional id", format = "uuid")),
    responses(
        (status = 200, description = "Checkout session opened", body = PromotionCheckoutBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller does not own the profile", body = ErrorSchema),
        (status = 422, description = "Payout onboarding incomplete", body = ErrorSchema),
        (status = 502, description = "Payment processor error", body = ErrorSchema)
    ),
    tags = ["promotions"],
    operation_id = "createPromotionCheckout",
    security(("BearerToken" = []))
)]
#[post("/professionals/{id}/promotion")]
pub async fn create_promotion_checkout(
    state: web::Data<HttpState>,
    caller: Caller,
    origin: RequestOrigin,
    path: web::Path<String>,
) -> ApiResult<web::Json<PromotionCheckoutBody>> {
    let professional_id: ProfessionalId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let session = state
        .promotions
        .create_checkout(CreatePromotionRequest {
            user_id: caller.id(),
            professional_id,
            origin: origin.into_inner(),
        })
        .await?;
    Ok(web::Json(PromotionCheckoutBody {
        url: session.url,
        session_id: session.id,
    }))
}

/// Apply a paid promotion to the payer's listing.
#[utoipa::path(
    post,
    path = "/api/v1/promotions/verify",
    request_body = VerifyPaymentRequestBody,
    responses(
        (status = 200, description = "Verification outcome", body = PaymentVerificationBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 502, description = "Payment processor error", body = ErrorSchema)
    ),
    tags = ["promotions"],
    operation_id = "verifyPromotionPayment",
    security(("BearerToken" = []))
)]
#[post("/promotions/verify")]
pub async fn verify_promotion_payment(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<VerifyPaymentRequestBody>,
) -> ApiResult<web::Json<PaymentVerificationBody>> {
    let session_id = require_text(payload.into_inner().session_id, FieldName::new("session_id"))?;
    let verification = state
        .promotions
        .verify(&caller.id(), session_id.trim())
        .await?;
    Ok(web::Json(PaymentVerificationBody::from(verification)))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::Error;
    use crate::domain::ports::{CheckoutSession, MockPromotionCommand, PaymentVerification};
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::{
        AuthenticatedRequest, PUBLIC_ORIGIN, caller, mock_ports, state_from,
    };

    async fn call(ports: HttpStatePorts, req: test::TestRequest) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state_from(ports))).service(
                web::scope("/api/v1")
                    .service(create_promotion_checkout)
                    .service(verify_promotion_payment),
            ),
        )
        .await;
        test::call_service(&app, req.to_request()).await
    }

    #[rstest]
    #[actix_web::test]
    async fn checkout_uses_the_fallback_origin() {
        let (user_id, auth) = caller();
        let mut command = MockPromotionCommand::new();
        command
            .expect_create_checkout()
            .withf(move |request| request.user_id == user_id && request.origin == PUBLIC_ORIGIN)
            .times(1)
            .return_once(|_| {
                Ok(CheckoutSession {
                    id: "cs_promo".to_owned(),
                    url: "https://checkout.processor.test/cs_promo".to_owned(),
                })
            });
        let mut ports = mock_ports();
        ports.promotions = Arc::new(command);

        let res = call(
            ports,
            test::TestRequest::post()
                .uri(&format!(
                    "/api/v1/professionals/{}/promotion",
                    ProfessionalId::random()
                ))
                .bearer(&auth),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["sessionId"], "cs_promo");
    }

    #[rstest]
    #[actix_web::test]
    async fn incomplete_onboarding_blocks_promotion() {
        let (_, auth) = caller();
        let mut command = MockPromotionCommand::new();
        command.expect_create_checkout().times(1).return_once(|_| {
            Err(Error::precondition_failed(
                "Complete payout setup before promoting your listing",
            ))
        });
        let mut ports = mock_ports();
        ports.promotions = Arc::new(command);

        let res = call(
            ports,
            test::TestRequest::post()
                .uri(&format!(
                    "/api/v1/professionals/{}/promotion",
                    ProfessionalId::random()
                ))
                .bearer(&auth),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[rstest]
    #[actix_web::test]
    async fn unpaid_sessions_report_failure() {
        let (_, auth) = caller();
        let mut command = MockPromotionCommand::new();
        command
            .expect_verify()
            .withf(|_, session_id| session_id == "cs_promo")
            .times(1)
            .return_once(|_, _| Ok(PaymentVerification::not_completed()));
        let mut ports = mock_ports();
        ports.promotions = Arc::new(command);

        let res = call(
            ports,
            test::TestRequest::post()
                .uri("/api/v1/promotions/verify")
                .bearer(&auth)
                .set_json(json!({"session_id": " cs_promo "})),
        )
        .await;

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"success": false, "message": "Payment not completed"}));
    }
}
