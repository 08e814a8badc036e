//! End-to-end booking payment flow over the HTTP adapter.
//!
//! A professional onboards for payouts, a customer books and pays through
//! the scripted processor, and the pull reconciliation confirms the booking.

#[path = "support/marketplace.rs"]
mod marketplace;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use bluecaller::domain::Money;
use bluecaller::inbound::http::configure_api;
use marketplace::{Marketplace, PUBLIC_ORIGIN, marketplace};
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

struct Party {
    auth: String,
}

impl Party {
    fn new() -> Self {
        Self {
            auth: format!("Bearer {}", Uuid::new_v4()),
        }
    }

    fn get(&self, uri: &str) -> TestRequest {
        TestRequest::get()
            .uri(uri)
            .insert_header((header::AUTHORIZATION, self.auth.clone()))
    }

    fn post(&self, uri: &str, body: &Value) -> TestRequest {
        TestRequest::post()
            .uri(uri)
            .insert_header((header::AUTHORIZATION, self.auth.clone()))
            .set_json(body)
    }
}

async fn init_app(
    market: &Marketplace,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(market.http_state()))
            .service(web::scope("/api/v1").configure(configure_api)),
    )
    .await
}

async fn call_json<S>(app: &S, request: TestRequest, expected: StatusCode) -> Value
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = test::call_service(app, request.to_request()).await;
    assert_eq!(res.status(), expected);
    test::read_body_json(res).await
}

fn str_field<'a>(body: &'a Value, field: &str) -> &'a str {
    body[field]
        .as_str()
        .unwrap_or_else(|| panic!("{field} missing in {body}"))
}

async fn register_professional<S>(app: &S, pro: &Party) -> String
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let profile = call_json(
        app,
        pro.post(
            "/api/v1/professionals",
            &json!({
                "name": "Pat Pipes",
                "specialty": "Plumbing",
                "hourlyRate": 80.0,
                "serviceZipcodes": ["10001"],
                "phone": "555-0100"
            }),
        ),
        StatusCode::CREATED,
    )
    .await;
    str_field(&profile, "id").to_owned()
}

/// Register a professional and finish their payout onboarding.
///
/// Returns the profile id and the connected account id.
async fn onboarded_professional<S>(app: &S, market: &Marketplace, pro: &Party) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let professional_id = register_professional(app, pro).await;
    let connect = call_json(
        app,
        pro.post(
            &format!("/api/v1/professionals/{professional_id}/payout/connect"),
            &json!({}),
        ),
        StatusCode::OK,
    )
    .await;
    let account_id = str_field(&connect, "accountId").to_owned();
    market.gateway.complete_onboarding(&account_id);
    (professional_id, account_id)
}

async fn book<S>(app: &S, customer: &Party, professional_id: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let booking = call_json(
        app,
        customer.post(
            "/api/v1/bookings",
            &json!({
                "professionalId": professional_id,
                "serviceDescription": "Replace water heater",
                "customerName": "Casey Customer",
                "customerEmail": "casey@example.test",
                "customerPhone": "555-0199"
            }),
        ),
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(booking["paymentStatus"], "unpaid");
    str_field(&booking, "id").to_owned()
}

async fn cancel<S>(app: &S, customer: &Party, booking_id: &str)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let cancelled = call_json(
        app,
        customer.post(
            &format!("/api/v1/bookings/{booking_id}/status"),
            &json!({ "action": "cancel" }),
        ),
        StatusCode::OK,
    )
    .await;
    assert_eq!(cancelled["status"], "cancelled");
}

#[rstest]
#[actix_web::test]
async fn booking_is_confirmed_after_checkout_settles() {
    let market = marketplace();
    let app = init_app(&market).await;
    let pro = Party::new();
    let customer = Party::new();

    let (professional_id, account_id) = onboarded_professional(&app, &market, &pro).await;
    let status = call_json(
        &app,
        pro.get(&format!(
            "/api/v1/professionals/{professional_id}/payout/status"
        )),
        StatusCode::OK,
    )
    .await;
    assert_eq!(status["complete"], true);

    let booking_id = book(&app, &customer, &professional_id).await;

    let checkout = call_json(
        &app,
        customer.post(&format!("/api/v1/bookings/{booking_id}/payment"), &json!({})),
        StatusCode::OK,
    )
    .await;
    let session_id = str_field(&checkout, "sessionId").to_owned();
    assert!(str_field(&checkout, "url").ends_with(&session_id));

    let intents = market.gateway.intents();
    let [(_, intent)] = intents.as_slice() else {
        panic!("expected one payment intent, got {intents:?}");
    };
    assert_eq!(intent.amount, Money::from_unsigned_cents(16_000));
    assert_eq!(intent.application_fee, Money::from_unsigned_cents(1_600));
    assert_eq!(intent.destination_account, account_id);
    let checkouts = market.gateway.checkouts();
    assert!(checkouts.iter().all(|recorded| recorded
        .request
        .success_url
        .starts_with(PUBLIC_ORIGIN)));

    let unpaid = call_json(
        &app,
        customer.post(
            &format!("/api/v1/bookings/{booking_id}/payment/verify"),
            &json!({ "session_id": session_id }),
        ),
        StatusCode::OK,
    )
    .await;
    assert_eq!(unpaid, json!({ "success": false, "message": "Payment not completed" }));

    market.gateway.complete_checkout(&session_id);
    let verified = call_json(
        &app,
        customer.post(
            &format!("/api/v1/bookings/{booking_id}/payment/verify"),
            &json!({ "session_id": session_id }),
        ),
        StatusCode::OK,
    )
    .await;
    assert_eq!(verified["success"], true);

    let detail = call_json(
        &app,
        customer.get(&format!("/api/v1/bookings/{booking_id}")),
        StatusCode::OK,
    )
    .await;
    assert_eq!(detail["status"], "confirmed");
    assert_eq!(detail["paymentStatus"], "paid");
    assert_eq!(detail["amount"], "160.00");
    assert_eq!(detail["platformFee"], "16.00");
    assert_eq!(detail["professionalPhone"], "555-0100");

    let repeat = call_json(
        &app,
        customer.post(&format!("/api/v1/bookings/{booking_id}/payment"), &json!({})),
        StatusCode::CONFLICT,
    )
    .await;
    assert_eq!(repeat["code"], "conflict");
}

#[rstest]
#[actix_web::test]
async fn payment_waits_for_payout_onboarding() {
    let market = marketplace();
    let app = init_app(&market).await;
    let pro = Party::new();
    let customer = Party::new();

    let professional_id = register_professional(&app, &pro).await;
    let booking_id = book(&app, &customer, &professional_id).await;

    let refused = call_json(
        &app,
        customer.post(
            &format!("/api/v1/bookings/{booking_id}/payment"),
            &json!({}),
        ),
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
    assert_eq!(refused["code"], "precondition_failed");
    assert!(market.gateway.intents().is_empty());
}

#[rstest]
#[actix_web::test]
async fn cancelled_booking_cannot_be_paid() {
    let market = marketplace();
    let app = init_app(&market).await;
    let pro = Party::new();
    let customer = Party::new();

    let (professional_id, _) = onboarded_professional(&app, &market, &pro).await;
    let booking_id = book(&app, &customer, &professional_id).await;
    cancel(&app, &customer, &booking_id).await;

    let refused = call_json(
        &app,
        customer.post(&format!("/api/v1/bookings/{booking_id}/payment"), &json!({})),
        StatusCode::CONFLICT,
    )
    .await;
    assert_eq!(refused["code"], "conflict");
    assert!(market.gateway.intents().is_empty());
    assert!(market.gateway.checkouts().is_empty());
}

#[rstest]
#[actix_web::test]
async fn checkout_settling_after_cancellation_leaves_booking_unpaid() {
    let market = marketplace();
    let app = init_app(&market).await;
    let pro = Party::new();
    let customer = Party::new();

    let (professional_id, _) = onboarded_professional(&app, &market, &pro).await;
    let booking_id = book(&app, &customer, &professional_id).await;
    let checkout = call_json(
        &app,
        customer.post(&format!("/api/v1/bookings/{booking_id}/payment"), &json!({})),
        StatusCode::OK,
    )
    .await;
    let session_id = str_field(&checkout, "sessionId").to_owned();

    cancel(&app, &customer, &booking_id).await;
    market.gateway.complete_checkout(&session_id);

    let refused = call_json(
        &app,
        customer.post(
            &format!("/api/v1/bookings/{booking_id}/payment/verify"),
            &json!({ "session_id": session_id }),
        ),
        StatusCode::CONFLICT,
    )
    .await;
    assert_eq!(refused["code"], "conflict");

    let detail = call_json(
        &app,
        customer.get(&format!("/api/v1/bookings/{booking_id}")),
        StatusCode::OK,
    )
    .await;
    assert_eq!(detail["status"], "cancelled");
    assert_eq!(detail["paymentStatus"], "pending");
}
