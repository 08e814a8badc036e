//! Tests for quote response HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test};
use chrono::TimeDelta;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{
    MockQuoteLifecycleCommand, MockQuoteResponseCommand, SubmitQuoteResponseResponse,
};
use crate::domain::test_fixtures::fixture_timestamp;
use crate::domain::{Error, Money, NewQuoteResponse, ProfessionalId, ResponseOrder};
use crate::inbound::http::state::HttpStatePorts;
use crate::inbound::http::test_utils::{AuthenticatedRequest, caller, mock_ports, state_from};

async fn call(ports: HttpStatePorts, req: test::TestRequest) -> actix_web::dev::ServiceResponse {
    let app = test::init_service(
        App::new().app_data(web::Data::new(state_from(ports))).service(
            web::scope("/api/v1")
                .service(submit_quote_response)
                .service(set_quote_response_status),
        ),
    )
    .await;
    test::call_service(&app, req.to_request()).await
}

fn stored_response(status: QuoteResponseStatus) -> QuoteResponse {
    let mut response = NewQuoteResponse {
        id: QuoteResponseId::random(),
        quote_request_id: QuoteRequestId::random(),
        professional_id: ProfessionalId::random(),
        quote_amount: Money::from_unsigned_cents(16_000),
        quote_details: Some("Two hours on site".to_owned()),
        created_at: fixture_timestamp(),
    }
    .into_response(ResponseOrder::new(2).expect("valid order"));
    response.status = status;
    response
}

#[rstest]
#[actix_web::test]
async fn submits_a_bid_in_cents() {
    let (user_id, auth) = caller();
    let request_id = QuoteRequestId::random();
    let response_id = QuoteResponseId::random();
    let mut command = MockQuoteResponseCommand::new();
    command
        .expect_submit()
        .withf(move |request| {
            request.user_id == user_id
                && request.quote_request_id == request_id
                && request.quote_amount.cents() == 16_050
        })
        .times(1)
        .return_once(move |_| {
            Ok(SubmitQuoteResponseResponse {
                quote_response_id: response_id,
                response_order: ResponseOrder::new(1).expect("valid order"),
            })
        });
    let mut ports = mock_ports();
    ports.quote_responses = Arc::new(command);

    let res = call(
        ports,
        test::TestRequest::post()
            .uri("/api/v1/quote-responses")
            .bearer(&auth)
            .set_json(json!({
                "quoteRequestId": request_id.to_string(),
                "quoteAmount": 160.5,
                "quoteDetails": "Parts included"
            })),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({
            "success": true,
            "quoteResponseId": response_id.to_string(),
            "responseOrder": 1
        })
    );
}

#[rstest]
#[actix_web::test]
async fn full_requests_answer_400_with_the_cap_message() {
    let (_, auth) = caller();
    let mut command = MockQuoteResponseCommand::new();
    command
        .expect_submit()
        .times(1)
        .return_once(|_| Err(Error::capacity_reached("This request already has 3 quotes")));
    let mut ports = mock_ports();
    ports.quote_responses = Arc::new(command);

    let res = call(
        ports,
        test::TestRequest::post()
            .uri("/api/v1/quote-responses")
            .bearer(&auth)
            .set_json(json!({
                "quoteRequestId": QuoteRequestId::random().to_string(),
                "quoteAmount": 99
            })),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "This request already has 3 quotes");
}

#[rstest]
#[case(json!({"quoteAmount": 10}), "quoteRequestId")]
#[case(json!({"quoteRequestId": "abc", "quoteAmount": 10}), "quoteRequestId")]
#[case(json!({"quoteRequestId": "00000000-0000-0000-0000-000000000001"}), "quoteAmount")]
#[actix_web::test]
async fn malformed_bids_never_reach_the_service(#[case] payload: Value, #[case] field: &str) {
    let (_, auth) = caller();
    let res = call(
        mock_ports(),
        test::TestRequest::post()
            .uri("/api/v1/quote-responses")
            .bearer(&auth)
            .set_json(payload),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], field);
}

#[rstest]
#[actix_web::test]
async fn unauthenticated_bids_are_rejected() {
    let res = call(
        mock_ports(),
        test::TestRequest::post()
            .uri("/api/v1/quote-responses")
            .set_json(json!({"quoteRequestId": QuoteRequestId::random().to_string(), "quoteAmount": 5})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn accepting_reports_the_confirmation_deadline() {
    let (user_id, auth) = caller();
    let mut accepted = stored_response(QuoteResponseStatus::Accepted);
    accepted.accepted_at = Some(fixture_timestamp());
    let response_id = accepted.id;
    let deadline = fixture_timestamp() + TimeDelta::minutes(10);
    let mut lifecycle = MockQuoteLifecycleCommand::new();
    lifecycle
        .expect_set_response_status()
        .withf(move |request| {
            request.customer_id == user_id
                && request.quote_response_id == response_id
                && request.status == QuoteResponseStatus::Accepted
        })
        .times(1)
        .return_once(move |_| {
            Ok(SetResponseStatusResponse {
                response: accepted,
                changed: true,
                confirmation_deadline: Some(deadline),
            })
        });
    let mut ports = mock_ports();
    ports.quote_lifecycle = Arc::new(lifecycle);

    let res = call(
        ports,
        test::TestRequest::post()
            .uri(&format!("/api/v1/quote-responses/{response_id}/status"))
            .bearer(&auth)
            .set_json(json!({"status": "accepted"})),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["changed"], true);
    assert_eq!(body["response"]["status"], "accepted");
    assert_eq!(body["response"]["quoteAmount"], "160.00");
    assert_eq!(body["confirmationDeadline"], deadline.to_rfc3339());
}

#[rstest]
#[actix_web::test]
async fn declined_responses_cannot_be_accepted() {
    let (_, auth) = caller();
    let mut lifecycle = MockQuoteLifecycleCommand::new();
    lifecycle
        .expect_set_response_status()
        .times(1)
        .return_once(|_| Err(Error::conflict("Quote response is already declined")));
    let mut ports = mock_ports();
    ports.quote_lifecycle = Arc::new(lifecycle);

    let res = call(
        ports,
        test::TestRequest::post()
            .uri(&format!(
                "/api/v1/quote-responses/{}/status",
                QuoteResponseId::random()
            ))
            .bearer(&auth)
            .set_json(json!({"status": "accepted"})),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[rstest]
#[actix_web::test]
async fn unknown_statuses_are_invalid() {
    let (_, auth) = caller();
    let res = call(
        mock_ports(),
        test::TestRequest::post()
            .uri(&format!(
                "/api/v1/quote-responses/{}/status",
                QuoteResponseId::random()
            ))
            .bearer(&auth)
            .set_json(json!({"status": "maybe"})),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "status");
}
