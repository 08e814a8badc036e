//! Quote response HTTP handlers.
//!
//! ```text
//! POST /api/v1/quote-responses
//! POST /api/v1/quote-responses/{id}/status
//! ```

use std::str::FromStr;

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    SetResponseStatusRequest, SetResponseStatusResponse, SubmitQuoteResponseRequest,
};
use crate::domain::{QuoteRequestId, QuoteResponse, QuoteResponseId, QuoteResponseStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Caller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_amount, parse_id, require_text,
};

/// Request payload for bidding on a quote request.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuoteResponseRequestBody {
    #[schema(format = "uuid")]
    pub quote_request_id: Option<String>,
    /// Quoted price in major currency units.
    #[schema(example = 160.0)]
    pub quote_amount: Option<f64>,
    pub quote_details: Option<String>,
}

/// Response payload for a stored bid.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuoteResponseResponseBody {
    pub success: bool,
    #[schema(format = "uuid")]
    pub quote_response_id: String,
    /// Position among the request's responses, 1 to 3.
    pub response_order: u8,
}

/// A professional's bid as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub quote_request_id: String,
    #[schema(format = "uuid")]
    pub professional_id: String,
    #[schema(example = "160.00")]
    pub quote_amount: String,
    pub quote_details: Option<String>,
    pub response_order: u8,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(format = "date-time")]
    pub accepted_at: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<QuoteResponse> for QuoteResponseBody {
    fn from(value: QuoteResponse) -> Self {
        Self {
            id: value.id.to_string(),
            quote_request_id: value.quote_request_id.to_string(),
            professional_id: value.professional_id.to_string(),
            quote_amount: value.quote_amount.to_string(),
            quote_details: value.quote_details,
            response_order: value.response_order.get(),
            status: value.status.as_str().to_owned(),
            accepted_at: value.accepted_at.map(|at| at.to_rfc3339()),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Request payload for a customer's decision.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetResponseStatusRequestBody {
    #[schema(example = "accepted")]
    pub status: Option<String>,
}

/// Outcome of a customer's decision.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetResponseStatusResponseBody {
    pub success: bool,
    /// False when the response already carried the requested status.
    pub changed: bool,
    pub response: QuoteResponseBody,
    /// When the professional's confirmation window closes.
    #[schema(format = "date-time")]
    pub confirmation_deadline: Option<String>,
}

impl From<SetResponseStatusResponse> for SetResponseStatusResponseBody {
    fn from(value: SetResponseStatusResponse) -> Self {
        Self {
            success: true,
            changed: value.changed,
            response: QuoteResponseBody::from(value.response),
            confirmation_deadline: value.confirmation_deadline.map(|at| at.to_rfc3339()),
        }
    }
}

/// Submit a bid on a quote request as the calling professional.
///
/// Only the first three bids per request are accepted.
#[utoipa::path(
    post,
    path = "/api/v1/quote-responses",
    request_body = SubmitQuoteResponseRequestBody,
    responses(
        (status = 200, description = "Bid stored", body = SubmitQuoteResponseResponseBody),
        (status = 400, description = "Invalid request or request already has 3 quotes", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not a professional", body = ErrorSchema),
        (status = 404, description = "Quote request not found", body = ErrorSchema),
        (status = 409, description = "Caller already responded", body = ErrorSchema)
    ),
    tags = ["quotes"],
    operation_id = "submitQuoteResponse",
    security(("BearerToken" = []))
)]
#[post("/quote-responses")]
pub async fn submit_quote_response(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<SubmitQuoteResponseRequestBody>,
) -> ApiResult<web::Json<SubmitQuoteResponseResponseBody>> {
    let payload = payload.into_inner();
    let raw_request_id = require_text(payload.quote_request_id, FieldName::new("quoteRequestId"))?;
    let quote_request_id: QuoteRequestId =
        parse_id(&raw_request_id, FieldName::new("quoteRequestId"))?;
    let quote_amount = parse_amount(payload.quote_amount, FieldName::new("quoteAmount"))?;

    let response = state
        .quote_responses
        .submit(SubmitQuoteResponseRequest {
            user_id: caller.id(),
            quote_request_id,
            quote_amount,
            quote_details: payload.quote_details,
        })
        .await?;

    Ok(web::Json(SubmitQuoteResponseResponseBody {
        success: true,
        quote_response_id: response.quote_response_id.to_string(),
        response_order: response.response_order.get(),
    }))
}

/// Accept or decline a bid on one of the caller's quote requests.
#[utoipa::path(
    post,
    path = "/api/v1/quote-responses/{id}/status",
    params(("id" = String, Path, description = "Quote response id", format = "uuid")),
    request_body = SetResponseStatusRequestBody,
    responses(
        (status = 200, description = "Decision recorded", body = SetResponseStatusResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller does not own the request", body = ErrorSchema),
        (status = 404, description = "Quote response not found", body = ErrorSchema),
        (status = 409, description = "Response was already decided differently", body = ErrorSchema)
    ),
    tags = ["quotes"],
    operation_id = "setQuoteResponseStatus",
    security(("BearerToken" = []))
)]
#[post("/quote-responses/{id}/status")]
pub async fn set_quote_response_status(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<SetResponseStatusRequestBody>,
) -> ApiResult<web::Json<SetResponseStatusResponseBody>> {
    let quote_response_id: QuoteResponseId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let raw_status = require_text(payload.into_inner().status, FieldName::new("status"))?;
    let status = QuoteResponseStatus::from_str(raw_status.trim())
        .map_err(|err| invalid_field_error(FieldName::new("status"), err.to_string()))?;

    let outcome = state
        .quote_lifecycle
        .set_response_status(SetResponseStatusRequest {
            customer_id: caller.id(),
            quote_response_id,
            status,
        })
        .await?;

    Ok(web::Json(SetResponseStatusResponseBody::from(outcome)))
}

#[cfg(test)]
#[path = "quote_responses_tests.rs"]
mod tests;
