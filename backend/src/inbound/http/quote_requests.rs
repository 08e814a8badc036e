//! Quote request HTTP handlers.
//!
//! ```text
//! POST /api/v1/quote-requests
//! GET /api/v1/quote-requests/mine
//! GET /api/v1/quote-requests/{id}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{QuoteRequestView, SubmitQuoteRequest};
use crate::domain::{
    CustomerContact, Error, MAX_RESPONSES_PER_REQUEST, QuoteRequest, QuoteRequestDraft,
    QuoteRequestId, QuoteRequestValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Caller;
use crate::inbound::http::quote_responses::QuoteResponseBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, parse_id};

/// Request payload for posting a quote request.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuoteRequestBody {
    #[schema(example = "Plumbing")]
    pub service_category: Option<String>,
    pub project_description: Option<String>,
    #[schema(example = "10001")]
    pub zipcode: Option<String>,
    pub timeline: Option<String>,
    pub budget: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Response payload for a posted quote request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuoteRequestResponseBody {
    pub success: bool,
    #[schema(format = "uuid")]
    pub quote_request_id: String,
    /// Matching professionals a notification was queued for.
    pub professionals_notified: usize,
}

/// Contact details, shown to the request's owner only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerContactBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A quote request as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub service_category: String,
    pub project_description: String,
    pub zipcode: String,
    pub timeline: Option<String>,
    pub budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<CustomerContactBody>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl QuoteRequestBody {
    fn new(request: QuoteRequest, include_contact: bool) -> Self {
        let CustomerContact { name, email, phone } = request.contact;
        Self {
            id: request.id.to_string(),
            service_category: request.service_category,
            project_description: request.description,
            zipcode: request.zipcode,
            timeline: request.timeline,
            budget: request.budget,
            contact: include_contact.then_some(CustomerContactBody { name, email, phone }),
            created_at: request.created_at.to_rfc3339(),
        }
    }
}

/// A quote request together with what the caller may see of its responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestDetailBody {
    pub request: QuoteRequestBody,
    /// Every response in arrival order; present for the owner only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<QuoteResponseBody>>,
    pub response_count: usize,
    pub remaining_slots: usize,
    /// The calling professional's own bid, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub own_response: Option<QuoteResponseBody>,
}

impl From<QuoteRequestView> for QuoteRequestDetailBody {
    fn from(value: QuoteRequestView) -> Self {
        match value {
            QuoteRequestView::Owner { request, responses } => {
                let response_count = responses.len();
                Self {
                    request: QuoteRequestBody::new(request, true),
                    responses: Some(responses.into_iter().map(QuoteResponseBody::from).collect()),
                    response_count,
                    remaining_slots: usize::from(MAX_RESPONSES_PER_REQUEST)
                        .saturating_sub(response_count),
                    own_response: None,
                }
            }
            QuoteRequestView::Professional {
                request,
                response_count,
                remaining_slots,
                own_response,
            } => Self {
                request: QuoteRequestBody::new(request, false),
                responses: None,
                response_count,
                remaining_slots,
                own_response: own_response.map(QuoteResponseBody::from),
            },
        }
    }
}

fn parse_draft(payload: SubmitQuoteRequestBody) -> Result<QuoteRequestDraft, Error> {
    QuoteRequestDraft::new(
        payload.service_category.as_deref().unwrap_or_default(),
        payload.project_description.as_deref().unwrap_or_default(),
        payload.zipcode.as_deref().unwrap_or_default(),
        payload.timeline,
        payload.budget,
        CustomerContact {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
        },
    )
    .map_err(|err| {
        let field = match err {
            QuoteRequestValidationError::EmptyCategory => FieldName::new("serviceCategory"),
            QuoteRequestValidationError::EmptyDescription => FieldName::new("projectDescription"),
            QuoteRequestValidationError::EmptyZipcode => FieldName::new("zipcode"),
        };
        invalid_field_error(field, err.to_string())
    })
}

/// Post a quote request and notify matching professionals.
#[utoipa::path(
    post,
    path = "/api/v1/quote-requests",
    request_body = SubmitQuoteRequestBody,
    responses(
        (status = 200, description = "Request stored", body = SubmitQuoteRequestResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["quotes"],
    operation_id = "submitQuoteRequest",
    security(("BearerToken" = []))
)]
#[post("/quote-requests")]
pub async fn submit_quote_request(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<SubmitQuoteRequestBody>,
) -> ApiResult<web::Json<SubmitQuoteRequestResponseBody>> {
    let draft = parse_draft(payload.into_inner())?;
    let response = state
        .quote_requests
        .submit(SubmitQuoteRequest {
            customer_id: caller.id(),
            draft,
        })
        .await?;
    Ok(web::Json(SubmitQuoteRequestResponseBody {
        success: true,
        quote_request_id: response.quote_request_id.to_string(),
        professionals_notified: response.professionals_notified,
    }))
}

/// List the caller's own quote requests, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/quote-requests/mine",
    responses(
        (status = 200, description = "Caller's requests", body = [QuoteRequestBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["quotes"],
    operation_id = "listMyQuoteRequests",
    security(("BearerToken" = []))
)]
#[get("/quote-requests/mine")]
pub async fn list_my_quote_requests(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<QuoteRequestBody>>> {
    let requests = state.quote_requests_query.list_mine(&caller.id()).await?;
    Ok(web::Json(
        requests
            .into_iter()
            .map(|request| QuoteRequestBody::new(request, true))
            .collect(),
    ))
}

/// Fetch one quote request as the owner or as a professional.
#[utoipa::path(
    get,
    path = "/api/v1/quote-requests/{id}",
    params(("id" = String, Path, description = "Quote request id", format = "uuid")),
    responses(
        (status = 200, description = "Request detail", body = QuoteRequestDetailBody),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller may not view this request", body = ErrorSchema),
        (status = 404, description = "Quote request not found", body = ErrorSchema)
    ),
    tags = ["quotes"],
    operation_id = "getQuoteRequest",
    security(("BearerToken" = []))
)]
#[get("/quote-requests/{id}")]
pub async fn get_quote_request(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<QuoteRequestDetailBody>> {
    let id: QuoteRequestId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let view = state.quote_requests_query.get(&caller.id(), &id).await?;
    Ok(web::Json(QuoteRequestDetailBody::from(view)))
}
