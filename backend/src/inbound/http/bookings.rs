//! Booking HTTP handlers.
//!
//! ```text
//! POST /api/v1/bookings
//! GET /api/v1/bookings/mine
//! GET /api/v1/bookings/assigned
//! GET /api/v1/bookings/{id}
//! POST /api/v1/bookings/{id}/status
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{BookingActionRequest, BookingView, CreateBookingRequest};
use crate::domain::{Booking, BookingAction, BookingDetails, BookingId, Error, ProfessionalId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Caller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_id, parse_optional_date, require_text,
};

/// Request payload for booking a professional directly.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequestBody {
    #[schema(format = "uuid")]
    pub professional_id: Option<String>,
    pub service_description: Option<String>,
    #[schema(format = "date", example = "2026-11-02")]
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub notes: Option<String>,
}

/// A booking as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub professional_id: String,
    #[schema(format = "uuid")]
    pub customer_id: String,
    pub service_description: String,
    #[schema(format = "date")]
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub notes: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = "unpaid")]
    pub payment_status: String,
    /// Total charged, set once a payment has been started.
    #[schema(example = "160.00")]
    pub amount: Option<String>,
    #[schema(example = "16.00")]
    pub platform_fee: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Booking> for BookingBody {
    fn from(value: Booking) -> Self {
        let BookingDetails {
            service_description,
            preferred_date,
            preferred_time,
            customer_name,
            customer_email,
            customer_phone,
            customer_address,
            notes,
        } = value.details;
        Self {
            id: value.id.to_string(),
            professional_id: value.professional_id.to_string(),
            customer_id: value.customer_id.to_string(),
            service_description,
            preferred_date: preferred_date.map(|date| date.format("%Y-%m-%d").to_string()),
            preferred_time,
            customer_name,
            customer_email,
            customer_phone,
            customer_address,
            notes,
            status: value.status.as_str().to_owned(),
            payment_status: value.payment_status.as_str().to_owned(),
            amount: value.amount.map(|amount| amount.to_string()),
            platform_fee: value.platform_fee.map(|fee| fee.to_string()),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// A booking with the professional's display details.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetailBody {
    #[serde(flatten)]
    pub booking: BookingBody,
    pub professional_name: String,
    /// Revealed to the customer once the booking is paid.
    pub professional_phone: Option<String>,
}

impl From<BookingView> for BookingDetailBody {
    fn from(value: BookingView) -> Self {
        Self {
            booking: BookingBody::from(value.booking),
            professional_name: value.professional_name,
            professional_phone: value.professional_phone,
        }
    }
}

/// Request payload for a booking status action.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingActionRequestBody {
    #[schema(example = "confirm")]
    pub action: Option<String>,
}

fn parse_details(
    payload: CreateBookingRequestBody,
) -> Result<(ProfessionalId, BookingDetails), Error> {
    let raw_professional =
        require_text(payload.professional_id, FieldName::new("professionalId"))?;
    let professional_id = parse_id(&raw_professional, FieldName::new("professionalId"))?;
    let details = BookingDetails {
        service_description: payload.service_description.unwrap_or_default(),
        preferred_date: parse_optional_date(
            payload.preferred_date,
            FieldName::new("preferredDate"),
        )?,
        preferred_time: payload.preferred_time,
        customer_name: payload.customer_name.unwrap_or_default(),
        customer_email: payload.customer_email.unwrap_or_default(),
        customer_phone: payload.customer_phone.unwrap_or_default(),
        customer_address: payload.customer_address,
        notes: payload.notes,
    };
    Ok((professional_id, details))
}

/// Book a professional directly.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingRequestBody,
    responses(
        (status = 201, description = "Booking created", body = BookingBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Professional not found", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "createBooking",
    security(("BearerToken" = []))
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateBookingRequestBody>,
) -> ApiResult<HttpResponse> {
    let (professional_id, details) = parse_details(payload.into_inner())?;
    let booking = state
        .bookings
        .create(CreateBookingRequest {
            customer_id: caller.id(),
            professional_id,
            details,
        })
        .await?;
    Ok(HttpResponse::Created().json(BookingBody::from(booking)))
}

/// List bookings the caller made as a customer, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/mine",
    responses(
        (status = 200, description = "Caller's bookings", body = [BookingBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "listMyBookings",
    security(("BearerToken" = []))
)]
#[get("/bookings/mine")]
pub async fn list_my_bookings(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<BookingBody>>> {
    let bookings = state.bookings_query.list_for_customer(&caller.id()).await?;
    Ok(web::Json(bookings.into_iter().map(BookingBody::from).collect()))
}

/// List bookings assigned to the caller's professional profile.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/assigned",
    responses(
        (status = 200, description = "Assigned bookings", body = [BookingBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not a professional", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "listAssignedBookings",
    security(("BearerToken" = []))
)]
#[get("/bookings/assigned")]
pub async fn list_assigned_bookings(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<BookingBody>>> {
    let bookings = state.bookings_query.list_assigned(&caller.id()).await?;
    Ok(web::Json(bookings.into_iter().map(BookingBody::from).collect()))
}

/// Fetch a booking the caller is party to.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    params(("id" = String, Path, description = "Booking id", format = "uuid")),
    responses(
        (status = 200, description = "Booking detail", body = BookingDetailBody),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Booking not found", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "getBooking",
    security(("BearerToken" = []))
)]
#[get("/bookings/{id}")]
pub async fn get_booking(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookingDetailBody>> {
    let id: BookingId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let view = state.bookings_query.get(&caller.id(), &id).await?;
    Ok(web::Json(BookingDetailBody::from(view)))
}

/// Apply a status action (`confirm`, `complete`, `confirm_completion`,
/// `cancel`) to a booking.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/status",
    params(("id" = String, Path, description = "Booking id", format = "uuid")),
    request_body = BookingActionRequestBody,
    responses(
        (status = 200, description = "Updated booking", body = BookingBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Action not available to the caller", body = ErrorSchema),
        (status = 404, description = "Booking not found", body = ErrorSchema),
        (status = 409, description = "Booking is not in a state that allows the action", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "applyBookingAction",
    security(("BearerToken" = []))
)]
#[post("/bookings/{id}/status")]
pub async fn apply_booking_action(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<BookingActionRequestBody>,
) -> ApiResult<web::Json<BookingBody>> {
    let booking_id: BookingId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let raw_action = require_text(payload.into_inner().action, FieldName::new("action"))?;
    let action = BookingAction::from_str(raw_action.trim())
        .map_err(|err| invalid_field_error(FieldName::new("action"), err.to_string()))?;

    let booking = state
        .bookings
        .apply_action(BookingActionRequest {
            user_id: caller.id(),
            booking_id,
            action,
        })
        .await?;
    Ok(web::Json(BookingBody::from(booking)))
}

#[cfg(test)]
#[path = "bookings_tests.rs"]
mod tests;
