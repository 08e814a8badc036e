//! Payout onboarding HTTP handlers.
//!
//! ```text
//! POST /api/v1/professionals/{id}/payout/connect
//! GET /api/v1/professionals/{id}/payout/status
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ProfessionalId;
use crate::domain::ports::ConnectPayoutRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{Caller, RequestOrigin};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Hosted onboarding page for the professional's payout account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectPayoutResponseBody {
    pub url: String,
    pub account_id: String,
}

/// Whether the payout account can receive transfers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct PayoutStatusBody {
    pub complete: bool,
}

/// Create or reuse the professional's payout account and return an
/// onboarding link.
#[utoipa::path(
    post,
    path = "/api/v1/professionals/{id}/payout/connect",
    params(("id" = String, Path, description = "Professional id", format = "uuid")),
    responses(
        (status = 200, description = "Onboarding link", body = ConnectPayoutResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller does not own the profile", body = ErrorSchema),
        (status = 404, description = "Professional not found", body = ErrorSchema),
        (status = 502, description = "Payment processor error", body = ErrorSchema)
    ),
    tags = ["payouts"],
    operation_id = "connectPayoutAccount",
    security(("BearerToken" = []))
)]
#[post("/professionals/{id}/payout/connect")]
pub async fn connect_payout_account(
    state: web::Data<HttpState>,
    caller: Caller,
    origin: RequestOrigin,
    path: web::Path<String>,
) -> ApiResult<web::Json<ConnectPayoutResponseBody>> {
    let professional_id: ProfessionalId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let connected = state
        .payouts
        .connect(ConnectPayoutRequest {
            user: caller.into_user(),
            professional_id,
            origin: origin.into_inner(),
        })
        .await?;
    Ok(web::Json(ConnectPayoutResponseBody {
        url: connected.url,
        account_id: connected.account_id,
    }))
}

/// Refresh and report the professional's payout onboarding state.
#[utoipa::path(
    get,
    path = "/api/v1/professionals/{id}/payout/status",
    params(("id" = String, Path, description = "Professional id", format = "uuid")),
    responses(
        (status = 200, description = "Onboarding state", body = PayoutStatusBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller does not own the profile", body = ErrorSchema),
        (status = 404, description = "Professional not found", body = ErrorSchema),
        (status = 502, description = "Payment processor error", body = ErrorSchema)
    ),
    tags = ["payouts"],
    operation_id = "checkPayoutStatus",
    security(("BearerToken" = []))
)]
#[get("/professionals/{id}/payout/status")]
pub async fn check_payout_status(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<PayoutStatusBody>> {
    let professional_id: ProfessionalId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let status = state
        .payouts
        .check_status(&caller.id(), &professional_id)
        .await?;
    Ok(web::Json(PayoutStatusBody {
        complete: status.complete,
    }))
}
