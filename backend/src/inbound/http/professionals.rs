//! Professional profile HTTP handlers.
//!
//! ```text
//! POST /api/v1/professionals
//! GET /api/v1/professionals/me
//! GET /api/v1/professionals/{id}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::RegisterProfessionalRequest;
use crate::domain::{
    Error, Professional, ProfessionalDraft, ProfessionalId, ProfessionalValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Caller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_amount, parse_id, require_text,
};

/// Request payload for registering as a professional.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProfessionalRequestBody {
    pub name: Option<String>,
    pub specialty: Option<String>,
    /// Hourly rate in major currency units.
    #[schema(example = 80.0)]
    pub hourly_rate: Option<f64>,
    pub service_zipcodes: Option<Vec<String>>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

/// Public professional listing.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalProfileBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub specialty: String,
    #[schema(example = "80.00")]
    pub hourly_rate: String,
    pub service_zipcodes: Vec<String>,
    pub bio: Option<String>,
    pub verified: bool,
    pub is_sponsored: bool,
    #[schema(format = "date-time")]
    pub sponsored_until: Option<String>,
}

/// The caller's own profile, including contact and payout state.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyProfessionalBody {
    #[serde(flatten)]
    pub profile: ProfessionalProfileBody,
    pub phone: String,
    pub has_payout_account: bool,
    pub payout_onboarding_complete: bool,
}

impl From<&Professional> for ProfessionalProfileBody {
    fn from(value: &Professional) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
            specialty: value.specialty.clone(),
            hourly_rate: value.hourly_rate.to_string(),
            service_zipcodes: value.service_zipcodes.clone(),
            bio: value.bio.clone(),
            verified: value.verified,
            is_sponsored: value.is_sponsored,
            sponsored_until: value.sponsored_until.map(|at| at.to_rfc3339()),
        }
    }
}

impl From<Professional> for MyProfessionalBody {
    fn from(value: Professional) -> Self {
        Self {
            profile: ProfessionalProfileBody::from(&value),
            has_payout_account: value.payout_account_id.is_some(),
            payout_onboarding_complete: value.payout_onboarding_complete,
            phone: value.phone,
        }
    }
}

fn validation_field(error: &ProfessionalValidationError) -> FieldName {
    match error {
        ProfessionalValidationError::EmptyName => FieldName::new("name"),
        ProfessionalValidationError::EmptySpecialty => FieldName::new("specialty"),
        ProfessionalValidationError::ZeroRate => FieldName::new("hourlyRate"),
        ProfessionalValidationError::NoZipcodes => FieldName::new("serviceZipcodes"),
        ProfessionalValidationError::EmptyPhone => FieldName::new("phone"),
    }
}

fn parse_draft(payload: RegisterProfessionalRequestBody) -> Result<ProfessionalDraft, Error> {
    let name = require_text(payload.name, FieldName::new("name"))?;
    let specialty = require_text(payload.specialty, FieldName::new("specialty"))?;
    let hourly_rate = parse_amount(payload.hourly_rate, FieldName::new("hourlyRate"))?;
    let phone = require_text(payload.phone, FieldName::new("phone"))?;
    ProfessionalDraft::new(
        &name,
        &specialty,
        hourly_rate,
        payload.service_zipcodes.unwrap_or_default(),
        &phone,
        payload.bio,
    )
    .map_err(|err| invalid_field_error(validation_field(&err), err.to_string()))
}

/// Register the caller as a professional.
#[utoipa::path(
    post,
    path = "/api/v1/professionals",
    request_body = RegisterProfessionalRequestBody,
    responses(
        (status = 201, description = "Profile created", body = MyProfessionalBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 409, description = "Caller already has a profile", body = ErrorSchema)
    ),
    tags = ["professionals"],
    operation_id = "registerProfessional",
    security(("BearerToken" = []))
)]
#[post("/professionals")]
pub async fn register_professional(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<RegisterProfessionalRequestBody>,
) -> ApiResult<HttpResponse> {
    let draft = parse_draft(payload.into_inner())?;
    let professional = state
        .professionals
        .register(RegisterProfessionalRequest {
            user_id: caller.id(),
            draft,
        })
        .await?;
    Ok(HttpResponse::Created().json(MyProfessionalBody::from(professional)))
}

/// Fetch the caller's own professional profile.
#[utoipa::path(
    get,
    path = "/api/v1/professionals/me",
    responses(
        (status = 200, description = "Caller's profile", body = MyProfessionalBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Caller is not a professional", body = ErrorSchema)
    ),
    tags = ["professionals"],
    operation_id = "getMyProfessional",
    security(("BearerToken" = []))
)]
#[get("/professionals/me")]
pub async fn get_my_professional(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<MyProfessionalBody>> {
    let professional = state.professionals_query.get_mine(&caller.id()).await?;
    Ok(web::Json(MyProfessionalBody::from(professional)))
}

/// Fetch a professional's public listing.
#[utoipa::path(
    get,
    path = "/api/v1/professionals/{id}",
    params(("id" = String, Path, description = "Professional id", format = "uuid")),
    responses(
        (status = 200, description = "Public profile", body = ProfessionalProfileBody),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "Professional not found", body = ErrorSchema)
    ),
    tags = ["professionals"],
    operation_id = "getProfessional",
    security([])
)]
#[get("/professionals/{id}")]
pub async fn get_professional(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfessionalProfileBody>> {
    let id: ProfessionalId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let professional = state.professionals_query.get_profile(&id).await?;
    Ok(web::Json(ProfessionalProfileBody::from(&professional)))
}
