//! Notification inbox HTTP handlers.
//!
//! ```text
//! GET /api/v1/notifications
//! POST /api/v1/notifications/{id}/read
//! POST /api/v1/notifications/read-all
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Notification, NotificationId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Caller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// A notification as returned to clients and pushed over the websocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(example = "New Quote Request")]
    pub title: String,
    pub message: String,
    #[schema(example = "/quote-request/3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub link: Option<String>,
    pub read: bool,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Notification> for NotificationBody {
    fn from(value: Notification) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            message: value.message,
            link: value.link,
            read: value.read,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Count of notifications flipped to read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadBody {
    pub updated: u64,
}

/// List the caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Caller's notifications", body = [NotificationBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications",
    security(("BearerToken" = []))
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<NotificationBody>>> {
    let notifications = state.notifications.list(&caller.id()).await?;
    Ok(web::Json(
        notifications.into_iter().map(NotificationBody::from).collect(),
    ))
}

/// Mark every unread notification as read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Notifications updated", body = MarkAllReadBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead",
    security(("BearerToken" = []))
)]
#[post("/notifications/read-all")]
pub async fn mark_all_notifications_read(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<MarkAllReadBody>> {
    let updated = state.notifications.mark_all_read(&caller.id()).await?;
    Ok(web::Json(MarkAllReadBody { updated }))
}

/// Mark one notification as read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id", format = "uuid")),
    responses(
        (status = 204, description = "Notification marked read"),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Notification not found", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead",
    security(("BearerToken" = []))
)]
#[post("/notifications/{id}/read")]
pub async fn mark_notification_read(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: NotificationId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    state.notifications.mark_read(&caller.id(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
