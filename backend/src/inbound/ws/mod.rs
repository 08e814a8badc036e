//! WebSocket inbound adapter streaming notifications to signed-in clients.
//!
//! ```text
//! GET /ws/notifications?token=<bearer>
//! ```
//!
//! Browsers cannot attach an `Authorization` header to an upgrade request,
//! so the bearer token travels in the query string. The upgrade is refused
//! unless the `Origin` header is on the configured allow-list.

use actix_web::http::header::{HeaderValue, ORIGIN};
use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::domain::{BearerToken, Error};
use crate::inbound::http::auth::map_identity_error;

mod session;

pub mod messages;
pub mod state;

use state::{AllowedOrigins, WsState};

/// Query string of the stream upgrade request.
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    token: Option<String>,
}

/// Upgrade to the caller's notification stream.
#[get("/ws/notifications")]
pub async fn notifications_stream(
    state: web::Data<WsState>,
    query: web::Query<StreamQuery>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    check_origin(&req, &state.allowed_origins)?;

    let token = query
        .into_inner()
        .token
        .and_then(|raw| BearerToken::new(&raw).ok())
        .ok_or_else(|| Error::unauthorized("User not authenticated"))?;
    let user = state
        .identity
        .resolve(&token)
        .await
        .map_err(map_identity_error)?;

    // Subscribe before upgrading so nothing published after the handshake is missed.
    let subscription = state.feed.subscribe(user.id);
    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(%error, "notification stream upgrade failed");
        error
    })?;
    info!(user_id = %user.id, "notification stream opened");
    actix_web::rt::spawn(session::handle_ws_session(
        subscription,
        user.id,
        session,
        messages,
    ));
    Ok(response)
}

fn check_origin(req: &HttpRequest, allowed: &AllowedOrigins) -> Result<(), Error> {
    let mut origins = req.headers().get_all(ORIGIN);
    let header = origins.next().ok_or_else(|| {
        debug!("missing Origin header on notification stream upgrade");
        Error::forbidden("Origin not allowed")
    })?;
    if origins.next().is_some() {
        return Err(Error::invalid_request("Invalid Origin header"));
    }

    let origin = parse_origin(header)?;
    if allowed.allows(&origin) {
        Ok(())
    } else {
        warn!(origin = %origin, "rejected notification stream upgrade from disallowed origin");
        Err(Error::forbidden("Origin not allowed"))
    }
}

fn parse_origin(header: &HeaderValue) -> Result<Url, Error> {
    header
        .to_str()
        .ok()
        .and_then(|value| Url::parse(value).ok())
        .ok_or_else(|| Error::invalid_request("Invalid Origin header"))
}
