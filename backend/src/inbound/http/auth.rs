//! Bearer-token authentication for HTTP handlers.
//!
//! [`Caller`] reads the `Authorization` header, asks the identity port who
//! the token belongs to and hands the handler an [`AuthenticatedUser`].
//! [`RequestOrigin`] supplies the base URL used for processor redirects.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, warn};

use crate::domain::ports::IdentityProviderError;
use crate::domain::{AuthenticatedUser, BearerToken, Error, UserId};
use crate::inbound::http::state::HttpState;

const NOT_AUTHENTICATED: &str = "User not authenticated";

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Caller(AuthenticatedUser);

impl Caller {
    /// The resolved user.
    pub fn user(&self) -> &AuthenticatedUser {
        &self.0
    }

    /// Identifier of the resolved user.
    pub fn id(&self) -> UserId {
        self.0.id
    }

    /// Take the resolved user.
    pub fn into_user(self) -> AuthenticatedUser {
        self.0
    }
}

pub(crate) fn map_identity_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::InvalidToken => Error::unauthorized(NOT_AUTHENTICATED),
        IdentityProviderError::Unavailable { message } => {
            warn!(%message, "identity provider unavailable");
            Error::service_unavailable("Authentication is temporarily unavailable")
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<BearerToken, Error> {
    let raw = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    BearerToken::from_header(raw).map_err(|err| {
        debug!(error = %err, "rejected authorization header");
        Error::unauthorized(NOT_AUTHENTICATED)
    })
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            let user = state
                .identity
                .resolve(&token)
                .await
                .map_err(map_identity_error)?;
            Ok(Caller(user))
        })
    }
}

/// Base URL of the web client that issued the request.
///
/// Taken from the `Origin` header, falling back to the configured public
/// origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(String);

impl RequestOrigin {
    /// Origin without a trailing slash.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromRequest for RequestOrigin {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let from_header = req
            .headers()
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != "null")
            .map(|value| value.trim_end_matches('/').to_owned());
        let origin = from_header.or_else(|| {
            req.app_data::<web::Data<HttpState>>()
                .map(|state| state.public_origin.clone())
        });
        ready(
            origin
                .map(RequestOrigin)
                .ok_or_else(|| Error::invalid_request("Origin header is required")),
        )
    }
}
