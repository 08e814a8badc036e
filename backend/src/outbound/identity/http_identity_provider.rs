//! Reqwest-backed identity provider adapter.
//!
//! Calls `GET {auth_url}/auth/v1/user` with the caller's bearer token and the
//! project API key, and maps the answer onto [`AuthenticatedUser`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{AuthenticatedUser, BearerToken, UserId};

/// Project API key sent in the `apikey` header.
#[derive(Clone)]
pub struct AuthApiKey(Zeroizing<String>);

impl AuthApiKey {
    /// Wrap a raw API key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }
}

impl fmt::Debug for AuthApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthApiKey(***)")
    }
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Identity provider that asks the hosted auth service who owns a token.
pub struct HttpIdentityProvider {
    client: Client,
    user_endpoint: Url,
    api_key: AuthApiKey,
}

impl HttpIdentityProvider {
    /// Build an adapter for the auth service rooted at `auth_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// user endpoint cannot be derived from `auth_url`.
    pub fn new(
        auth_url: &Url,
        api_key: AuthApiKey,
        timeout: Duration,
    ) -> Result<Self, IdentityProviderError> {
        let user_endpoint = user_endpoint(auth_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| IdentityProviderError::unavailable(err.to_string()))?;
        Ok(Self {
            client,
            user_endpoint,
            api_key,
        })
    }
}

fn user_endpoint(auth_url: &Url) -> Result<Url, IdentityProviderError> {
    let mut base = auth_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("auth/v1/user")
        .map_err(|err| IdentityProviderError::unavailable(format!("invalid auth url: {err}")))
}

fn into_user(dto: UserDto) -> Result<AuthenticatedUser, IdentityProviderError> {
    let id = Uuid::parse_str(&dto.id).map_err(|_| IdentityProviderError::invalid_token())?;
    Ok(AuthenticatedUser::new(UserId::from_uuid(id), dto.email))
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn resolve(
        &self,
        token: &BearerToken,
    ) -> Result<AuthenticatedUser, IdentityProviderError> {
        let response = self
            .client
            .get(self.user_endpoint.clone())
            .bearer_auth(token.expose())
            .header("apikey", self.api_key.0.as_str())
            .send()
            .await
            .map_err(|err| IdentityProviderError::unavailable(err.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let dto: UserDto = response.json().await.map_err(|err| {
                    IdentityProviderError::unavailable(format!("invalid user payload: {err}"))
                })?;
                into_user(dto)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST => {
                debug!("identity provider rejected token");
                Err(IdentityProviderError::invalid_token())
            }
            status => Err(IdentityProviderError::unavailable(format!(
                "status {}",
                status.as_u16()
            ))),
        }
    }
}
