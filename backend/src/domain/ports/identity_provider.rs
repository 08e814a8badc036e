//! Port resolving bearer tokens to authenticated users.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AuthenticatedUser, BearerToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The token is unknown, expired or malformed.
        InvalidToken => "User not authenticated",
        /// The provider could not be reached.
        Unavailable { message: String } => "identity provider unavailable: {message}",
    }
}

/// Port for resolving the caller behind a bearer token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve `token` to the user it was issued for.
    async fn resolve(&self, token: &BearerToken)
    -> Result<AuthenticatedUser, IdentityProviderError>;
}

/// Fixture provider that treats the token itself as the user id.
///
/// Tokens must be UUIDs; the resolved email is `<uuid>@example.test`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn resolve(
        &self,
        token: &BearerToken,
    ) -> Result<AuthenticatedUser, IdentityProviderError> {
        let uuid =
            Uuid::parse_str(token.expose()).map_err(|_| IdentityProviderError::invalid_token())?;
        Ok(AuthenticatedUser::new(
            UserId::from_uuid(uuid),
            Some(format!("{uuid}@example.test")),
        ))
    }
}
