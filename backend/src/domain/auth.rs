//! Authentication primitives: bearer tokens and the resolved caller.
//!
//! Keep header parsing outside the domain by exposing constructors that
//! validate raw strings before a handler talks to the identity port.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::UserId;

/// Domain error returned when a bearer token is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BearerTokenError {
    /// Header or query value was missing or blank.
    Missing,
    /// Header did not use the `Bearer` scheme.
    WrongScheme,
}

impl fmt::Display for BearerTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "bearer token is required"),
            Self::WrongScheme => write!(f, "authorization header must use the Bearer scheme"),
        }
    }
}

impl std::error::Error for BearerTokenError {}

/// Opaque access token issued by the identity provider.
///
/// The token is zeroed on drop and never printed by `Debug`.
///
/// # Examples
/// ```
/// use bluecaller::domain::BearerToken;
///
/// let token = BearerToken::from_header("Bearer abc.def").unwrap();
/// assert_eq!(token.expose(), "abc.def");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Wrap a raw token, rejecting blank values.
    pub fn new(raw: &str) -> Result<Self, BearerTokenError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BearerTokenError::Missing);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Parse an `Authorization` header value.
    pub fn from_header(value: &str) -> Result<Self, BearerTokenError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(BearerTokenError::Missing);
        }
        let (scheme, rest) = value.split_once(' ').ok_or(BearerTokenError::WrongScheme)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(BearerTokenError::WrongScheme);
        }
        Self::new(rest)
    }

    /// Raw token text for forwarding to the identity provider.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// The caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    /// Address used for processor customer lookups and account creation.
    pub email: Option<String>,
}

impl AuthenticatedUser {
    /// Build a caller identity.
    pub fn new(id: UserId, email: Option<String>) -> Self {
        Self {
            id,
            email: email.filter(|value| !value.trim().is_empty()),
        }
    }
}
