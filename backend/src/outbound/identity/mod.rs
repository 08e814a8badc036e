//! Identity provider outbound adapters.
//!
//! Resolves bearer tokens against a GoTrue-compatible auth service.

mod http_identity_provider;

pub use http_identity_provider::{AuthApiKey, HttpIdentityProvider};
