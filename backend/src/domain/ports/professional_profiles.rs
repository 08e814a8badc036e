//! Driving ports for professional profile registration and reads.

use async_trait::async_trait;

use crate::domain::{Error, Professional, ProfessionalDraft, ProfessionalId, UserId};

/// Request to register the caller as a professional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterProfessionalRequest {
    pub user_id: UserId,
    pub draft: ProfessionalDraft,
}

/// Driving port for profile writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfessionalCommand: Send + Sync {
    /// Create the caller's profile. A second profile is a `conflict`.
    async fn register(&self, request: RegisterProfessionalRequest) -> Result<Professional, Error>;
}

/// Driving port for profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfessionalQuery: Send + Sync {
    /// The caller's own profile.
    async fn get_mine(&self, user_id: &UserId) -> Result<Professional, Error>;

    /// Any profile by id.
    async fn get_profile(&self, id: &ProfessionalId) -> Result<Professional, Error>;
}
