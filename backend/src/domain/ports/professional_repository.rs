//! Port for professional profile persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Professional, ProfessionalId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by professional repository adapters.
    pub enum ProfessionalRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "professional repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "professional repository query failed: {message}",
        /// The owning user already has a profile.
        DuplicateOwner { user_id: String } =>
            "user {user_id} already owns a professional profile",
    }
}

/// Port for reading and updating professional profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfessionalRepository: Send + Sync {
    /// Persist a new profile. Fails with `DuplicateOwner` when the user has one.
    async fn insert(&self, professional: &Professional) -> Result<(), ProfessionalRepositoryError>;

    /// Find a profile by id.
    async fn find_by_id(
        &self,
        id: &ProfessionalId,
    ) -> Result<Option<Professional>, ProfessionalRepositoryError>;

    /// Find the profile owned by a user.
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Professional>, ProfessionalRepositoryError>;

    /// Profiles whose specialty contains `category`, ignoring case.
    ///
    /// This is the loose first matching stage; callers filter zipcodes.
    async fn search_by_specialty(
        &self,
        category: &str,
    ) -> Result<Vec<Professional>, ProfessionalRepositoryError>;

    /// Store `account_id` unless an account is already recorded.
    ///
    /// Returns the account id that is stored after the call, which is the
    /// earlier one when a concurrent caller won.
    async fn claim_payout_account(
        &self,
        id: &ProfessionalId,
        account_id: &str,
    ) -> Result<String, ProfessionalRepositoryError>;

    /// Record whether payout onboarding is complete.
    async fn set_payout_onboarding_complete(
        &self,
        id: &ProfessionalId,
        complete: bool,
    ) -> Result<(), ProfessionalRepositoryError>;

    /// Mark the profile as sponsored until `until`.
    async fn mark_sponsored(
        &self,
        id: &ProfessionalId,
        until: DateTime<Utc>,
    ) -> Result<(), ProfessionalRepositoryError>;
}

/// Fixture implementation for tests that do not exercise profiles.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProfessionalRepository;

#[async_trait]
impl ProfessionalRepository for FixtureProfessionalRepository {
    async fn insert(&self, _professional: &Professional) -> Result<(), ProfessionalRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &ProfessionalId,
    ) -> Result<Option<Professional>, ProfessionalRepositoryError> {
        Ok(None)
    }

    async fn find_by_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<Professional>, ProfessionalRepositoryError> {
        Ok(None)
    }

    async fn search_by_specialty(
        &self,
        _category: &str,
    ) -> Result<Vec<Professional>, ProfessionalRepositoryError> {
        Ok(Vec::new())
    }

    async fn claim_payout_account(
        &self,
        _id: &ProfessionalId,
        account_id: &str,
    ) -> Result<String, ProfessionalRepositoryError> {
        Ok(account_id.to_owned())
    }

    async fn set_payout_onboarding_complete(
        &self,
        _id: &ProfessionalId,
        _complete: bool,
    ) -> Result<(), ProfessionalRepositoryError> {
        Ok(())
    }

    async fn mark_sponsored(
        &self,
        _id: &ProfessionalId,
        _until: DateTime<Utc>,
    ) -> Result<(), ProfessionalRepositoryError> {
        Ok(())
    }
}
