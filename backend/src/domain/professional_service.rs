//! Professional profile domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    ProfessionalCommand, ProfessionalQuery, ProfessionalRepository, RegisterProfessionalRequest,
};
use crate::domain::service_errors::map_professional_error;
use crate::domain::{Error, Professional, ProfessionalId, UserId};

/// Profile service implementing the professional driving ports.
#[derive(Clone)]
pub struct ProfessionalService<R> {
    professional_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ProfessionalService<R> {
    /// Create a new service over the profile repository.
    pub fn new(professional_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            professional_repo,
            clock,
        }
    }
}

#[async_trait]
impl<R> ProfessionalCommand for ProfessionalService<R>
where
    R: ProfessionalRepository,
{
    async fn register(&self, request: RegisterProfessionalRequest) -> Result<Professional, Error> {
        let draft = request.draft;
        let professional = Professional {
            id: ProfessionalId::random(),
            user_id: request.user_id,
            name: draft.name,
            specialty: draft.specialty,
            hourly_rate: draft.hourly_rate,
            service_zipcodes: draft.service_zipcodes,
            phone: draft.phone,
            bio: draft.bio,
            verified: false,
            is_sponsored: false,
            sponsored_until: None,
            payout_account_id: None,
            payout_onboarding_complete: false,
            created_at: self.clock.utc(),
        };

        self.professional_repo
            .insert(&professional)
            .await
            .map_err(map_professional_error)?;

        info!(
            professional_id = %professional.id,
            user_id = %professional.user_id,
            "professional registered"
        );
        Ok(professional)
    }
}

#[async_trait]
impl<R> ProfessionalQuery for ProfessionalService<R>
where
    R: ProfessionalRepository,
{
    async fn get_mine(&self, user_id: &UserId) -> Result<Professional, Error> {
        self.professional_repo
            .find_by_user(user_id)
            .await
            .map_err(map_professional_error)?
            .ok_or_else(|| Error::not_found("Not a professional"))
    }

    async fn get_profile(&self, id: &ProfessionalId) -> Result<Professional, Error> {
        self.professional_repo
            .find_by_id(id)
            .await
            .map_err(map_professional_error)?
            .ok_or_else(|| Error::not_found(format!("professional {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockProfessionalRepository, ProfessionalRepositoryError};
    use crate::domain::test_fixtures::{fixture_clock, fixture_timestamp, plumber};
    use crate::domain::{ErrorCode, Money, ProfessionalDraft};

    fn draft() -> ProfessionalDraft {
        ProfessionalDraft::new(
            "Pat",
            "Plumbing",
            Money::from_cents(8_000).expect("rate"),
            vec!["10001".to_owned()],
            "555-0100",
            None,
        )
        .expect("valid draft")
    }

    #[rstest]
    #[tokio::test]
    async fn register_creates_unverified_profile_without_payouts() {
        let mut repo = MockProfessionalRepository::new();
        repo.expect_insert().times(1).return_once(|_| Ok(()));
        let service = ProfessionalService::new(Arc::new(repo), fixture_clock());
        let user_id = UserId::random();

        let professional = service
            .register(RegisterProfessionalRequest {
                user_id,
                draft: draft(),
            })
            .await
            .expect("register succeeds");

        assert_eq!(professional.user_id, user_id);
        assert!(!professional.verified);
        assert!(!professional.can_receive_payouts());
        assert_eq!(professional.created_at, fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn second_profile_for_user_is_a_conflict() {
        let mut repo = MockProfessionalRepository::new();
        repo.expect_insert()
            .times(1)
            .return_once(|_| Err(ProfessionalRepositoryError::duplicate_owner("u")));
        let service = ProfessionalService::new(Arc::new(repo), fixture_clock());

        let err = service
            .register(RegisterProfessionalRequest {
                user_id: UserId::random(),
                draft: draft(),
            })
            .await
            .expect_err("duplicate rejected");

        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn get_mine_reports_not_a_professional() {
        let mut repo = MockProfessionalRepository::new();
        repo.expect_find_by_user().times(1).return_once(|_| Ok(None));
        let service = ProfessionalService::new(Arc::new(repo), fixture_clock());

        let err = service
            .get_mine(&UserId::random())
            .await
            .expect_err("missing profile");

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "Not a professional");
    }

    #[rstest]
    #[tokio::test]
    async fn get_profile_returns_stored_profile() {
        let stored = plumber(UserId::random());
        let id = stored.id;
        let mut repo = MockProfessionalRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(stored)));
        let service = ProfessionalService::new(Arc::new(repo), fixture_clock());

        let found = service.get_profile(&id).await.expect("profile found");
        assert_eq!(found.id, id);
    }
}
