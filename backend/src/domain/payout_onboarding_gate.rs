//! Connected payout account onboarding for professionals.
//!
//! The account id is stored on first connect and reused afterwards. The
//! completion flag read by the booking payment gate is refreshed from the
//! processor whenever the owner checks their status.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    ConnectPayoutRequest, ConnectPayoutResponse, OnboardingLinkRequest, PaymentGateway,
    PayoutOnboardingCommand, PayoutStatus, ProfessionalRepository,
};
use crate::domain::service_errors::{map_gateway_error, map_professional_error};
use crate::domain::{Error, Professional, ProfessionalId, UserId};

/// Domain service implementing [`PayoutOnboardingCommand`].
#[derive(Clone)]
pub struct PayoutOnboardingGate<P> {
    professional_repo: Arc<P>,
    gateway: Arc<dyn PaymentGateway>,
}

impl<P> PayoutOnboardingGate<P> {
    /// Create the gate.
    pub fn new(professional_repo: Arc<P>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            professional_repo,
            gateway,
        }
    }
}

/// Load a professional profile the caller owns.
///
/// Shared with the promotion service, which applies the same rule.
pub(crate) async fn owned_professional<P: ProfessionalRepository>(
    repo: &P,
    user_id: &UserId,
    professional_id: &ProfessionalId,
) -> Result<Professional, Error> {
    let professional = repo
        .find_by_id(professional_id)
        .await
        .map_err(map_professional_error)?
        .ok_or_else(|| Error::not_found("Professional not found"))?;
    if professional.user_id != *user_id {
        return Err(Error::forbidden("You do not own this professional profile"));
    }
    Ok(professional)
}

#[async_trait]
impl<P> PayoutOnboardingCommand for PayoutOnboardingGate<P>
where
    P: ProfessionalRepository,
{
    async fn connect(&self, request: ConnectPayoutRequest) -> Result<ConnectPayoutResponse, Error> {
        let professional = owned_professional(
            self.professional_repo.as_ref(),
            &request.user.id,
            &request.professional_id,
        )
        .await?;

        let account_id = match professional.payout_account_id {
            Some(existing) => existing,
            None => {
                let created = self
                    .gateway
                    .create_connected_account(request.user.email.clone())
                    .await
                    .map_err(map_gateway_error)?;
                let stored = self
                    .professional_repo
                    .claim_payout_account(&professional.id, &created)
                    .await
                    .map_err(map_professional_error)?;
                info!(
                    professional_id = %professional.id,
                    account_id = %stored,
                    "payout account connected"
                );
                stored
            }
        };

        let url = self
            .gateway
            .create_onboarding_link(&OnboardingLinkRequest {
                account_id: account_id.clone(),
                refresh_url: format!("{}/my-listing", request.origin),
                return_url: format!("{}/my-listing?onboarding=complete", request.origin),
            })
            .await
            .map_err(map_gateway_error)?;

        Ok(ConnectPayoutResponse { url, account_id })
    }

    async fn check_status(
        &self,
        user_id: &UserId,
        professional_id: &ProfessionalId,
    ) -> Result<PayoutStatus, Error> {
        let professional =
            owned_professional(self.professional_repo.as_ref(), user_id, professional_id).await?;
        let Some(account_id) = professional.payout_account_id else {
            return Ok(PayoutStatus { complete: false });
        };

        let account = self
            .gateway
            .retrieve_connected_account(&account_id)
            .await
            .map_err(map_gateway_error)?;
        let complete = account.onboarding_complete();
        if complete != professional.payout_onboarding_complete {
            self.professional_repo
                .set_payout_onboarding_complete(&professional.id, complete)
                .await
                .map_err(map_professional_error)?;
            info!(
                professional_id = %professional.id,
                complete,
                "payout onboarding status updated"
            );
        }
        Ok(PayoutStatus { complete })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{
        ConnectedAccountStatus, MockPaymentGateway, MockProfessionalRepository,
    };
    use crate::domain::test_fixtures::plumber;
    use crate::domain::{AuthenticatedUser, ErrorCode};

    fn unconnected(user_id: UserId) -> Professional {
        Professional {
            payout_account_id: None,
            payout_onboarding_complete: false,
            ..plumber(user_id)
        }
    }

    fn repo_with(professional: Professional) -> MockProfessionalRepository {
        let mut repo = MockProfessionalRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(professional.clone())));
        repo
    }

    fn gate(repo: MockProfessionalRepository, gateway: MockPaymentGateway) -> PayoutOnboardingGate<MockProfessionalRepository> {
        PayoutOnboardingGate::new(Arc::new(repo), Arc::new(gateway))
    }

    fn connect_request(user_id: UserId, professional_id: ProfessionalId) -> ConnectPayoutRequest {
        ConnectPayoutRequest {
            user: AuthenticatedUser::new(user_id, Some("pat@example.test".to_owned())),
            professional_id,
            origin: "https://app.example.test".to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn first_connect_creates_and_stores_the_account() {
        let user = UserId::random();
        let professional = unconnected(user);
        let professional_id = professional.id;
        let mut repo = repo_with(professional);
        repo.expect_claim_payout_account()
            .times(1)
            .returning(|_, account| Ok(account.to_owned()));
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_connected_account()
            .withf(|email| email.as_deref() == Some("pat@example.test"))
            .times(1)
            .returning(|_| Ok("acct_new".to_owned()));
        gateway
            .expect_create_onboarding_link()
            .withf(|link| {
                link.account_id == "acct_new"
                    && link.refresh_url == "https://app.example.test/my-listing"
                    && link.return_url == "https://app.example.test/my-listing?onboarding=complete"
            })
            .times(1)
            .returning(|_| Ok("https://connect.example.test/onboard".to_owned()));

        let response = gate(repo, gateway)
            .connect(connect_request(user, professional_id))
            .await
            .expect("connect succeeds");

        assert_eq!(response.account_id, "acct_new");
    }

    #[rstest]
    #[tokio::test]
    async fn reconnect_reuses_the_stored_account() {
        let user = UserId::random();
        let professional = plumber(user);
        let professional_id = professional.id;
        let mut repo = repo_with(professional);
        repo.expect_claim_payout_account().times(0);
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_connected_account().times(0);
        gateway
            .expect_create_onboarding_link()
            .times(1)
            .returning(|_| Ok("https://connect.example.test/again".to_owned()));

        let response = gate(repo, gateway)
            .connect(connect_request(user, professional_id))
            .await
            .expect("connect succeeds");

        assert_eq!(response.account_id, "acct_pat");
    }

    #[rstest]
    #[tokio::test]
    async fn only_the_owner_may_connect() {
        let professional = unconnected(UserId::random());
        let professional_id = professional.id;

        let err = gate(repo_with(professional), MockPaymentGateway::new())
            .connect(connect_request(UserId::random(), professional_id))
            .await
            .expect_err("not the owner");

        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn status_without_account_skips_the_processor() {
        let user = UserId::random();
        let professional = unconnected(user);
        let professional_id = professional.id;
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_retrieve_connected_account().times(0);

        let status = gate(repo_with(professional), gateway)
            .check_status(&user, &professional_id)
            .await
            .expect("status");

        assert!(!status.complete);
    }

    #[rstest]
    #[case(true, true, true)]
    #[case(true, false, false)]
    #[tokio::test]
    async fn status_is_derived_and_persisted(
        #[case] charges_enabled: bool,
        #[case] payouts_enabled: bool,
        #[case] expected: bool,
    ) {
        let user = UserId::random();
        let professional = Professional {
            payout_onboarding_complete: false,
            ..plumber(user)
        };
        let professional_id = professional.id;
        let mut repo = repo_with(professional);
        repo.expect_set_payout_onboarding_complete()
            .withf(move |_, complete| *complete == expected)
            .times(usize::from(expected))
            .returning(|_, _| Ok(()));
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_retrieve_connected_account()
            .times(1)
            .returning(move |_| {
                Ok(ConnectedAccountStatus {
                    charges_enabled,
                    payouts_enabled,
                })
            });

        let status = gate(repo, gateway)
            .check_status(&user, &professional_id)
            .await
            .expect("status");

        assert_eq!(status.complete, expected);
    }
}
