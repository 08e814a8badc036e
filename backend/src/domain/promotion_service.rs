//! Paid promotion of a professional's listing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::info;

use crate::domain::payout_onboarding_gate::owned_professional;
use crate::domain::ports::{
    CheckoutPayment, CheckoutSession, CheckoutSessionRequest, CreatePromotionRequest,
    PaymentGateway, PaymentMetadata, PaymentVerification, ProfessionalRepository,
    PromotionCommand,
};
use crate::domain::service_errors::{map_gateway_error, map_professional_error};
use crate::domain::{Error, Money, UserId};

/// Price and duration of a promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionTerms {
    pub price: Money,
    pub days: u16,
    pub currency: String,
}

impl Default for PromotionTerms {
    fn default() -> Self {
        Self {
            price: Money::from_unsigned_cents(500),
            days: 30,
            currency: "usd".to_owned(),
        }
    }
}

/// Domain service implementing [`PromotionCommand`].
#[derive(Clone)]
pub struct PromotionService<P> {
    professional_repo: Arc<P>,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
    terms: PromotionTerms,
}

impl<P> PromotionService<P> {
    /// Create the promotion service.
    pub fn new(
        professional_repo: Arc<P>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
        terms: PromotionTerms,
    ) -> Self {
        Self {
            professional_repo,
            gateway,
            clock,
            terms,
        }
    }
}

#[async_trait]
impl<P> PromotionCommand for PromotionService<P>
where
    P: ProfessionalRepository,
{
    async fn create_checkout(&self, request: CreatePromotionRequest) -> Result<CheckoutSession, Error> {
        let professional = owned_professional(
            self.professional_repo.as_ref(),
            &request.user_id,
            &request.professional_id,
        )
        .await?;
        if !professional.can_receive_payouts() {
            return Err(Error::precondition_failed(
                "Complete payment setup before promoting your listing",
            ));
        }

        let session = self
            .gateway
            .create_checkout_session(&CheckoutSessionRequest {
                payment: CheckoutPayment::LineItem {
                    name: format!("Featured listing ({} days)", self.terms.days),
                    amount: self.terms.price,
                    currency: self.terms.currency.clone(),
                },
                customer_id: None,
                customer_email: None,
                success_url: format!(
                    "{}/my-listing?session_id={{CHECKOUT_SESSION_ID}}",
                    request.origin
                ),
                cancel_url: format!("{}/my-listing", request.origin),
                metadata: PaymentMetadata::from([
                    ("user_id".to_owned(), request.user_id.to_string()),
                    ("professional_id".to_owned(), professional.id.to_string()),
                ]),
            })
            .await
            .map_err(map_gateway_error)?;

        info!(
            professional_id = %professional.id,
            session_id = %session.id,
            "promotion checkout created"
        );
        Ok(session)
    }

    async fn verify(&self, user_id: &UserId, session_id: &str) -> Result<PaymentVerification, Error> {
        let session = self
            .gateway
            .retrieve_checkout_session(session_id)
            .await
            .map_err(map_gateway_error)?;
        let Some(owner) = session.metadata.get("user_id").filter(|_| session.paid) else {
            return Ok(PaymentVerification::not_completed());
        };
        if *owner != user_id.to_string() {
            return Err(Error::forbidden("Checkout session belongs to another user"));
        }

        let professional = self
            .professional_repo
            .find_by_user(user_id)
            .await
            .map_err(map_professional_error)?
            .ok_or_else(|| Error::forbidden("Not a professional"))?;
        let until = self.clock.utc() + TimeDelta::days(i64::from(self.terms.days));
        self.professional_repo
            .mark_sponsored(&professional.id, until)
            .await
            .map_err(map_professional_error)?;

        info!(professional_id = %professional.id, %until, "listing promoted");
        Ok(PaymentVerification::succeeded("Profile promoted successfully"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{CheckoutSessionStatus, MockPaymentGateway, MockProfessionalRepository};
    use crate::domain::test_fixtures::{fixture_clock, fixture_timestamp, plumber};
    use crate::domain::{ErrorCode, Professional};

    fn service(repo: MockProfessionalRepository, gateway: MockPaymentGateway) -> PromotionService<MockProfessionalRepository> {
        PromotionService::new(
            Arc::new(repo),
            Arc::new(gateway),
            fixture_clock(),
            PromotionTerms::default(),
        )
    }

    fn session(user_id: UserId, paid: bool) -> CheckoutSessionStatus {
        CheckoutSessionStatus {
            id: "cs_promo".to_owned(),
            paid,
            payment_intent_id: None,
            metadata: PaymentMetadata::from([("user_id".to_owned(), user_id.to_string())]),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn checkout_is_a_line_item_for_the_promotion_price() {
        let user = UserId::random();
        let professional = plumber(user);
        let professional_id = professional.id;
        let mut repo = MockProfessionalRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(professional)));
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_checkout_session()
            .withf(move |request| {
                matches!(
                    &request.payment,
                    CheckoutPayment::LineItem { amount, .. } if amount.cents() == 500
                ) && request.success_url
                    == "https://app.example.test/my-listing?session_id={CHECKOUT_SESSION_ID}"
                    && request.metadata.get("user_id") == Some(&user.to_string())
            })
            .times(1)
            .returning(|_| {
                Ok(CheckoutSession {
                    id: "cs_promo".to_owned(),
                    url: "https://checkout.example.test/cs_promo".to_owned(),
                })
            });

        let session = service(repo, gateway)
            .create_checkout(CreatePromotionRequest {
                user_id: user,
                professional_id,
                origin: "https://app.example.test".to_owned(),
            })
            .await
            .expect("checkout created");

        assert_eq!(session.id, "cs_promo");
    }

    #[rstest]
    #[tokio::test]
    async fn promotion_requires_payout_setup() {
        let user = UserId::random();
        let professional = Professional {
            payout_onboarding_complete: false,
            ..plumber(user)
        };
        let professional_id = professional.id;
        let mut repo = MockProfessionalRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(professional)));
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_checkout_session().times(0);

        let err = service(repo, gateway)
            .create_checkout(CreatePromotionRequest {
                user_id: user,
                professional_id,
                origin: "https://app.example.test".to_owned(),
            })
            .await
            .expect_err("gate closed");

        assert_eq!(err.code(), ErrorCode::PreconditionFailed);
    }

    #[rstest]
    #[tokio::test]
    async fn paid_session_sponsors_for_the_configured_days() {
        let user = UserId::random();
        let mut repo = MockProfessionalRepository::new();
        repo.expect_find_by_user()
            .return_once(move |_| Ok(Some(plumber(user))));
        repo.expect_mark_sponsored()
            .withf(|_, until| *until == fixture_timestamp() + TimeDelta::days(30))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_retrieve_checkout_session()
            .return_once(move |_| Ok(session(user, true)));

        let verification = service(repo, gateway)
            .verify(&user, "cs_promo")
            .await
            .expect("verified");

        assert!(verification.success);
        assert_eq!(verification.message, "Profile promoted successfully");
    }

    #[rstest]
    #[tokio::test]
    async fn unpaid_session_changes_nothing() {
        let user = UserId::random();
        let mut repo = MockProfessionalRepository::new();
        repo.expect_mark_sponsored().times(0);
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_retrieve_checkout_session()
            .return_once(move |_| Ok(session(user, false)));

        let verification = service(repo, gateway)
            .verify(&user, "cs_promo")
            .await
            .expect("reported");

        assert!(!verification.success);
    }

    #[rstest]
    #[tokio::test]
    async fn another_users_session_is_forbidden() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_retrieve_checkout_session()
            .return_once(|_| Ok(session(UserId::random(), true)));

        let err = service(MockProfessionalRepository::new(), gateway)
            .verify(&UserId::random(), "cs_promo")
            .await
            .expect_err("foreign session");

        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
