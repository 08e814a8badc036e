//! Quote request reads shaped for the caller's role.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    ProfessionalRepository, QuoteRequestQuery, QuoteRequestRepository, QuoteRequestView,
    QuoteResponseRepository,
};
use crate::domain::service_errors::{
    map_professional_error, map_quote_request_error, map_quote_response_error,
};
use crate::domain::{Error, MAX_RESPONSES_PER_REQUEST, QuoteRequest, QuoteRequestId, UserId};

/// Domain service implementing [`QuoteRequestQuery`].
#[derive(Clone)]
pub struct QuoteRequestQueryService<Q, R, P> {
    request_repo: Arc<Q>,
    response_repo: Arc<R>,
    professional_repo: Arc<P>,
}

impl<Q, R, P> QuoteRequestQueryService<Q, R, P> {
    /// Create the query service.
    pub fn new(request_repo: Arc<Q>, response_repo: Arc<R>, professional_repo: Arc<P>) -> Self {
        Self {
            request_repo,
            response_repo,
            professional_repo,
        }
    }
}

#[async_trait]
impl<Q, R, P> QuoteRequestQuery for QuoteRequestQueryService<Q, R, P>
where
    Q: QuoteRequestRepository,
    R: QuoteResponseRepository,
    P: ProfessionalRepository,
{
    async fn list_mine(&self, customer_id: &UserId) -> Result<Vec<QuoteRequest>, Error> {
        self.request_repo
            .list_for_customer(customer_id)
            .await
            .map_err(map_quote_request_error)
    }

    async fn get(&self, caller: &UserId, id: &QuoteRequestId) -> Result<QuoteRequestView, Error> {
        let request = self
            .request_repo
            .find_by_id(id)
            .await
            .map_err(map_quote_request_error)?
            .ok_or_else(|| Error::not_found("Quote request not found"))?;

        let responses = self
            .response_repo
            .list_for_request(id)
            .await
            .map_err(map_quote_response_error)?;

        if request.customer_id == *caller {
            return Ok(QuoteRequestView::Owner { request, responses });
        }

        let professional = self
            .professional_repo
            .find_by_user(caller)
            .await
            .map_err(map_professional_error)?
            .ok_or_else(|| Error::forbidden("You do not have access to this quote request"))?;

        let response_count = responses.len();
        let own_response = responses
            .into_iter()
            .find(|response| response.professional_id == professional.id);
        Ok(QuoteRequestView::Professional {
            request,
            response_count,
            remaining_slots: usize::from(MAX_RESPONSES_PER_REQUEST).saturating_sub(response_count),
            own_response,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{
        MockProfessionalRepository, MockQuoteRequestRepository, MockQuoteResponseRepository,
    };
    use crate::domain::test_fixtures::{fixture_timestamp, plumber, quote_request};
    use crate::domain::{ErrorCode, Money, NewQuoteResponse, QuoteResponse, QuoteResponseId, ResponseOrder};

    type Service = QuoteRequestQueryService<
        MockQuoteRequestRepository,
        MockQuoteResponseRepository,
        MockProfessionalRepository,
    >;

    fn response_for(
        request: &QuoteRequest,
        professional_id: crate::domain::ProfessionalId,
        order: u8,
    ) -> QuoteResponse {
        NewQuoteResponse {
            id: QuoteResponseId::random(),
            quote_request_id: request.id,
            professional_id,
            quote_amount: Money::from_cents(20_000).expect("amount"),
            quote_details: None,
            created_at: fixture_timestamp(),
        }
        .into_response(ResponseOrder::new(i16::from(order)).expect("order"))
    }

    fn service(
        request: QuoteRequest,
        responses: Vec<QuoteResponse>,
        professional_repo: MockProfessionalRepository,
    ) -> Service {
        let mut request_repo = MockQuoteRequestRepository::new();
        request_repo
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(request)));
        let mut response_repo = MockQuoteResponseRepository::new();
        response_repo
            .expect_list_for_request()
            .return_once(move |_| Ok(responses));
        QuoteRequestQueryService::new(
            Arc::new(request_repo),
            Arc::new(response_repo),
            Arc::new(professional_repo),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn owner_sees_all_responses() {
        let customer = UserId::random();
        let request = quote_request(customer);
        let responses = vec![
            response_for(&request, plumber(UserId::random()).id, 1),
            response_for(&request, plumber(UserId::random()).id, 2),
        ];
        let id = request.id;
        let mut professional_repo = MockProfessionalRepository::new();
        professional_repo.expect_find_by_user().times(0);

        let view = service(request, responses, professional_repo)
            .get(&customer, &id)
            .await
            .expect("owner view");

        assert!(matches!(view, QuoteRequestView::Owner { ref responses, .. } if responses.len() == 2));
    }

    #[rstest]
    #[tokio::test]
    async fn professional_sees_remaining_slots_and_own_bid() {
        let request = quote_request(UserId::random());
        let me = plumber(UserId::random());
        let my_user = me.user_id;
        let responses = vec![
            response_for(&request, plumber(UserId::random()).id, 1),
            response_for(&request, me.id, 2),
        ];
        let id = request.id;
        let mut professional_repo = MockProfessionalRepository::new();
        professional_repo
            .expect_find_by_user()
            .return_once(move |_| Ok(Some(me)));

        let view = service(request, responses, professional_repo)
            .get(&my_user, &id)
            .await
            .expect("professional view");

        match view {
            QuoteRequestView::Professional {
                response_count,
                remaining_slots,
                own_response,
                ..
            } => {
                assert_eq!(response_count, 2);
                assert_eq!(remaining_slots, 1);
                assert_eq!(own_response.map(|r| r.response_order.get()), Some(2));
            }
            QuoteRequestView::Owner { .. } => panic!("expected professional view"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn strangers_are_forbidden() {
        let request = quote_request(UserId::random());
        let id = request.id;
        let mut professional_repo = MockProfessionalRepository::new();
        professional_repo
            .expect_find_by_user()
            .return_once(|_| Ok(None));

        let err = service(request, Vec::new(), professional_repo)
            .get(&UserId::random(), &id)
            .await
            .expect_err("stranger rejected");

        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
