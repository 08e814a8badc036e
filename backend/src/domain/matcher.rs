//! Quote request intake and professional fan-out.
//!
//! Matching runs in two stages. The repository performs a loose,
//! case-insensitive specialty search; the matcher then keeps only
//! professionals whose service area contains the request's zipcode exactly.
//! Fan-out is best-effort: the request is durable before any notification is
//! queued, and a failed search or enqueue never fails the intake.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    NotificationDispatcher, ProfessionalRepository, QuoteRequestCommand, QuoteRequestRepository,
    SubmitQuoteRequest, SubmitQuoteRequestResponse, dispatch_best_effort,
};
use crate::domain::service_errors::map_quote_request_error;
use crate::domain::{Error, NewNotification, Professional, QuoteRequest, QuoteRequestId};

/// Domain service implementing [`QuoteRequestCommand`].
#[derive(Clone)]
pub struct QuoteMatcher<Q, P> {
    request_repo: Arc<Q>,
    professional_repo: Arc<P>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
}

impl<Q, P> QuoteMatcher<Q, P> {
    /// Create a matcher over the request and professional repositories.
    pub fn new(
        request_repo: Arc<Q>,
        professional_repo: Arc<P>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            request_repo,
            professional_repo,
            dispatcher,
            clock,
        }
    }
}

impl<Q, P> QuoteMatcher<Q, P>
where
    P: ProfessionalRepository,
{
    async fn matching_professionals(&self, request: &QuoteRequest) -> Vec<Professional> {
        match self
            .professional_repo
            .search_by_specialty(&request.service_category)
            .await
        {
            Ok(candidates) => candidates
                .into_iter()
                .filter(|professional| professional.matches(&request.service_category, &request.zipcode))
                .collect(),
            Err(err) => {
                warn!(
                    quote_request_id = %request.id,
                    error = %err,
                    "professional search failed; no professionals notified"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl<Q, P> QuoteRequestCommand for QuoteMatcher<Q, P>
where
    Q: QuoteRequestRepository,
    P: ProfessionalRepository,
{
    async fn submit(&self, request: SubmitQuoteRequest) -> Result<SubmitQuoteRequestResponse, Error> {
        let draft = request.draft;
        let quote_request = QuoteRequest {
            id: QuoteRequestId::random(),
            customer_id: request.customer_id,
            service_category: draft.service_category,
            description: draft.description,
            zipcode: draft.zipcode,
            timeline: draft.timeline,
            budget: draft.budget,
            contact: draft.contact,
            created_at: self.clock.utc(),
        };

        self.request_repo
            .insert(&quote_request)
            .await
            .map_err(map_quote_request_error)?;

        let matches = self.matching_professionals(&quote_request).await;
        let now = self.clock.utc();
        for professional in &matches {
            dispatch_best_effort(
                self.dispatcher.as_ref(),
                NewNotification::new_quote_request(
                    professional.user_id,
                    quote_request.id,
                    &quote_request.service_category,
                    &quote_request.zipcode,
                    now,
                ),
            );
        }

        info!(
            quote_request_id = %quote_request.id,
            category = %quote_request.service_category,
            zipcode = %quote_request.zipcode,
            professionals_notified = matches.len(),
            "quote request submitted"
        );

        Ok(SubmitQuoteRequestResponse {
            quote_request_id: quote_request.id,
            professionals_notified: matches.len(),
        })
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
