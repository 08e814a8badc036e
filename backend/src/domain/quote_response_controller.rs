//! Quote response submission under the per-request cap.
//!
//! The capacity check and order assignment are delegated to
//! [`QuoteResponseRepository::insert_next`], which performs both atomically.
//! The customer notification is queued only after the response commits and
//! its failure never rolls the response back.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    InsertOutcome, NotificationDispatcher, ProfessionalRepository, QuoteRequestRepository,
    QuoteResponseCommand, QuoteResponseRepository, SubmitQuoteResponseRequest,
    SubmitQuoteResponseResponse, dispatch_best_effort,
};
use crate::domain::service_errors::{map_professional_error, map_quote_response_error};
use crate::domain::{Error, NewNotification, NewQuoteResponse, QuoteResponse, QuoteResponseId};

/// Domain service implementing [`QuoteResponseCommand`].
#[derive(Clone)]
pub struct QuoteResponseController<R, Q, P> {
    response_repo: Arc<R>,
    request_repo: Arc<Q>,
    professional_repo: Arc<P>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
}

impl<R, Q, P> QuoteResponseController<R, Q, P> {
    /// Create the controller.
    pub fn new(
        response_repo: Arc<R>,
        request_repo: Arc<Q>,
        professional_repo: Arc<P>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            response_repo,
            request_repo,
            professional_repo,
            dispatcher,
            clock,
        }
    }
}

impl<R, Q, P> QuoteResponseController<R, Q, P>
where
    Q: QuoteRequestRepository,
{
    async fn notify_customer(&self, response: &QuoteResponse) {
        let request = match self.request_repo.find_by_id(&response.quote_request_id).await {
            Ok(Some(request)) => request,
            Ok(None) => {
                warn!(
                    quote_request_id = %response.quote_request_id,
                    "quote request vanished before customer notification"
                );
                return;
            }
            Err(err) => {
                warn!(
                    quote_request_id = %response.quote_request_id,
                    error = %err,
                    "could not load quote request for customer notification"
                );
                return;
            }
        };

        dispatch_best_effort(
            self.dispatcher.as_ref(),
            NewNotification::new_quote_received(
                request.customer_id,
                request.id,
                &request.service_category,
                &request.zipcode,
                self.clock.utc(),
            ),
        );
    }
}

#[async_trait]
impl<R, Q, P> QuoteResponseCommand for QuoteResponseController<R, Q, P>
where
    R: QuoteResponseRepository,
    Q: QuoteRequestRepository,
    P: ProfessionalRepository,
{
    async fn submit(
        &self,
        request: SubmitQuoteResponseRequest,
    ) -> Result<SubmitQuoteResponseResponse, Error> {
        if request.quote_amount.is_zero() {
            return Err(Error::invalid_request("quoteAmount must be greater than zero"));
        }

        let professional = self
            .professional_repo
            .find_by_user(&request.user_id)
            .await
            .map_err(map_professional_error)?
            .ok_or_else(|| Error::forbidden("Not a professional"))?;

        let outcome = self
            .response_repo
            .insert_next(NewQuoteResponse {
                id: QuoteResponseId::random(),
                quote_request_id: request.quote_request_id,
                professional_id: professional.id,
                quote_amount: request.quote_amount,
                quote_details: request
                    .quote_details
                    .map(|details| details.trim().to_owned())
                    .filter(|details| !details.is_empty()),
                created_at: self.clock.utc(),
            })
            .await
            .map_err(map_quote_response_error)?;

        let response = match outcome {
            InsertOutcome::Inserted(response) => response,
            InsertOutcome::CapacityReached => {
                info!(
                    quote_request_id = %request.quote_request_id,
                    professional_id = %professional.id,
                    "quote response rejected at capacity"
                );
                return Err(Error::capacity_reached("This request already has 3 quotes"));
            }
            InsertOutcome::AlreadyResponded => {
                return Err(Error::conflict("You have already responded to this request"));
            }
            InsertOutcome::RequestMissing => {
                return Err(Error::not_found("Quote request not found"));
            }
        };

        info!(
            quote_request_id = %response.quote_request_id,
            quote_response_id = %response.id,
            response_order = response.response_order.get(),
            "quote response submitted"
        );
        self.notify_customer(&response).await;

        Ok(SubmitQuoteResponseResponse {
            quote_response_id: response.id,
            response_order: response.response_order,
        })
    }
}

#[cfg(test)]
#[path = "quote_response_controller_tests.rs"]
mod tests;
