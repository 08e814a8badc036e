//! Customer decisions on quote responses.
//!
//! A response moves from `pending` to `accepted` or `declined` exactly once.
//! Repeating the current decision is a no-op; anything else out of a decided
//! state is a conflict. The store write is a compare-and-set on `pending`, so
//! two racing decisions cannot both apply.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    NotificationDispatcher, ProfessionalRepository, QuoteLifecycleCommand, QuoteRequestRepository,
    QuoteResponseRepository, SetResponseStatusRequest, SetResponseStatusResponse,
    dispatch_best_effort,
};
use crate::domain::service_errors::{map_quote_request_error, map_quote_response_error};
use crate::domain::{
    Error, NewNotification, QuoteRequest, QuoteResponse, QuoteResponseId, QuoteResponseStatus,
    StatusChange, StatusTransitionError,
};

/// Minutes a professional has to confirm once their quote is accepted.
pub const DEFAULT_ACCEPTANCE_WINDOW_MINUTES: u16 = 10;

/// Domain service implementing [`QuoteLifecycleCommand`].
#[derive(Clone)]
pub struct QuoteLifecycleManager<R, Q, P> {
    response_repo: Arc<R>,
    request_repo: Arc<Q>,
    professional_repo: Arc<P>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    acceptance_window_minutes: u16,
}

impl<R, Q, P> QuoteLifecycleManager<R, Q, P> {
    /// Create the manager with the default confirmation window.
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
            acceptance_window_minutes: DEFAULT_ACCEPTANCE_WINDOW_MINUTES,
        }
    }

    /// Override the confirmation window.
    #[must_use]
    pub fn with_acceptance_window(mut self, minutes: u16) -> Self {
        self.acceptance_window_minutes = minutes;
        self
    }

    fn deadline_for(&self, response: &QuoteResponse) -> Option<DateTime<Utc>> {
        response
            .accepted_at
            .map(|accepted_at| accepted_at + TimeDelta::minutes(i64::from(self.acceptance_window_minutes)))
    }

    fn settled(&self, response: QuoteResponse, changed: bool) -> SetResponseStatusResponse {
        SetResponseStatusResponse {
            confirmation_deadline: self.deadline_for(&response),
            response,
            changed,
        }
    }
}

fn transition_error(err: StatusTransitionError) -> Error {
    match err {
        StatusTransitionError::InvalidTarget => Error::invalid_request(err.to_string()),
        StatusTransitionError::NotAllowed { .. } => Error::conflict(err.to_string()),
    }
}

impl<R, Q, P> QuoteLifecycleManager<R, Q, P>
where
    R: QuoteResponseRepository,
    Q: QuoteRequestRepository,
    P: ProfessionalRepository,
{
    async fn load_response(&self, id: &QuoteResponseId) -> Result<QuoteResponse, Error> {
        self.response_repo
            .find_by_id(id)
            .await
            .map_err(map_quote_response_error)?
            .ok_or_else(|| Error::not_found("Quote response not found"))
    }

    async fn notify_professional(&self, request: &QuoteRequest, response: &QuoteResponse) {
        let professional = match self
            .professional_repo
            .find_by_id(&response.professional_id)
            .await
        {
            Ok(Some(professional)) => professional,
            Ok(None) => {
                warn!(
                    professional_id = %response.professional_id,
                    "professional missing; acceptance notice skipped"
                );
                return;
            }
            Err(err) => {
                warn!(
                    professional_id = %response.professional_id,
                    error = %err,
                    "could not load professional for acceptance notice"
                );
                return;
            }
        };

        dispatch_best_effort(
            self.dispatcher.as_ref(),
            NewNotification::quote_accepted(
                professional.user_id,
                request.id,
                &request.service_category,
                &request.zipcode,
                i64::from(self.acceptance_window_minutes),
                self.clock.utc(),
            ),
        );
    }
}

#[async_trait]
impl<R, Q, P> QuoteLifecycleCommand for QuoteLifecycleManager<R, Q, P>
where
    R: QuoteResponseRepository,
    Q: QuoteRequestRepository,
    P: ProfessionalRepository,
{
    async fn set_response_status(
        &self,
        request: SetResponseStatusRequest,
    ) -> Result<SetResponseStatusResponse, Error> {
        let response = self.load_response(&request.quote_response_id).await?;
        let quote_request = self
            .request_repo
            .find_by_id(&response.quote_request_id)
            .await
            .map_err(map_quote_request_error)?
            .ok_or_else(|| Error::not_found("Quote request not found"))?;
        if quote_request.customer_id != request.customer_id {
            return Err(Error::forbidden(
                "Only the customer who posted this request can decide on its quotes",
            ));
        }

        let target = request.status;
        match response.status.transition_to(target).map_err(transition_error)? {
            StatusChange::Unchanged => return Ok(self.settled(response, false)),
            StatusChange::Applied => {}
        }

        let accepted_at = (target == QuoteResponseStatus::Accepted).then(|| self.clock.utc());
        let applied = self
            .response_repo
            .decide(&response.id, target, accepted_at)
            .await
            .map_err(map_quote_response_error)?;

        if !applied {
            // Another decision landed first; report against what is stored now.
            let current = self.load_response(&response.id).await?;
            return match current.status.transition_to(target).map_err(transition_error)? {
                StatusChange::Unchanged => Ok(self.settled(current, false)),
                StatusChange::Applied => Err(Error::conflict(
                    "Quote response changed while it was being updated",
                )),
            };
        }

        let decided = QuoteResponse {
            status: target,
            accepted_at,
            ..response
        };
        info!(
            quote_response_id = %decided.id,
            quote_request_id = %decided.quote_request_id,
            status = %decided.status,
            "quote response decided"
        );
        if target == QuoteResponseStatus::Accepted {
            self.notify_professional(&quote_request, &decided).await;
        }

        Ok(self.settled(decided, true))
    }
}
