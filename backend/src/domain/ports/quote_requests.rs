//! Driving ports for quote request intake and reads.

use async_trait::async_trait;

use crate::domain::{Error, QuoteRequest, QuoteRequestDraft, QuoteRequestId, QuoteResponse, UserId};

/// Request to post a new quote request and fan it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitQuoteRequest {
    pub customer_id: UserId,
    pub draft: QuoteRequestDraft,
}

/// Outcome of quote request intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitQuoteRequestResponse {
    pub quote_request_id: QuoteRequestId,
    /// Professionals a notification was queued for. Zero is valid.
    pub professionals_notified: usize,
}

/// A quote request as seen by a particular caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteRequestView {
    /// The owning customer sees every response in order.
    Owner {
        request: QuoteRequest,
        responses: Vec<QuoteResponse>,
    },
    /// A professional sees how many slots remain and their own bid.
    Professional {
        request: QuoteRequest,
        response_count: usize,
        remaining_slots: usize,
        own_response: Option<QuoteResponse>,
    },
}

/// Driving port for posting quote requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteRequestCommand: Send + Sync {
    /// Persist the request, then notify matching professionals best-effort.
    async fn submit(&self, request: SubmitQuoteRequest) -> Result<SubmitQuoteRequestResponse, Error>;
}

/// Driving port for reading quote requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteRequestQuery: Send + Sync {
    /// The customer's requests, newest first.
    async fn list_mine(&self, customer_id: &UserId) -> Result<Vec<QuoteRequest>, Error>;

    /// One request, shaped for the caller.
    async fn get(&self, caller: &UserId, id: &QuoteRequestId) -> Result<QuoteRequestView, Error>;
}
