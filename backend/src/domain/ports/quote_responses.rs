//! Driving ports for submitting and deciding quote responses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Error, Money, QuoteRequestId, QuoteResponse, QuoteResponseId, QuoteResponseStatus,
    ResponseOrder, UserId,
};

/// A professional's bid against a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitQuoteResponseRequest {
    /// Caller; must own a professional profile.
    pub user_id: UserId,
    pub quote_request_id: QuoteRequestId,
    pub quote_amount: Money,
    pub quote_details: Option<String>,
}

/// Outcome of a committed bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitQuoteResponseResponse {
    pub quote_response_id: QuoteResponseId,
    pub response_order: ResponseOrder,
}

/// Customer decision on a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetResponseStatusRequest {
    /// Caller; must own the parent request.
    pub customer_id: UserId,
    pub quote_response_id: QuoteResponseId,
    pub status: QuoteResponseStatus,
}

/// Result of a customer decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetResponseStatusResponse {
    pub response: QuoteResponse,
    /// `false` when the response already held the requested status.
    pub changed: bool,
    /// When the professional should confirm an accepted quote by.
    pub confirmation_deadline: Option<DateTime<Utc>>,
}

/// Driving port for professionals submitting bids.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteResponseCommand: Send + Sync {
    /// Record a bid unless the request is full or already answered by the caller.
    async fn submit(
        &self,
        request: SubmitQuoteResponseRequest,
    ) -> Result<SubmitQuoteResponseResponse, Error>;
}

/// Driving port for customers accepting or declining bids.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteLifecycleCommand: Send + Sync {
    /// Move a pending response to accepted or declined.
    async fn set_response_status(
        &self,
        request: SetResponseStatusRequest,
    ) -> Result<SetResponseStatusResponse, Error>;
}
