//! Port for quote response persistence.
//!
//! The capacity check and order assignment happen inside the adapter as one
//! atomic operation. Callers never count rows and insert separately.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    NewQuoteResponse, QuoteRequestId, QuoteResponse, QuoteResponseId, QuoteResponseStatus,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by quote response repository adapters.
    pub enum QuoteResponseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "quote response repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "quote response repository query failed: {message}",
    }
}

/// Result of an atomic capacity-checked insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The response was committed with the next free order.
    Inserted(QuoteResponse),
    /// The request already holds the maximum number of responses.
    CapacityReached,
    /// This professional has already responded to the request.
    AlreadyResponded,
    /// The parent request does not exist.
    RequestMissing,
}

/// Port for recording and deciding quote responses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteResponseRepository: Send + Sync {
    /// Assign the next order and insert in one transaction.
    ///
    /// A failed insert never consumes an order slot.
    async fn insert_next(
        &self,
        response: NewQuoteResponse,
    ) -> Result<InsertOutcome, QuoteResponseRepositoryError>;

    /// Find a response by id.
    async fn find_by_id(
        &self,
        id: &QuoteResponseId,
    ) -> Result<Option<QuoteResponse>, QuoteResponseRepositoryError>;

    /// Responses to a request ordered by `response_order`.
    async fn list_for_request(
        &self,
        quote_request_id: &QuoteRequestId,
    ) -> Result<Vec<QuoteResponse>, QuoteResponseRepositoryError>;

    /// Move a pending response to `status`.
    ///
    /// Returns `false` when the response was no longer pending.
    async fn decide(
        &self,
        id: &QuoteResponseId,
        status: QuoteResponseStatus,
        accepted_at: Option<DateTime<Utc>>,
    ) -> Result<bool, QuoteResponseRepositoryError>;
}

/// Fixture implementation for tests that do not exercise responses.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureQuoteResponseRepository;

#[async_trait]
impl QuoteResponseRepository for FixtureQuoteResponseRepository {
    async fn insert_next(
        &self,
        _response: NewQuoteResponse,
    ) -> Result<InsertOutcome, QuoteResponseRepositoryError> {
        Ok(InsertOutcome::RequestMissing)
    }

    async fn find_by_id(
        &self,
        _id: &QuoteResponseId,
    ) -> Result<Option<QuoteResponse>, QuoteResponseRepositoryError> {
        Ok(None)
    }

    async fn list_for_request(
        &self,
        _quote_request_id: &QuoteRequestId,
    ) -> Result<Vec<QuoteResponse>, QuoteResponseRepositoryError> {
        Ok(Vec::new())
    }

    async fn decide(
        &self,
        _id: &QuoteResponseId,
        _status: QuoteResponseStatus,
        _accepted_at: Option<DateTime<Utc>>,
    ) -> Result<bool, QuoteResponseRepositoryError> {
        Ok(false)
    }
}
