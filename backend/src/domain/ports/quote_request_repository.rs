//! Port for quote request persistence.

use async_trait::async_trait;

use crate::domain::{QuoteRequest, QuoteRequestId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by quote request repository adapters.
    pub enum QuoteRequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "quote request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "quote request repository query failed: {message}",
    }
}

/// Port for storing and reading quote requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteRequestRepository: Send + Sync {
    /// Persist a new request.
    async fn insert(&self, request: &QuoteRequest) -> Result<(), QuoteRequestRepositoryError>;

    /// Find a request by id.
    async fn find_by_id(
        &self,
        id: &QuoteRequestId,
    ) -> Result<Option<QuoteRequest>, QuoteRequestRepositoryError>;

    /// Requests posted by a customer, newest first.
    async fn list_for_customer(
        &self,
        customer_id: &UserId,
    ) -> Result<Vec<QuoteRequest>, QuoteRequestRepositoryError>;
}

/// Fixture implementation for tests that do not exercise requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureQuoteRequestRepository;

#[async_trait]
impl QuoteRequestRepository for FixtureQuoteRequestRepository {
    async fn insert(&self, _request: &QuoteRequest) -> Result<(), QuoteRequestRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &QuoteRequestId,
    ) -> Result<Option<QuoteRequest>, QuoteRequestRepositoryError> {
        Ok(None)
    }

    async fn list_for_customer(
        &self,
        _customer_id: &UserId,
    ) -> Result<Vec<QuoteRequest>, QuoteRequestRepositoryError> {
        Ok(Vec::new())
    }
}
