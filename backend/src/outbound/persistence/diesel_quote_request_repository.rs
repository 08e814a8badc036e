//! PostgreSQL-backed `QuoteRequestRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{QuoteRequestRepository, QuoteRequestRepositoryError};
use crate::domain::{QuoteRequest, QuoteRequestId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::QuoteRequestRow;
use super::pool::DbPool;
use super::schema::quote_requests;

/// Diesel-backed implementation of the quote request repository port.
#[derive(Clone)]
pub struct DieselQuoteRequestRepository {
    pool: DbPool,
}

impl DieselQuoteRequestRepository {
    /// Create a repository over the shared connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn diesel_error(error: diesel::result::Error) -> QuoteRequestRepositoryError {
    map_diesel_error(
        error,
        QuoteRequestRepositoryError::query,
        QuoteRequestRepositoryError::connection,
    )
}

#[async_trait]
impl QuoteRequestRepository for DieselQuoteRequestRepository {
    async fn insert(&self, request: &QuoteRequest) -> Result<(), QuoteRequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QuoteRequestRepositoryError::connection))?;

        diesel::insert_into(quote_requests::table)
            .values(QuoteRequestRow::from(request))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &QuoteRequestId,
    ) -> Result<Option<QuoteRequest>, QuoteRequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QuoteRequestRepositoryError::connection))?;

        let row = quote_requests::table
            .filter(quote_requests::id.eq(id.as_uuid()))
            .select(QuoteRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(QuoteRequest::from))
    }

    async fn list_for_customer(
        &self,
        customer_id: &UserId,
    ) -> Result<Vec<QuoteRequest>, QuoteRequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QuoteRequestRepositoryError::connection))?;

        let rows: Vec<QuoteRequestRow> = quote_requests::table
            .filter(quote_requests::customer_id.eq(customer_id.as_uuid()))
            .order(quote_requests::created_at.desc())
            .select(QuoteRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(QuoteRequest::from).collect())
    }
}
