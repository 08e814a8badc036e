//! PostgreSQL-backed `QuoteResponseRepository` implementation.
//!
//! Response ordering is assigned inside a transaction that holds a row lock
//! on the parent quote request. Concurrent submissions for the same request
//! therefore serialise on that lock: each sees the committed count of its
//! predecessors, so at most three orders are ever handed out. The unique
//! constraints on `(quote_request_id, response_order)` and
//! `(quote_request_id, professional_id)` back this up at the storage layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{InsertOutcome, QuoteResponseRepository, QuoteResponseRepositoryError};
use crate::domain::{
    NewQuoteResponse, QuoteRequestId, QuoteResponse, QuoteResponseId, QuoteResponseStatus,
    ResponseOrder,
};

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error, map_row_error};
use super::models::{NewQuoteResponseRow, QuoteResponseRow};
use super::pool::DbPool;
use super::schema::{quote_requests, quote_responses};

const ORDER_CONSTRAINT: &str = "quote_responses_order_key";
const PROFESSIONAL_CONSTRAINT: &str = "quote_responses_professional_key";

/// Diesel-backed implementation of the quote response repository port.
#[derive(Clone)]
pub struct DieselQuoteResponseRepository {
    pool: DbPool,
}

impl DieselQuoteResponseRepository {
    /// Create a repository over the shared connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn diesel_error(error: DieselError) -> QuoteResponseRepositoryError {
    map_diesel_error(
        error,
        QuoteResponseRepositoryError::query,
        QuoteResponseRepositoryError::connection,
    )
}

fn to_domain(row: QuoteResponseRow) -> Result<QuoteResponse, QuoteResponseRepositoryError> {
    QuoteResponse::try_from(row).map_err(|err| map_row_error(err, QuoteResponseRepositoryError::query))
}

/// Locked read-count-insert. Runs inside the caller's transaction.
async fn assign_next_order(
    conn: &mut AsyncPgConnection,
    response: &NewQuoteResponse,
) -> Result<InsertOutcome, DieselError> {
    let request_id = *response.quote_request_id.as_uuid();
    let locked: Option<Uuid> = quote_requests::table
        .filter(quote_requests::id.eq(request_id))
        .select(quote_requests::id)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    if locked.is_none() {
        return Ok(InsertOutcome::RequestMissing);
    }

    let existing: Vec<Uuid> = quote_responses::table
        .filter(quote_responses::quote_request_id.eq(request_id))
        .select(quote_responses::professional_id)
        .load(conn)
        .await?;
    if existing.contains(response.professional_id.as_uuid()) {
        return Ok(InsertOutcome::AlreadyResponded);
    }
    let Some(order) = ResponseOrder::next_after(existing.len()) else {
        return Ok(InsertOutcome::CapacityReached);
    };

    diesel::insert_into(quote_responses::table)
        .values(NewQuoteResponseRow {
            id: *response.id.as_uuid(),
            quote_request_id: request_id,
            professional_id: *response.professional_id.as_uuid(),
            quote_amount_cents: response.quote_amount.cents(),
            quote_details: response.quote_details.as_deref(),
            response_order: i16::from(order.get()),
            status: QuoteResponseStatus::Pending.as_str(),
            created_at: response.created_at,
        })
        .execute(conn)
        .await?;
    debug!(
        quote_request_id = %request_id,
        response_order = order.get(),
        "quote response order assigned"
    );
    Ok(InsertOutcome::Inserted(response.clone().into_response(order)))
}

#[async_trait]
impl QuoteResponseRepository for DieselQuoteResponseRepository {
    async fn insert_next(
        &self,
        response: NewQuoteResponse,
    ) -> Result<InsertOutcome, QuoteResponseRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QuoteResponseRepositoryError::connection))?;

        let outcome = conn
            .transaction(|conn| async move { assign_next_order(conn, &response).await }.scope_boxed())
            .await;

        match outcome {
            Ok(outcome) => Ok(outcome),
            Err(err) if is_unique_violation(&err, PROFESSIONAL_CONSTRAINT) => {
                Ok(InsertOutcome::AlreadyResponded)
            }
            Err(err) if is_unique_violation(&err, ORDER_CONSTRAINT) => {
                Ok(InsertOutcome::CapacityReached)
            }
            Err(err) => Err(diesel_error(err)),
        }
    }

    async fn find_by_id(
        &self,
        id: &QuoteResponseId,
    ) -> Result<Option<QuoteResponse>, QuoteResponseRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QuoteResponseRepositoryError::connection))?;

        quote_responses::table
            .filter(quote_responses::id.eq(id.as_uuid()))
            .select(QuoteResponseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn list_for_request(
        &self,
        quote_request_id: &QuoteRequestId,
    ) -> Result<Vec<QuoteResponse>, QuoteResponseRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QuoteResponseRepositoryError::connection))?;

        quote_responses::table
            .filter(quote_responses::quote_request_id.eq(quote_request_id.as_uuid()))
            .order(quote_responses::response_order.asc())
            .select(QuoteResponseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn decide(
        &self,
        id: &QuoteResponseId,
        status: QuoteResponseStatus,
        accepted_at: Option<DateTime<Utc>>,
    ) -> Result<bool, QuoteResponseRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QuoteResponseRepositoryError::connection))?;

        let updated = diesel::update(
            quote_responses::table
                .filter(quote_responses::id.eq(id.as_uuid()))
                .filter(quote_responses::status.eq(QuoteResponseStatus::Pending.as_str())),
        )
        .set((
            quote_responses::status.eq(status.as_str()),
            quote_responses::accepted_at.eq(accepted_at),
        ))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(updated == 1)
    }
}
