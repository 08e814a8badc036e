//! PostgreSQL-backed `ProfessionalRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProfessionalRepository, ProfessionalRepositoryError};
use crate::domain::{Professional, ProfessionalId, UserId};

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error, map_row_error};
use super::models::{NewProfessionalRow, ProfessionalRow};
use super::pool::DbPool;
use super::schema::professionals;

const OWNER_CONSTRAINT: &str = "professionals_user_id_key";

/// Diesel-backed implementation of the professional repository port.
#[derive(Clone)]
pub struct DieselProfessionalRepository {
    pool: DbPool,
}

impl DieselProfessionalRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn diesel_error(error: diesel::result::Error) -> ProfessionalRepositoryError {
    map_diesel_error(
        error,
        ProfessionalRepositoryError::query,
        ProfessionalRepositoryError::connection,
    )
}

fn to_domain(row: ProfessionalRow) -> Result<Professional, ProfessionalRepositoryError> {
    Professional::try_from(row).map_err(|err| map_row_error(err, ProfessionalRepositoryError::query))
}

/// Escape `LIKE` metacharacters so user text matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ProfessionalRepository for DieselProfessionalRepository {
    async fn insert(&self, professional: &Professional) -> Result<(), ProfessionalRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProfessionalRepositoryError::connection))?;

        diesel::insert_into(professionals::table)
            .values(NewProfessionalRow::from(professional))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err, OWNER_CONSTRAINT) {
                    ProfessionalRepositoryError::duplicate_owner(professional.user_id.to_string())
                } else {
                    diesel_error(err)
                }
            })
    }

    async fn find_by_id(
        &self,
        id: &ProfessionalId,
    ) -> Result<Option<Professional>, ProfessionalRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProfessionalRepositoryError::connection))?;

        professionals::table
            .filter(professionals::id.eq(id.as_uuid()))
            .select(ProfessionalRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Professional>, ProfessionalRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProfessionalRepositoryError::connection))?;

        professionals::table
            .filter(professionals::user_id.eq(user_id.as_uuid()))
            .select(ProfessionalRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn search_by_specialty(
        &self,
        service_category: &str,
    ) -> Result<Vec<Professional>, ProfessionalRepositoryError> {
        if service_category.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProfessionalRepositoryError::connection))?;

        professionals::table
            .filter(professionals::specialty.ilike(like_pattern(service_category)))
            .order(professionals::created_at.asc())
            .select(ProfessionalRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn claim_payout_account(
        &self,
        id: &ProfessionalId,
        account_id: &str,
    ) -> Result<String, ProfessionalRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProfessionalRepositoryError::connection))?;

        diesel::update(
            professionals::table
                .filter(professionals::id.eq(id.as_uuid()))
                .filter(professionals::payout_account_id.is_null()),
        )
        .set(professionals::payout_account_id.eq(account_id))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        professionals::table
            .filter(professionals::id.eq(id.as_uuid()))
            .select(professionals::payout_account_id)
            .first::<Option<String>>(&mut conn)
            .await
            .map_err(diesel_error)?
            .ok_or_else(|| ProfessionalRepositoryError::query("payout account was not stored"))
    }

    async fn set_payout_onboarding_complete(
        &self,
        id: &ProfessionalId,
        complete: bool,
    ) -> Result<(), ProfessionalRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProfessionalRepositoryError::connection))?;

        diesel::update(professionals::table.filter(professionals::id.eq(id.as_uuid())))
            .set(professionals::payout_onboarding_complete.eq(complete))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn mark_sponsored(
        &self,
        id: &ProfessionalId,
        until: DateTime<Utc>,
    ) -> Result<(), ProfessionalRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProfessionalRepositoryError::connection))?;

        diesel::update(professionals::table.filter(professionals::id.eq(id.as_uuid())))
            .set((
                professionals::is_sponsored.eq(true),
                professionals::sponsored_until.eq(Some(until)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }
}
