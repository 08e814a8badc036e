//! PostgreSQL-backed `NotificationRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{Notification, NotificationId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NotificationRow;
use super::pool::DbPool;
use super::schema::notifications;

/// Diesel-backed implementation of the notification repository port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a repository over the shared connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    map_diesel_error(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, NotificationRepositoryError::connection))?;

        diesel::insert_into(notifications::table)
            .values(NotificationRow::from(notification))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, NotificationRepositoryError::connection))?;

        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::user_id.eq(user_id.as_uuid()))
            .order(notifications::created_at.desc())
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn mark_read(
        &self,
        id: &NotificationId,
        user_id: &UserId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, NotificationRepositoryError::connection))?;

        let updated = diesel::update(
            notifications::table
                .filter(notifications::id.eq(id.as_uuid()))
                .filter(notifications::user_id.eq(user_id.as_uuid())),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(updated == 1)
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, NotificationRepositoryError::connection))?;

        let updated = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id.as_uuid()))
                .filter(notifications::read.eq(false)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(u64::try_from(updated).unwrap_or(u64::MAX))
    }
}
