//! Port for the persisted notification inbox.

use async_trait::async_trait;

use crate::domain::{Notification, NotificationId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification repository query failed: {message}",
    }
}

/// Port for storing notifications and marking them read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persist a notification.
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError>;

    /// A user's notifications, newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Mark one of the user's notifications read. `false` if none matched.
    async fn mark_read(
        &self,
        id: &NotificationId,
        user_id: &UserId,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Mark every unread notification of the user read, returning the count.
    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise the inbox.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationRepository;

#[async_trait]
impl NotificationRepository for FixtureNotificationRepository {
    async fn insert(&self, _notification: &Notification) -> Result<(), NotificationRepositoryError> {
        Ok(())
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        Ok(Vec::new())
    }

    async fn mark_read(
        &self,
        _id: &NotificationId,
        _user_id: &UserId,
    ) -> Result<bool, NotificationRepositoryError> {
        Ok(false)
    }

    async fn mark_all_read(&self, _user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        Ok(0)
    }
}
