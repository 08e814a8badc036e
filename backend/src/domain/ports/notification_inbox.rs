//! Driving port for the caller's notification inbox.

use async_trait::async_trait;

use crate::domain::{Error, Notification, NotificationId, UserId};

/// Driving port for reading and acknowledging notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    /// Newest first.
    async fn list(&self, user_id: &UserId) -> Result<Vec<Notification>, Error>;

    /// Mark one notification read; `not_found` unless it is the caller's.
    async fn mark_read(&self, user_id: &UserId, id: &NotificationId) -> Result<(), Error>;

    /// Mark everything read and return how many changed.
    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, Error>;
}
