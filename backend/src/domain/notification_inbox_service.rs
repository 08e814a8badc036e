//! Per-user notification inbox.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{NotificationInbox, NotificationRepository};
use crate::domain::service_errors::map_notification_error;
use crate::domain::{Error, Notification, NotificationId, UserId};

/// Domain service implementing [`NotificationInbox`].
#[derive(Clone)]
pub struct NotificationInboxService<N> {
    notification_repo: Arc<N>,
}

impl<N> NotificationInboxService<N> {
    /// Create the inbox service.
    pub fn new(notification_repo: Arc<N>) -> Self {
        Self { notification_repo }
    }
}

#[async_trait]
impl<N> NotificationInbox for NotificationInboxService<N>
where
    N: NotificationRepository,
{
    async fn list(&self, user_id: &UserId) -> Result<Vec<Notification>, Error> {
        self.notification_repo
            .list_for_user(user_id)
            .await
            .map_err(map_notification_error)
    }

    async fn mark_read(&self, user_id: &UserId, id: &NotificationId) -> Result<(), Error> {
        let updated = self
            .notification_repo
            .mark_read(id, user_id)
            .await
            .map_err(map_notification_error)?;
        if updated {
            Ok(())
        } else {
            Err(Error::not_found("Notification not found"))
        }
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, Error> {
        self.notification_repo
            .mark_all_read(user_id)
            .await
            .map_err(map_notification_error)
    }
}
