//! Port for best-effort notification delivery.
//!
//! Dispatch hands a notification to an outbound queue and returns at once.
//! Persistence and realtime publication happen off the caller's path, so a
//! failed notification never fails the operation that produced it.

use tracing::warn;

use crate::domain::NewNotification;

use super::define_port_error;

define_port_error! {
    /// Reasons a notification could not be queued.
    pub enum NotificationDispatchError {
        /// The queue is at capacity.
        QueueFull => "notification queue is full",
        /// The worker has shut down.
        Closed => "notification queue is closed",
    }
}

/// Port for enqueueing notifications.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationDispatcher: Send + Sync {
    /// Queue a notification without waiting for delivery.
    fn dispatch(&self, notification: NewNotification) -> Result<(), NotificationDispatchError>;
}

/// Queue a notification, logging and dropping it on failure.
///
/// Returns whether the notification was queued.
pub fn dispatch_best_effort(
    dispatcher: &dyn NotificationDispatcher,
    notification: NewNotification,
) -> bool {
    let user_id = notification.user_id;
    match dispatcher.dispatch(notification) {
        Ok(()) => true,
        Err(err) => {
            warn!(user_id = %user_id, error = %err, "dropping notification");
            false
        }
    }
}

/// Fixture dispatcher that silently discards notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationDispatcher;

impl NotificationDispatcher for FixtureNotificationDispatcher {
    fn dispatch(&self, _notification: NewNotification) -> Result<(), NotificationDispatchError> {
        Ok(())
    }
}
