//! Bounded notification queue and the worker that drains it.
//!
//! Services enqueue with [`QueuedNotificationDispatcher::dispatch`], which
//! never waits. A single [`NotificationWorker`] persists each notification
//! and then publishes it on the realtime feed. Failures are logged and the
//! notification is dropped; there is no retry.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::domain::NewNotification;
use crate::domain::ports::{
    NotificationDispatchError, NotificationDispatcher, NotificationFeed, NotificationRepository,
};

/// Default queue depth before dispatch starts dropping notifications.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Sending half of the notification queue.
#[derive(Debug, Clone)]
pub struct QueuedNotificationDispatcher {
    sender: mpsc::Sender<NewNotification>,
}

impl QueuedNotificationDispatcher {
    /// Create a dispatcher and the receiver its worker should drain.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NewNotification>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl NotificationDispatcher for QueuedNotificationDispatcher {
    fn dispatch(&self, notification: NewNotification) -> Result<(), NotificationDispatchError> {
        self.sender.try_send(notification).map_err(|err| match err {
            TrySendError::Full(_) => NotificationDispatchError::queue_full(),
            TrySendError::Closed(_) => NotificationDispatchError::closed(),
        })
    }
}

/// Drains the queue into the inbox and the realtime feed.
pub struct NotificationWorker<N> {
    repository: Arc<N>,
    feed: Arc<dyn NotificationFeed>,
}

impl<N> NotificationWorker<N>
where
    N: NotificationRepository + 'static,
{
    /// Build a worker that stores into `repository` and publishes to `feed`.
    pub fn new(repository: Arc<N>, feed: Arc<dyn NotificationFeed>) -> Self {
        Self { repository, feed }
    }

    /// Persist and publish one notification.
    ///
    /// Returns whether the notification was stored.
    pub async fn deliver(&self, notification: NewNotification) -> bool {
        let notification = notification.into_notification();
        match self.repository.insert(&notification).await {
            Ok(()) => {
                debug!(
                    notification_id = %notification.id,
                    user_id = %notification.user_id,
                    "notification stored"
                );
                self.feed.publish(notification);
                true
            }
            Err(err) => {
                error!(
                    user_id = %notification.user_id,
                    error = %err,
                    "failed to store notification"
                );
                false
            }
        }
    }

    /// Run until every dispatcher handle has been dropped.
    pub async fn run(self, mut receiver: mpsc::Receiver<NewNotification>) {
        while let Some(notification) = receiver.recv().await {
            self.deliver(notification).await;
        }
        info!("notification queue closed");
    }

    /// Spawn the worker on the current Tokio runtime.
    pub fn spawn(self, receiver: mpsc::Receiver<NewNotification>) -> JoinHandle<()> {
        tokio::spawn(self.run(receiver))
    }
}
