//! In-process realtime feed over a Tokio broadcast channel.

use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::ports::{NotificationFeed, NotificationSubscription};
use crate::domain::{Notification, UserId};

/// Default number of notifications buffered for slow subscribers.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Broadcast feed shared by every websocket session.
///
/// Each subscriber filters the shared stream down to its own user. A
/// subscriber that falls more than `capacity` notifications behind is told
/// to resync rather than replayed.
#[derive(Debug, Clone)]
pub struct BroadcastNotificationFeed {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastNotificationFeed {
    /// Feed retaining the last `capacity` notifications for slow subscribers.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
}

impl Default for BroadcastNotificationFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl NotificationFeed for BroadcastNotificationFeed {
    fn publish(&self, notification: Notification) {
        // `send` only fails when nobody is listening.
        if let Ok(receivers) = self.sender.send(notification) {
            trace!(receivers, "notification published");
        }
    }

    fn subscribe(&self, user_id: UserId) -> NotificationSubscription {
        NotificationSubscription::new(user_id, self.sender.subscribe())
    }
}
