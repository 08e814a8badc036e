//! Port for the realtime notification feed.
//!
//! The feed is a cache-invalidation hint layered over the inbox. A subscriber
//! that falls behind receives [`FeedEvent::Resync`] and must re-read the inbox.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::domain::{Notification, UserId};

/// Event delivered to a realtime subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// A notification addressed to the subscriber was stored.
    Notification(Notification),
    /// Events were missed; re-read the inbox.
    Resync,
}

/// One user's view of the broadcast feed.
#[derive(Debug)]
pub struct NotificationSubscription {
    user_id: UserId,
    receiver: broadcast::Receiver<Notification>,
}

impl NotificationSubscription {
    /// Filter `receiver` down to notifications for `user_id`.
    pub fn new(user_id: UserId, receiver: broadcast::Receiver<Notification>) -> Self {
        Self { user_id, receiver }
    }

    /// Next event for this user, or `None` once the feed has closed.
    pub async fn next(&mut self) -> Option<FeedEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) if notification.user_id == self.user_id => {
                    return Some(FeedEvent::Notification(notification));
                }
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => return Some(FeedEvent::Resync),
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

/// Port for publishing stored notifications to connected clients.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationFeed: Send + Sync {
    /// Publish a stored notification. Having no subscribers is not an error.
    fn publish(&self, notification: Notification);

    /// Subscribe to notifications addressed to `user_id`.
    fn subscribe(&self, user_id: UserId) -> NotificationSubscription;
}

/// Fixture feed whose subscriptions end immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationFeed;

impl NotificationFeed for FixtureNotificationFeed {
    fn publish(&self, _notification: Notification) {}

    fn subscribe(&self, user_id: UserId) -> NotificationSubscription {
        let (_sender, receiver) = broadcast::channel(1);
        NotificationSubscription::new(user_id, receiver)
    }
}
