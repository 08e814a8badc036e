//! Notification delivery adapters: the best-effort queue and the realtime
//! broadcast feed.

mod broadcast_feed;
mod queued_dispatcher;

pub use broadcast_feed::{BroadcastNotificationFeed, DEFAULT_FEED_CAPACITY};
pub use queued_dispatcher::{
    DEFAULT_QUEUE_CAPACITY, NotificationWorker, QueuedNotificationDispatcher,
};
