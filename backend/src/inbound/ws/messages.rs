//! Frames pushed to notification stream clients.

use serde::Serialize;

use crate::domain::ports::FeedEvent;
use crate::inbound::http::notifications::NotificationBody;

/// Outbound frame, tagged by `type`.
///
/// ```json
/// {"type":"notification","id":"...","title":"New Quote Received", ...}
/// {"type":"resync"}
/// ```
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedFrame {
    Notification(NotificationBody),
    /// Frames were dropped; the client should re-read its inbox.
    Resync,
}

impl From<FeedEvent> for FeedFrame {
    fn from(value: FeedEvent) -> Self {
        match value {
            FeedEvent::Notification(notification) => Self::Notification(notification.into()),
            FeedEvent::Resync => Self::Resync,
        }
    }
}
