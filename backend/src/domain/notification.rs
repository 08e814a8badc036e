//! In-app notifications and the messages the marketplace sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{NotificationId, QuoteRequestId, UserId};

/// A stored notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification queued for best-effort delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    fn quote_request(
        user_id: UserId,
        title: &str,
        message: String,
        quote_request_id: QuoteRequestId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::random(),
            user_id,
            title: title.to_owned(),
            message,
            link: Some(format!("/quote-request/{quote_request_id}")),
            created_at,
        }
    }

    /// Fan-out message to a matching professional.
    pub fn new_quote_request(
        professional_user: UserId,
        quote_request_id: QuoteRequestId,
        service_category: &str,
        zipcode: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::quote_request(
            professional_user,
            "New Quote Request",
            format!(
                "New {service_category} quote request in {zipcode}. Be one of the first 3 to respond!"
            ),
            quote_request_id,
            created_at,
        )
    }

    /// Message to the customer when a professional responds.
    pub fn new_quote_received(
        customer: UserId,
        quote_request_id: QuoteRequestId,
        service_category: &str,
        zipcode: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::quote_request(
            customer,
            "New Quote Received",
            format!("You received a new quote for {service_category} in {zipcode}."),
            quote_request_id,
            created_at,
        )
    }

    /// Message to the professional when the customer accepts their quote.
    pub fn quote_accepted(
        professional_user: UserId,
        quote_request_id: QuoteRequestId,
        service_category: &str,
        zipcode: &str,
        window_minutes: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::quote_request(
            professional_user,
            "Quote Accepted",
            format!(
                "Your quote for {service_category} in {zipcode} was accepted. Please confirm within {window_minutes} minutes."
            ),
            quote_request_id,
            created_at,
        )
    }

    /// The stored form, unread.
    pub fn into_notification(self) -> Notification {
        Notification {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            link: self.link,
            read: false,
            created_at: self.created_at,
        }
    }
}
