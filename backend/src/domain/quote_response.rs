//! Professional quote responses, their submission order and lifecycle.
//!
//! ## Invariants
//! - A request holds at most [`MAX_RESPONSES_PER_REQUEST`] responses.
//! - Orders are assigned `1..=N` in commit order with no gaps or duplicates.
//! - A professional responds to a request at most once.
//! - Status moves only `pending -> accepted` or `pending -> declined`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::{Money, ProfessionalId, QuoteRequestId, QuoteResponseId};

/// Maximum number of responses a single quote request accepts.
pub const MAX_RESPONSES_PER_REQUEST: u8 = 3;

/// Position of a response within its request, in `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResponseOrder(u8);

impl ResponseOrder {
    /// Order for the next response given how many are already committed.
    ///
    /// Returns `None` once the request is at capacity.
    ///
    /// # Examples
    /// ```
    /// use bluecaller::domain::ResponseOrder;
    ///
    /// assert_eq!(ResponseOrder::next_after(0).map(|order| order.get()), Some(1));
    /// assert!(ResponseOrder::next_after(3).is_none());
    /// ```
    pub fn next_after(existing: usize) -> Option<Self> {
        u8::try_from(existing)
            .ok()
            .filter(|count| *count < MAX_RESPONSES_PER_REQUEST)
            .map(|count| Self(count + 1))
    }

    /// Validate a stored order value.
    pub fn new(value: i16) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|order| (1..=MAX_RESPONSES_PER_REQUEST).contains(order))
            .map(Self)
    }

    /// Raw order value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Lifecycle state of a quote response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteResponseStatus {
    Pending,
    Accepted,
    Declined,
}

/// Outcome of applying a customer decision to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The status moves from pending to the target.
    Applied,
    /// The response already holds the target status.
    Unchanged,
}

/// Rejected lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StatusTransitionError {
    /// Customers may only accept or decline.
    #[error("status must be accepted or declined")]
    InvalidTarget,
    /// A decided response cannot change its decision.
    #[error("quote response is already {from} and cannot become {to}")]
    NotAllowed {
        from: QuoteResponseStatus,
        to: QuoteResponseStatus,
    },
}

impl QuoteResponseStatus {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Check a customer decision against the current state.
    pub fn transition_to(self, target: Self) -> Result<StatusChange, StatusTransitionError> {
        if target == Self::Pending {
            return Err(StatusTransitionError::InvalidTarget);
        }
        match self {
            Self::Pending => Ok(StatusChange::Applied),
            current if current == target => Ok(StatusChange::Unchanged),
            current => Err(StatusTransitionError::NotAllowed {
                from: current,
                to: target,
            }),
        }
    }
}

impl fmt::Display for QuoteResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown quote response status: {0}")]
pub struct ParseQuoteResponseStatusError(pub String);

impl FromStr for QuoteResponseStatus {
    type Err = ParseQuoteResponseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            other => Err(ParseQuoteResponseStatusError(other.to_owned())),
        }
    }
}

/// A professional's bid against a quote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteResponse {
    pub id: QuoteResponseId,
    pub quote_request_id: QuoteRequestId,
    pub professional_id: ProfessionalId,
    pub quote_amount: Money,
    pub quote_details: Option<String>,
    pub response_order: ResponseOrder,
    pub status: QuoteResponseStatus,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Response fields prepared before the store assigns an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuoteResponse {
    pub id: QuoteResponseId,
    pub quote_request_id: QuoteRequestId,
    pub professional_id: ProfessionalId,
    pub quote_amount: Money,
    pub quote_details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewQuoteResponse {
    /// Materialise the committed response once an order is assigned.
    pub fn into_response(self, response_order: ResponseOrder) -> QuoteResponse {
        QuoteResponse {
            id: self.id,
            quote_request_id: self.quote_request_id,
            professional_id: self.professional_id,
            quote_amount: self.quote_amount,
            quote_details: self.quote_details,
            response_order,
            status: QuoteResponseStatus::Pending,
            accepted_at: None,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Some(1))]
    #[case(1, Some(2))]
    #[case(2, Some(3))]
    #[case(3, None)]
    #[case(300, None)]
    fn next_order_stops_at_capacity(#[case] existing: usize, #[case] expected: Option<u8>) {
        assert_eq!(ResponseOrder::next_after(existing).map(ResponseOrder::get), expected);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(3, true)]
    #[case(4, false)]
    fn stored_orders_are_bounded(#[case] raw: i16, #[case] valid: bool) {
        assert_eq!(ResponseOrder::new(raw).is_some(), valid);
    }

    #[rstest]
    #[case(QuoteResponseStatus::Pending, QuoteResponseStatus::Accepted, Ok(StatusChange::Applied))]
    #[case(QuoteResponseStatus::Pending, QuoteResponseStatus::Declined, Ok(StatusChange::Applied))]
    #[case(QuoteResponseStatus::Accepted, QuoteResponseStatus::Accepted, Ok(StatusChange::Unchanged))]
    #[case(QuoteResponseStatus::Declined, QuoteResponseStatus::Declined, Ok(StatusChange::Unchanged))]
    #[case(
        QuoteResponseStatus::Declined,
        QuoteResponseStatus::Accepted,
        Err(StatusTransitionError::NotAllowed {
            from: QuoteResponseStatus::Declined,
            to: QuoteResponseStatus::Accepted,
        })
    )]
    #[case(
        QuoteResponseStatus::Accepted,
        QuoteResponseStatus::Declined,
        Err(StatusTransitionError::NotAllowed {
            from: QuoteResponseStatus::Accepted,
            to: QuoteResponseStatus::Declined,
        })
    )]
    #[case(
        QuoteResponseStatus::Pending,
        QuoteResponseStatus::Pending,
        Err(StatusTransitionError::InvalidTarget)
    )]
    fn lifecycle_transitions_are_explicit(
        #[case] from: QuoteResponseStatus,
        #[case] to: QuoteResponseStatus,
        #[case] expected: Result<StatusChange, StatusTransitionError>,
    ) {
        assert_eq!(from.transition_to(to), expected);
    }

    #[rstest]
    fn status_round_trips_through_text() {
        for status in [
            QuoteResponseStatus::Pending,
            QuoteResponseStatus::Accepted,
            QuoteResponseStatus::Declined,
        ] {
            assert_eq!(status.as_str().parse::<QuoteResponseStatus>(), Ok(status));
        }
        assert!("withdrawn".parse::<QuoteResponseStatus>().is_err());
    }
}
