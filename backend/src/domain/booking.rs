//! Direct bookings and their two state machines.
//!
//! `status` tracks the job itself; `payment_status` tracks the escrowed
//! charge. They advance independently except where payment verification
//! confirms a pending booking and cancellation is blocked once paid.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{BookingId, Money, ProfessionalId, UserId};

/// Job status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    ConfirmedCompleted,
    Cancelled,
}

/// Payment status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Paid,
}

/// Unknown status text read from storage or the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl BookingStatus {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::ConfirmedCompleted => "confirmed_completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a checkout may still be opened or settled for the booking.
    pub const fn accepts_payment(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl FromStr for BookingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "confirmed_completed" => Ok(Self::ConfirmedCompleted),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseStatusError {
                kind: "booking status",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PaymentStatus {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(ParseStatusError {
                kind: "payment status",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a booking is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingParty {
    Customer,
    Professional,
}

/// Status actions available on a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    /// Professional accepts the job.
    Confirm,
    /// Professional marks the job done.
    Complete,
    /// Customer confirms the job was done.
    ConfirmCompletion,
    /// Either party calls the booking off before payment.
    Cancel,
}

/// Rejected booking actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BookingActionError {
    #[error("only the {required:?} side of the booking may {action}")]
    WrongParty {
        action: BookingAction,
        required: BookingParty,
    },
    #[error("cannot {action} a booking that is {status}")]
    InvalidState {
        action: BookingAction,
        status: BookingStatus,
    },
    #[error("a paid booking cannot be cancelled")]
    AlreadyPaid,
}

impl BookingAction {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Complete => "complete",
            Self::ConfirmCompletion => "confirm_completion",
            Self::Cancel => "cancel",
        }
    }

    fn required_party(self) -> Option<BookingParty> {
        match self {
            Self::Confirm | Self::Complete => Some(BookingParty::Professional),
            Self::ConfirmCompletion => Some(BookingParty::Customer),
            Self::Cancel => None,
        }
    }

    /// Resolve the status this action moves the booking to.
    pub fn apply(
        self,
        party: BookingParty,
        status: BookingStatus,
        payment_status: PaymentStatus,
    ) -> Result<BookingStatus, BookingActionError> {
        if let Some(required) = self.required_party().filter(|required| *required != party) {
            return Err(BookingActionError::WrongParty {
                action: self,
                required,
            });
        }

        let invalid = || BookingActionError::InvalidState {
            action: self,
            status,
        };
        match (self, status) {
            (Self::Confirm, BookingStatus::Pending) => Ok(BookingStatus::Confirmed),
            (Self::Complete, BookingStatus::Confirmed) => Ok(BookingStatus::Completed),
            (Self::ConfirmCompletion, BookingStatus::Completed) => {
                Ok(BookingStatus::ConfirmedCompleted)
            }
            (Self::Cancel, BookingStatus::Pending | BookingStatus::Confirmed) => {
                if payment_status == PaymentStatus::Paid {
                    Err(BookingActionError::AlreadyPaid)
                } else {
                    Ok(BookingStatus::Cancelled)
                }
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingAction {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirm" => Ok(Self::Confirm),
            "complete" => Ok(Self::Complete),
            "confirm_completion" => Ok(Self::ConfirmCompletion),
            "cancel" => Ok(Self::Cancel),
            other => Err(ParseStatusError {
                kind: "booking action",
                value: other.to_owned(),
            }),
        }
    }
}

/// Customer-supplied booking details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    pub service_description: String,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub notes: Option<String>,
}

/// Validation failures for [`BookingDetails`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingValidationError {
    #[error("serviceDescription must not be empty")]
    EmptyDescription,
    #[error("customerName must not be empty")]
    EmptyName,
    #[error("customerEmail must not be empty")]
    EmptyEmail,
    #[error("customerPhone must not be empty")]
    EmptyPhone,
}

fn required(value: String, error: BookingValidationError) -> Result<String, BookingValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(error)
    } else {
        Ok(trimmed.to_owned())
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

impl BookingDetails {
    /// Trim every field and check the required ones.
    pub fn normalised(self) -> Result<Self, BookingValidationError> {
        Ok(Self {
            service_description: required(
                self.service_description,
                BookingValidationError::EmptyDescription,
            )?,
            preferred_date: self.preferred_date,
            preferred_time: optional(self.preferred_time),
            customer_name: required(self.customer_name, BookingValidationError::EmptyName)?,
            customer_email: required(self.customer_email, BookingValidationError::EmptyEmail)?,
            customer_phone: required(self.customer_phone, BookingValidationError::EmptyPhone)?,
            customer_address: optional(self.customer_address),
            notes: optional(self.notes),
        })
    }
}

/// A direct booking of a professional by a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub professional_id: ProfessionalId,
    pub customer_id: UserId,
    pub details: BookingDetails,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_intent_id: Option<String>,
    pub amount: Option<Money>,
    pub platform_fee: Option<Money>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// A fresh booking awaiting the professional and payment.
    pub fn new(
        professional_id: ProfessionalId,
        customer_id: UserId,
        details: BookingDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BookingId::random(),
            professional_id,
            customer_id,
            details,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_intent_id: None,
            amount: None,
            platform_fee: None,
            created_at,
        }
    }

    /// Job status once a payment is verified.
    ///
    /// Verification confirms a pending booking; later states are kept.
    pub const fn status_after_payment(status: BookingStatus) -> BookingStatus {
        match status {
            BookingStatus::Pending => BookingStatus::Confirmed,
            other => other,
        }
    }

    /// Whether the professional's direct contact may be shown to the customer.
    pub fn reveals_contact(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(BookingAction::Confirm, BookingParty::Professional, BookingStatus::Pending, BookingStatus::Confirmed)]
    #[case(BookingAction::Complete, BookingParty::Professional, BookingStatus::Confirmed, BookingStatus::Completed)]
    #[case(
        BookingAction::ConfirmCompletion,
        BookingParty::Customer,
        BookingStatus::Completed,
        BookingStatus::ConfirmedCompleted
    )]
    #[case(BookingAction::Cancel, BookingParty::Customer, BookingStatus::Pending, BookingStatus::Cancelled)]
    #[case(BookingAction::Cancel, BookingParty::Professional, BookingStatus::Confirmed, BookingStatus::Cancelled)]
    fn allowed_actions_advance_status(
        #[case] action: BookingAction,
        #[case] party: BookingParty,
        #[case] from: BookingStatus,
        #[case] to: BookingStatus,
    ) {
        assert_eq!(action.apply(party, from, PaymentStatus::Unpaid), Ok(to));
    }

    #[rstest]
    fn customer_cannot_confirm() {
        let result = BookingAction::Confirm.apply(
            BookingParty::Customer,
            BookingStatus::Pending,
            PaymentStatus::Unpaid,
        );
        assert!(matches!(result, Err(BookingActionError::WrongParty { .. })));
    }

    #[rstest]
    fn completing_a_pending_booking_is_rejected() {
        let result = BookingAction::Complete.apply(
            BookingParty::Professional,
            BookingStatus::Pending,
            PaymentStatus::Paid,
        );
        assert!(matches!(result, Err(BookingActionError::InvalidState { .. })));
    }

    #[rstest]
    fn paid_bookings_cannot_be_cancelled() {
        let result = BookingAction::Cancel.apply(
            BookingParty::Customer,
            BookingStatus::Confirmed,
            PaymentStatus::Paid,
        );
        assert_eq!(result, Err(BookingActionError::AlreadyPaid));
    }

    #[rstest]
    #[case(BookingStatus::Pending, BookingStatus::Confirmed)]
    #[case(BookingStatus::Confirmed, BookingStatus::Confirmed)]
    #[case(BookingStatus::Completed, BookingStatus::Completed)]
    fn payment_confirms_only_pending_bookings(#[case] from: BookingStatus, #[case] to: BookingStatus) {
        assert_eq!(Booking::status_after_payment(from), to);
    }

    #[rstest]
    #[case(BookingStatus::Pending, true)]
    #[case(BookingStatus::Confirmed, true)]
    #[case(BookingStatus::Completed, true)]
    #[case(BookingStatus::Cancelled, false)]
    fn cancelled_bookings_refuse_payment(#[case] status: BookingStatus, #[case] payable: bool) {
        assert_eq!(status.accepts_payment(), payable);
    }

    #[rstest]
    fn details_are_trimmed_and_checked() {
        let details = BookingDetails {
            service_description: " Fix sink ".to_owned(),
            preferred_date: None,
            preferred_time: Some(" ".to_owned()),
            customer_name: "Ann".to_owned(),
            customer_email: "ann@example.test".to_owned(),
            customer_phone: "555".to_owned(),
            customer_address: None,
            notes: Some(" ring twice ".to_owned()),
        };
        let normalised = details.clone().normalised().expect("valid details");
        assert_eq!(normalised.service_description, "Fix sink");
        assert!(normalised.preferred_time.is_none());
        assert_eq!(normalised.notes.as_deref(), Some("ring twice"));

        let missing_phone = BookingDetails {
            customer_phone: "  ".to_owned(),
            ..details
        };
        assert_eq!(
            missing_phone.normalised(),
            Err(BookingValidationError::EmptyPhone)
        );
    }

    #[rstest]
    fn statuses_round_trip_through_text() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::ConfirmedCompleted,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>(), Ok(status));
        }
        for status in [PaymentStatus::Unpaid, PaymentStatus::Pending, PaymentStatus::Paid] {
            assert_eq!(status.as_str().parse::<PaymentStatus>(), Ok(status));
        }
    }
}
