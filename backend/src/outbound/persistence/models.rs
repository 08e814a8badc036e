//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types validate
//! the stored text enums and money columns; a row that fails is reported as
//! a query error by the calling repository.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Booking, BookingDetails, BookingId, BookingStatus, CustomerContact, Money, Notification,
    NotificationId, PaymentStatus, Professional, ProfessionalId, QuoteRequest, QuoteRequestId,
    QuoteResponse, QuoteResponseId, QuoteResponseStatus, ResponseOrder, UserId,
};

use super::schema::{bookings, notifications, professionals, quote_requests, quote_responses};

/// Reason a stored row could not become a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("corrupt {table} row {id}: {reason}")]
pub(crate) struct RowConversionError {
    table: &'static str,
    id: Uuid,
    reason: String,
}

impl RowConversionError {
    fn new(table: &'static str, id: Uuid, reason: impl ToString) -> Self {
        Self {
            table,
            id,
            reason: reason.to_string(),
        }
    }
}

fn money(table: &'static str, id: Uuid, cents: i64) -> Result<Money, RowConversionError> {
    Money::from_cents(cents).map_err(|err| RowConversionError::new(table, id, err))
}

// ---------------------------------------------------------------------------
// Professionals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = professionals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfessionalRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub hourly_rate_cents: i64,
    pub service_zipcodes: Vec<String>,
    pub phone: String,
    pub bio: Option<String>,
    pub verified: bool,
    pub is_sponsored: bool,
    pub sponsored_until: Option<DateTime<Utc>>,
    pub payout_account_id: Option<String>,
    pub payout_onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProfessionalRow> for Professional {
    type Error = RowConversionError;

    fn try_from(row: ProfessionalRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProfessionalId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            hourly_rate: money("professionals", row.id, row.hourly_rate_cents)?,
            name: row.name,
            specialty: row.specialty,
            service_zipcodes: row.service_zipcodes,
            phone: row.phone,
            bio: row.bio,
            verified: row.verified,
            is_sponsored: row.is_sponsored,
            sponsored_until: row.sponsored_until,
            payout_account_id: row.payout_account_id,
            payout_onboarding_complete: row.payout_onboarding_complete,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = professionals)]
pub(crate) struct NewProfessionalRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: &'a str,
    pub specialty: &'a str,
    pub hourly_rate_cents: i64,
    pub service_zipcodes: &'a [String],
    pub phone: &'a str,
    pub bio: Option<&'a str>,
    pub verified: bool,
    pub is_sponsored: bool,
    pub sponsored_until: Option<DateTime<Utc>>,
    pub payout_account_id: Option<&'a str>,
    pub payout_onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Professional> for NewProfessionalRow<'a> {
    fn from(professional: &'a Professional) -> Self {
        Self {
            id: *professional.id.as_uuid(),
            user_id: *professional.user_id.as_uuid(),
            name: &professional.name,
            specialty: &professional.specialty,
            hourly_rate_cents: professional.hourly_rate.cents(),
            service_zipcodes: &professional.service_zipcodes,
            phone: &professional.phone,
            bio: professional.bio.as_deref(),
            verified: professional.verified,
            is_sponsored: professional.is_sponsored,
            sponsored_until: professional.sponsored_until,
            payout_account_id: professional.payout_account_id.as_deref(),
            payout_onboarding_complete: professional.payout_onboarding_complete,
            created_at: professional.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Quote requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = quote_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct QuoteRequestRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub service_category: String,
    pub description: String,
    pub zipcode: String,
    pub timeline: Option<String>,
    pub budget: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<QuoteRequestRow> for QuoteRequest {
    fn from(row: QuoteRequestRow) -> Self {
        Self {
            id: QuoteRequestId::from_uuid(row.id),
            customer_id: UserId::from_uuid(row.customer_id),
            service_category: row.service_category,
            description: row.description,
            zipcode: row.zipcode,
            timeline: row.timeline,
            budget: row.budget,
            contact: CustomerContact {
                name: row.contact_name,
                email: row.contact_email,
                phone: row.contact_phone,
            },
            created_at: row.created_at,
        }
    }
}

impl From<&QuoteRequest> for QuoteRequestRow {
    fn from(request: &QuoteRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            customer_id: *request.customer_id.as_uuid(),
            service_category: request.service_category.clone(),
            description: request.description.clone(),
            zipcode: request.zipcode.clone(),
            timeline: request.timeline.clone(),
            budget: request.budget.clone(),
            contact_name: request.contact.name.clone(),
            contact_email: request.contact.email.clone(),
            contact_phone: request.contact.phone.clone(),
            created_at: request.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Quote responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = quote_responses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct QuoteResponseRow {
    pub id: Uuid,
    pub quote_request_id: Uuid,
    pub professional_id: Uuid,
    pub quote_amount_cents: i64,
    pub quote_details: Option<String>,
    pub response_order: i16,
    pub status: String,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<QuoteResponseRow> for QuoteResponse {
    type Error = RowConversionError;

    fn try_from(row: QuoteResponseRow) -> Result<Self, Self::Error> {
        let response_order = ResponseOrder::new(row.response_order).ok_or_else(|| {
            RowConversionError::new(
                "quote_responses",
                row.id,
                format!("response_order {} out of range", row.response_order),
            )
        })?;
        let status: QuoteResponseStatus = row
            .status
            .parse()
            .map_err(|err| RowConversionError::new("quote_responses", row.id, err))?;
        Ok(Self {
            id: QuoteResponseId::from_uuid(row.id),
            quote_request_id: QuoteRequestId::from_uuid(row.quote_request_id),
            professional_id: ProfessionalId::from_uuid(row.professional_id),
            quote_amount: money("quote_responses", row.id, row.quote_amount_cents)?,
            quote_details: row.quote_details,
            response_order,
            status,
            accepted_at: row.accepted_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = quote_responses)]
pub(crate) struct NewQuoteResponseRow<'a> {
    pub id: Uuid,
    pub quote_request_id: Uuid,
    pub professional_id: Uuid,
    pub quote_amount_cents: i64,
    pub quote_details: Option<&'a str>,
    pub response_order: i16,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub customer_id: Uuid,
    pub service_description: String,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub payment_intent_id: Option<String>,
    pub amount_cents: Option<i64>,
    pub platform_fee_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RowConversionError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|err| RowConversionError::new("bookings", id, err))?;
        let payment_status: PaymentStatus = row
            .payment_status
            .parse()
            .map_err(|err| RowConversionError::new("bookings", id, err))?;
        let amount = row
            .amount_cents
            .map(|cents| money("bookings", id, cents))
            .transpose()?;
        let platform_fee = row
            .platform_fee_cents
            .map(|cents| money("bookings", id, cents))
            .transpose()?;
        Ok(Self {
            id: BookingId::from_uuid(id),
            professional_id: ProfessionalId::from_uuid(row.professional_id),
            customer_id: UserId::from_uuid(row.customer_id),
            details: BookingDetails {
                service_description: row.service_description,
                preferred_date: row.preferred_date,
                preferred_time: row.preferred_time,
                customer_name: row.customer_name,
                customer_email: row.customer_email,
                customer_phone: row.customer_phone,
                customer_address: row.customer_address,
                notes: row.notes,
            },
            status,
            payment_status,
            payment_intent_id: row.payment_intent_id,
            amount,
            platform_fee,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub(crate) struct NewBookingRow<'a> {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub customer_id: Uuid,
    pub service_description: &'a str,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<&'a str>,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub customer_phone: &'a str,
    pub customer_address: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub status: &'a str,
    pub payment_status: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Booking> for NewBookingRow<'a> {
    fn from(booking: &'a Booking) -> Self {
        let details = &booking.details;
        Self {
            id: *booking.id.as_uuid(),
            professional_id: *booking.professional_id.as_uuid(),
            customer_id: *booking.customer_id.as_uuid(),
            service_description: &details.service_description,
            preferred_date: details.preferred_date,
            preferred_time: details.preferred_time.as_deref(),
            customer_name: &details.customer_name,
            customer_email: &details.customer_email,
            customer_phone: &details.customer_phone,
            customer_address: details.customer_address.as_deref(),
            notes: details.notes.as_deref(),
            status: booking.status.as_str(),
            payment_status: booking.payment_status.as_str(),
            created_at: booking.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            title: row.title,
            message: row.message,
            link: row.link,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

impl From<&Notification> for NotificationRow {
    fn from(notification: &Notification) -> Self {
        Self {
            id: *notification.id.as_uuid(),
            user_id: *notification.user_id.as_uuid(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            link: notification.link.clone(),
            read: notification.read,
            created_at: notification.created_at,
        }
    }
}
