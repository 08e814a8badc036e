//! Mutex-guarded tables implementing every repository port.
//!
//! Each operation runs under one lock, so the capacity check and order
//! assignment in [`QuoteResponseRepository::insert_next`] are as atomic here
//! as the locked transaction in the PostgreSQL adapter.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, BookingStatusUpdate, InsertOutcome,
    NotificationRepository, NotificationRepositoryError, PaymentIntentRecord, PaymentSettlement,
    ProfessionalRepository, ProfessionalRepositoryError, QuoteRequestRepository,
    QuoteRequestRepositoryError, QuoteResponseRepository, QuoteResponseRepositoryError,
};
use crate::domain::{
    Booking, BookingId, BookingStatus, NewQuoteResponse, Notification, NotificationId,
    PaymentStatus, Professional, ProfessionalId, QuoteRequest, QuoteRequestId, QuoteResponse,
    QuoteResponseId, QuoteResponseStatus, ResponseOrder, UserId,
};

#[derive(Default)]
struct Tables {
    professionals: Vec<Professional>,
    requests: Vec<QuoteRequest>,
    responses: Vec<QuoteResponse>,
    bookings: Vec<Booking>,
    notifications: Vec<Notification>,
}

/// Shared in-memory database. Clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every stored response for a request, in commit order.
    pub fn responses_for(&self, quote_request_id: &QuoteRequestId) -> Vec<QuoteResponse> {
        let mut responses: Vec<_> = self
            .lock()
            .responses
            .iter()
            .filter(|response| response.quote_request_id == *quote_request_id)
            .cloned()
            .collect();
        responses.sort_by_key(|response| response.response_order);
        responses
    }

    /// Every stored notification, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }
}

fn newest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

#[async_trait]
impl ProfessionalRepository for InMemoryStore {
    async fn insert(&self, professional: &Professional) -> Result<(), ProfessionalRepositoryError> {
        let mut tables = self.lock();
        if tables
            .professionals
            .iter()
            .any(|existing| existing.user_id == professional.user_id)
        {
            return Err(ProfessionalRepositoryError::duplicate_owner(
                professional.user_id.to_string(),
            ));
        }
        tables.professionals.push(professional.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ProfessionalId,
    ) -> Result<Option<Professional>, ProfessionalRepositoryError> {
        Ok(self
            .lock()
            .professionals
            .iter()
            .find(|professional| professional.id == *id)
            .cloned())
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Professional>, ProfessionalRepositoryError> {
        Ok(self
            .lock()
            .professionals
            .iter()
            .find(|professional| professional.user_id == *user_id)
            .cloned())
    }

    async fn search_by_specialty(
        &self,
        category: &str,
    ) -> Result<Vec<Professional>, ProfessionalRepositoryError> {
        Ok(self
            .lock()
            .professionals
            .iter()
            .filter(|professional| professional.offers(category))
            .cloned()
            .collect())
    }

    async fn claim_payout_account(
        &self,
        id: &ProfessionalId,
        account_id: &str,
    ) -> Result<String, ProfessionalRepositoryError> {
        let mut tables = self.lock();
        let professional = tables
            .professionals
            .iter_mut()
            .find(|professional| professional.id == *id)
            .ok_or_else(|| ProfessionalRepositoryError::query(format!("professional {id} missing")))?;
        Ok(professional
            .payout_account_id
            .get_or_insert_with(|| account_id.to_owned())
            .clone())
    }

    async fn set_payout_onboarding_complete(
        &self,
        id: &ProfessionalId,
        complete: bool,
    ) -> Result<(), ProfessionalRepositoryError> {
        if let Some(professional) = self
            .lock()
            .professionals
            .iter_mut()
            .find(|professional| professional.id == *id)
        {
            professional.payout_onboarding_complete = complete;
        }
        Ok(())
    }

    async fn mark_sponsored(
        &self,
        id: &ProfessionalId,
        until: DateTime<Utc>,
    ) -> Result<(), ProfessionalRepositoryError> {
        if let Some(professional) = self
            .lock()
            .professionals
            .iter_mut()
            .find(|professional| professional.id == *id)
        {
            professional.is_sponsored = true;
            professional.sponsored_until = Some(until);
        }
        Ok(())
    }
}

#[async_trait]
impl QuoteRequestRepository for InMemoryStore {
    async fn insert(&self, request: &QuoteRequest) -> Result<(), QuoteRequestRepositoryError> {
        self.lock().requests.push(request.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &QuoteRequestId,
    ) -> Result<Option<QuoteRequest>, QuoteRequestRepositoryError> {
        Ok(self
            .lock()
            .requests
            .iter()
            .find(|request| request.id == *id)
            .cloned())
    }

    async fn list_for_customer(
        &self,
        customer_id: &UserId,
    ) -> Result<Vec<QuoteRequest>, QuoteRequestRepositoryError> {
        let rows = self
            .lock()
            .requests
            .iter()
            .filter(|request| request.customer_id == *customer_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |request| request.created_at))
    }
}

#[async_trait]
impl QuoteResponseRepository for InMemoryStore {
    async fn insert_next(
        &self,
        response: NewQuoteResponse,
    ) -> Result<InsertOutcome, QuoteResponseRepositoryError> {
        let mut tables = self.lock();
        if !tables
            .requests
            .iter()
            .any(|request| request.id == response.quote_request_id)
        {
            return Ok(InsertOutcome::RequestMissing);
        }
        let existing: Vec<&QuoteResponse> = tables
            .responses
            .iter()
            .filter(|stored| stored.quote_request_id == response.quote_request_id)
            .collect();
        if existing
            .iter()
            .any(|stored| stored.professional_id == response.professional_id)
        {
            return Ok(InsertOutcome::AlreadyResponded);
        }
        let Some(order) = ResponseOrder::next_after(existing.len()) else {
            return Ok(InsertOutcome::CapacityReached);
        };
        let stored = response.into_response(order);
        tables.responses.push(stored.clone());
        Ok(InsertOutcome::Inserted(stored))
    }

    async fn find_by_id(
        &self,
        id: &QuoteResponseId,
    ) -> Result<Option<QuoteResponse>, QuoteResponseRepositoryError> {
        Ok(self
            .lock()
            .responses
            .iter()
            .find(|response| response.id == *id)
            .cloned())
    }

    async fn list_for_request(
        &self,
        quote_request_id: &QuoteRequestId,
    ) -> Result<Vec<QuoteResponse>, QuoteResponseRepositoryError> {
        Ok(self.responses_for(quote_request_id))
    }

    async fn decide(
        &self,
        id: &QuoteResponseId,
        status: QuoteResponseStatus,
        accepted_at: Option<DateTime<Utc>>,
    ) -> Result<bool, QuoteResponseRepositoryError> {
        let mut tables = self.lock();
        match tables
            .responses
            .iter_mut()
            .find(|response| response.id == *id && response.status == QuoteResponseStatus::Pending)
        {
            Some(response) => {
                response.status = status;
                response.accepted_at = accepted_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        self.lock().bookings.push(booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(self
            .lock()
            .bookings
            .iter()
            .find(|booking| booking.id == *id)
            .cloned())
    }

    async fn list_for_customer(
        &self,
        customer_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let rows = self
            .lock()
            .bookings
            .iter()
            .filter(|booking| booking.customer_id == *customer_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |booking| booking.created_at))
    }

    async fn list_for_professional(
        &self,
        professional_id: &ProfessionalId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let rows = self
            .lock()
            .bookings
            .iter()
            .filter(|booking| booking.professional_id == *professional_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |booking| booking.created_at))
    }

    async fn record_payment_intent(
        &self,
        id: &BookingId,
        record: &PaymentIntentRecord,
    ) -> Result<bool, BookingRepositoryError> {
        let mut tables = self.lock();
        match tables
            .bookings
            .iter_mut()
            .find(|booking| booking.id == *id && booking.payment_status != PaymentStatus::Paid)
        {
            Some(booking) => {
                booking.payment_status = PaymentStatus::Pending;
                booking.payment_intent_id = Some(record.intent_id.clone());
                booking.amount = Some(record.amount);
                booking.platform_fee = Some(record.platform_fee);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_paid(
        &self,
        id: &BookingId,
    ) -> Result<Option<PaymentSettlement>, BookingRepositoryError> {
        let mut tables = self.lock();
        let Some(booking) = tables.bookings.iter_mut().find(|booking| booking.id == *id) else {
            return Ok(None);
        };
        let transitioned = booking.payment_status != PaymentStatus::Paid
            && booking.status.accepts_payment();
        if transitioned {
            booking.payment_status = PaymentStatus::Paid;
            if booking.status == BookingStatus::Pending {
                booking.status = BookingStatus::Confirmed;
            }
        }
        Ok(Some(PaymentSettlement {
            booking: booking.clone(),
            transitioned,
        }))
    }

    async fn update_status(
        &self,
        id: &BookingId,
        update: BookingStatusUpdate,
    ) -> Result<bool, BookingRepositoryError> {
        let mut tables = self.lock();
        match tables.bookings.iter_mut().find(|booking| {
            booking.id == *id
                && booking.status == update.from
                && !(update.require_unpaid && booking.payment_status == PaymentStatus::Paid)
        }) {
            Some(booking) => {
                booking.status = update.to;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        self.lock().notifications.push(notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let rows = self
            .lock()
            .notifications
            .iter()
            .filter(|notification| notification.user_id == *user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |notification| notification.created_at))
    }

    async fn mark_read(
        &self,
        id: &NotificationId,
        user_id: &UserId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut tables = self.lock();
        match tables
            .notifications
            .iter_mut()
            .find(|notification| notification.id == *id && notification.user_id == *user_id)
        {
            Some(notification) => {
                notification.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut updated = 0;
        for notification in self
            .lock()
            .notifications
            .iter_mut()
            .filter(|notification| notification.user_id == *user_id && !notification.read)
        {
            notification.read = true;
            updated += 1;
        }
        Ok(updated)
    }
}
