//! Shared builders and doubles for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    Booking, BookingDetails, CustomerContact, Money, Professional, ProfessionalId, QuoteRequest,
    QuoteRequestId, UserId,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn plumber(user_id: UserId) -> Professional {
    Professional {
        id: ProfessionalId::random(),
        user_id,
        name: "Pat Pipes".to_owned(),
        specialty: "Plumbing".to_owned(),
        hourly_rate: Money::from_cents(8_000).expect("rate"),
        service_zipcodes: vec!["10001".to_owned()],
        phone: "555-0100".to_owned(),
        bio: None,
        verified: true,
        is_sponsored: false,
        sponsored_until: None,
        payout_account_id: Some("acct_pat".to_owned()),
        payout_onboarding_complete: true,
        created_at: fixture_timestamp(),
    }
}

pub(crate) fn quote_request(customer_id: UserId) -> QuoteRequest {
    QuoteRequest {
        id: QuoteRequestId::random(),
        customer_id,
        service_category: "Plumbing".to_owned(),
        description: "Leaking kitchen tap".to_owned(),
        zipcode: "10001".to_owned(),
        timeline: None,
        budget: None,
        contact: CustomerContact::default(),
        created_at: fixture_timestamp(),
    }
}

pub(crate) fn booking_details() -> BookingDetails {
    BookingDetails {
        service_description: "Replace water heater".to_owned(),
        preferred_date: None,
        preferred_time: None,
        customer_name: "Casey Customer".to_owned(),
        customer_email: "casey@example.test".to_owned(),
        customer_phone: "555-0199".to_owned(),
        customer_address: None,
        notes: None,
    }
}

pub(crate) fn booking(professional_id: ProfessionalId, customer_id: UserId) -> Booking {
    Booking::new(
        professional_id,
        customer_id,
        booking_details(),
        fixture_timestamp(),
    )
}
