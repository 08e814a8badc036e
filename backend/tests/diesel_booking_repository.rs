//! Integration tests for `DieselBookingRepository` against embedded PostgreSQL.
//!
//! Payment writes are conditional in SQL; these tests pin down which rows
//! each guarded update is allowed to touch.

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;
#[path = "support/pg_embed.rs"]
mod pg_embed;

use bluecaller::domain::ports::{
    BookingRepository, BookingStatusUpdate, PaymentIntentRecord, ProfessionalRepository,
};
use bluecaller::domain::{
    Booking, BookingDetails, BookingId, BookingStatus, Money, PaymentStatus, Professional,
    ProfessionalId, UserId,
};
use bluecaller::outbound::persistence::{DieselBookingRepository, DieselProfessionalRepository};
use chrono::{SubsecRound, Utc};
use embedded_postgres::{migrated_pool, reset_database};
use pg_embed::{handle_cluster_setup_failure, test_cluster};
use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

const TEST_DB: &str = "diesel_booking_repo_test";

struct TestContext {
    runtime: Runtime,
    _cluster: TestCluster,
    bookings: DieselBookingRepository,
    professional_id: ProfessionalId,
}

impl TestContext {
    /// Store a fresh pending, unpaid booking.
    fn stored_booking(&self) -> Booking {
        let booking = Booking::new(
            self.professional_id,
            UserId::random(),
            BookingDetails {
                service_description: "Replace water heater".to_owned(),
                preferred_date: None,
                preferred_time: None,
                customer_name: "Casey Customer".to_owned(),
                customer_email: "casey@example.test".to_owned(),
                customer_phone: "555-0199".to_owned(),
                customer_address: None,
                notes: None,
            },
            Utc::now().trunc_subsecs(6),
        );
        self.runtime
            .block_on(self.bookings.insert(&booking))
            .expect("booking stored");
        booking
    }

    fn record_intent(&self, id: &BookingId) -> bool {
        self.runtime
            .block_on(self.bookings.record_payment_intent(
                id,
                &PaymentIntentRecord {
                    intent_id: "pi_test".to_owned(),
                    amount: Money::from_unsigned_cents(16_000),
                    platform_fee: Money::from_unsigned_cents(1_600),
                },
            ))
            .expect("record intent")
    }

    fn reload(&self, id: &BookingId) -> Booking {
        self.runtime
            .block_on(self.bookings.find_by_id(id))
            .expect("find booking")
            .expect("booking exists")
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let database_url = reset_database(&cluster, TEST_DB)?;
    let pool = migrated_pool(&runtime, &database_url, 4)?;

    let professional = Professional {
        id: ProfessionalId::random(),
        user_id: UserId::random(),
        name: "Pat Pipes".to_owned(),
        specialty: "Plumbing".to_owned(),
        hourly_rate: Money::from_unsigned_cents(8_000),
        service_zipcodes: vec!["10001".to_owned()],
        phone: "555-0100".to_owned(),
        bio: None,
        verified: true,
        is_sponsored: false,
        sponsored_until: None,
        payout_account_id: Some("acct_pat".to_owned()),
        payout_onboarding_complete: true,
        created_at: Utc::now().trunc_subsecs(6),
    };
    runtime
        .block_on(DieselProfessionalRepository::new(pool.clone()).insert(&professional))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        _cluster: cluster,
        bookings: DieselBookingRepository::new(pool),
        professional_id: professional.id,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn settlement_confirms_once(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: settlement_confirms_once skipped");
        return;
    };
    let booking = context.stored_booking();
    assert!(context.record_intent(&booking.id));

    let first = context
        .runtime
        .block_on(context.bookings.mark_paid(&booking.id))
        .expect("settle")
        .expect("booking exists");
    let second = context
        .runtime
        .block_on(context.bookings.mark_paid(&booking.id))
        .expect("settle again")
        .expect("booking exists");

    assert!(first.transitioned);
    assert_eq!(first.booking.status, BookingStatus::Confirmed);
    assert_eq!(first.booking.payment_status, PaymentStatus::Paid);
    assert!(!second.transitioned);
    assert_eq!(second.booking.payment_status, PaymentStatus::Paid);
    assert_eq!(
        context.reload(&booking.id).amount,
        Some(Money::from_unsigned_cents(16_000))
    );
}

#[rstest]
fn paid_bookings_refuse_new_intents_and_cancellation(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: paid_bookings_refuse_new_intents_and_cancellation skipped");
        return;
    };
    let booking = context.stored_booking();
    assert!(context.record_intent(&booking.id));
    context
        .runtime
        .block_on(context.bookings.mark_paid(&booking.id))
        .expect("settle");

    let rerecorded = context.record_intent(&booking.id);
    let cancelled = context
        .runtime
        .block_on(context.bookings.update_status(
            &booking.id,
            BookingStatusUpdate {
                from: BookingStatus::Confirmed,
                to: BookingStatus::Cancelled,
                require_unpaid: true,
            },
        ))
        .expect("update status");

    assert!(!rerecorded);
    assert!(!cancelled);
    let stored = context.reload(&booking.id);
    assert_eq!(stored.status, BookingStatus::Confirmed);
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
}

#[rstest]
fn status_update_requires_the_expected_status(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: status_update_requires_the_expected_status skipped");
        return;
    };
    let booking = context.stored_booking();
    let update = |from| BookingStatusUpdate {
        from,
        to: BookingStatus::Confirmed,
        require_unpaid: false,
    };

    let stale = context
        .runtime
        .block_on(
            context
                .bookings
                .update_status(&booking.id, update(BookingStatus::Completed)),
        )
        .expect("stale update");
    let current = context
        .runtime
        .block_on(
            context
                .bookings
                .update_status(&booking.id, update(BookingStatus::Pending)),
        )
        .expect("current update");

    assert!(!stale);
    assert!(current);
    assert_eq!(context.reload(&booking.id).status, BookingStatus::Confirmed);
}

#[rstest]
fn cancelled_bookings_are_never_settled(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: cancelled_bookings_are_never_settled skipped");
        return;
    };
    let booking = context.stored_booking();
    assert!(context.record_intent(&booking.id));
    let cancelled = context
        .runtime
        .block_on(context.bookings.update_status(
            &booking.id,
            BookingStatusUpdate {
                from: BookingStatus::Pending,
                to: BookingStatus::Cancelled,
                require_unpaid: true,
            },
        ))
        .expect("cancel");
    assert!(cancelled);

    let settlement = context
        .runtime
        .block_on(context.bookings.mark_paid(&booking.id))
        .expect("settle")
        .expect("booking exists");

    assert!(!settlement.transitioned);
    assert_eq!(settlement.booking.status, BookingStatus::Cancelled);
    assert_eq!(settlement.booking.payment_status, PaymentStatus::Pending);
}

#[rstest]
fn settling_a_missing_booking_reports_none(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: settling_a_missing_booking_reports_none skipped");
        return;
    };

    let settlement = context
        .runtime
        .block_on(context.bookings.mark_paid(&BookingId::random()))
        .expect("settle");

    assert!(settlement.is_none());
}
