//! Tests for booking payment creation and reconciliation.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    CheckoutSession, MockBookingRepository, MockPaymentGateway, MockProfessionalRepository,
    PaymentGatewayError, PaymentSettlement,
};
use crate::domain::test_fixtures::{booking, plumber};
use crate::domain::{BookingStatus, ErrorCode, Money};

const ORIGIN: &str = "https://app.example.test";

struct Scene {
    customer: AuthenticatedUser,
    professional: Professional,
    booking: Booking,
}

#[fixture]
fn scene() -> Scene {
    let customer = AuthenticatedUser::new(UserId::random(), Some("casey@example.test".to_owned()));
    let professional = plumber(UserId::random());
    let booking = booking(professional.id, customer.id);
    Scene {
        customer,
        professional,
        booking,
    }
}

fn booking_repo_with(existing: Booking) -> MockBookingRepository {
    let mut repo = MockBookingRepository::new();
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));
    repo
}

fn professional_repo_with(professional: Professional) -> MockProfessionalRepository {
    let mut repo = MockProfessionalRepository::new();
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(professional.clone())));
    repo
}

fn orchestrator(
    booking_repo: MockBookingRepository,
    professional_repo: MockProfessionalRepository,
    gateway: MockPaymentGateway,
) -> BookingPaymentOrchestrator<MockBookingRepository, MockProfessionalRepository> {
    BookingPaymentOrchestrator::new(
        Arc::new(booking_repo),
        Arc::new(professional_repo),
        Arc::new(gateway),
        PaymentTerms::default(),
    )
}

fn create_request(scene: &Scene) -> CreateBookingPaymentRequest {
    CreateBookingPaymentRequest {
        customer: scene.customer.clone(),
        booking_id: scene.booking.id,
        origin: ORIGIN.to_owned(),
    }
}

fn verify_request(scene: &Scene) -> VerifyBookingPaymentRequest {
    VerifyBookingPaymentRequest {
        customer_id: scene.customer.id,
        booking_id: scene.booking.id,
        session_id: "cs_test".to_owned(),
    }
}

fn paid_session(booking_id: BookingId) -> CheckoutSessionStatus {
    CheckoutSessionStatus {
        id: "cs_test".to_owned(),
        paid: true,
        payment_intent_id: Some("pi_new".to_owned()),
        metadata: PaymentMetadata::from([("booking_id".to_owned(), booking_id.to_string())]),
    }
}

#[rstest]
#[tokio::test]
async fn charges_rate_times_hours_and_earmarks_the_fee(scene: Scene) {
    let booking_id = scene.booking.id;
    let mut booking_repo = booking_repo_with(scene.booking.clone());
    booking_repo
        .expect_record_payment_intent()
        .withf(|_, record| {
            record.intent_id == "pi_new"
                && record.amount.cents() == 16_000
                && record.platform_fee.cents() == 1_600
        })
        .times(1)
        .returning(|_, _| Ok(true));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_find_customer_by_email()
        .times(1)
        .returning(|_| Ok(Some("cus_casey".to_owned())));
    gateway
        .expect_create_payment_intent()
        .withf(move |request| {
            request.amount.cents() == 16_000
                && request.application_fee.cents() == 1_600
                && request.destination_account == "acct_pat"
                && request.currency == "usd"
                && request.customer_id.as_deref() == Some("cus_casey")
                && request.metadata.get("booking_id") == Some(&booking_id.to_string())
                && request.idempotency_key.len() == 64
        })
        .times(1)
        .returning(|_| Ok("pi_new".to_owned()));
    gateway
        .expect_create_checkout_session()
        .withf(move |request| {
            request.payment
                == CheckoutPayment::Intent {
                    intent_id: "pi_new".to_owned(),
                }
                && request.customer_email.is_none()
                && request.success_url
                    == format!("{ORIGIN}/projects?payment=success&booking={booking_id}")
                && request.cancel_url == format!("{ORIGIN}/projects?payment=cancelled")
        })
        .times(1)
        .returning(|_| {
            Ok(CheckoutSession {
                id: "cs_test".to_owned(),
                url: "https://checkout.example.test/cs_test".to_owned(),
            })
        });

    let response = orchestrator(booking_repo, professional_repo_with(scene.professional.clone()), gateway)
        .create_payment(create_request(&scene))
        .await
        .expect("checkout created");

    assert_eq!(response.amount.to_string(), "160.00");
    assert_eq!(response.platform_fee.to_string(), "16.00");
    assert_eq!(response.session_id, "cs_test");
}

#[rstest]
#[tokio::test]
async fn professional_without_payout_setup_blocks_payment(mut scene: Scene) {
    scene.professional.payout_onboarding_complete = false;
    let mut booking_repo = booking_repo_with(scene.booking.clone());
    booking_repo.expect_record_payment_intent().times(0);
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_create_payment_intent().times(0);
    gateway.expect_create_checkout_session().times(0);

    let err = orchestrator(booking_repo, professional_repo_with(scene.professional.clone()), gateway)
        .create_payment(create_request(&scene))
        .await
        .expect_err("payout gate closed");

    assert_eq!(err.code(), ErrorCode::PreconditionFailed);
    assert_eq!(err.message(), "Professional has not completed payment setup");
}

#[rstest]
#[tokio::test]
async fn other_customers_bookings_read_as_missing(scene: Scene) {
    let stranger = AuthenticatedUser::new(UserId::random(), None);
    let request = CreateBookingPaymentRequest {
        customer: stranger,
        ..create_request(&scene)
    };

    let err = orchestrator(
        booking_repo_with(scene.booking.clone()),
        MockProfessionalRepository::new(),
        MockPaymentGateway::new(),
    )
    .create_payment(request)
    .await
    .expect_err("scoped lookup");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Booking not found");
}

#[rstest]
#[tokio::test]
async fn pending_intent_is_reused(mut scene: Scene) {
    scene.booking.payment_status = PaymentStatus::Pending;
    scene.booking.payment_intent_id = Some("pi_existing".to_owned());
    scene.booking.amount = Some(Money::from_cents(16_000).expect("amount"));
    let mut booking_repo = booking_repo_with(scene.booking.clone());
    booking_repo.expect_record_payment_intent().times(0);

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_find_customer_by_email()
        .returning(|_| Ok(None));
    gateway.expect_create_payment_intent().times(0);
    gateway
        .expect_create_checkout_session()
        .withf(|request| {
            request.payment
                == CheckoutPayment::Intent {
                    intent_id: "pi_existing".to_owned(),
                }
                && request.customer_email.as_deref() == Some("casey@example.test")
        })
        .times(1)
        .returning(|_| {
            Ok(CheckoutSession {
                id: "cs_again".to_owned(),
                url: "https://checkout.example.test/cs_again".to_owned(),
            })
        });

    let response = orchestrator(booking_repo, professional_repo_with(scene.professional.clone()), gateway)
        .create_payment(create_request(&scene))
        .await
        .expect("checkout reopened");

    assert_eq!(response.session_id, "cs_again");
}

#[rstest]
#[tokio::test]
async fn paid_bookings_are_not_charged_again(mut scene: Scene) {
    scene.booking.payment_status = PaymentStatus::Paid;

    let err = orchestrator(
        booking_repo_with(scene.booking.clone()),
        MockProfessionalRepository::new(),
        MockPaymentGateway::new(),
    )
    .create_payment(create_request(&scene))
    .await
    .expect_err("already paid");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn cancelled_bookings_are_not_charged(mut scene: Scene) {
    scene.booking.status = BookingStatus::Cancelled;
    let mut booking_repo = booking_repo_with(scene.booking.clone());
    booking_repo.expect_record_payment_intent().times(0);
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_create_payment_intent().times(0);
    gateway.expect_create_checkout_session().times(0);

    let err = orchestrator(booking_repo, MockProfessionalRepository::new(), gateway)
        .create_payment(create_request(&scene))
        .await
        .expect_err("cancelled booking");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "A cancelled booking cannot be paid");
}

#[rstest]
#[tokio::test]
async fn processor_rejection_surfaces_its_message(scene: Scene) {
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_find_customer_by_email()
        .returning(|_| Err(PaymentGatewayError::rejected("Your card was declined")));

    let err = orchestrator(
        booking_repo_with(scene.booking.clone()),
        professional_repo_with(scene.professional.clone()),
        gateway,
    )
    .create_payment(create_request(&scene))
    .await
    .expect_err("processor failure");

    assert_eq!(err.code(), ErrorCode::UpstreamFailure);
    assert_eq!(err.message(), "Your card was declined");
}

#[test]
fn idempotency_key_depends_on_booking_and_amount() {
    let booking_id = BookingId::random();
    let policy = PricingPolicy::default();
    let charge = policy
        .charge_for(Money::from_cents(8_000).expect("rate"))
        .expect("charge");
    let higher = policy
        .charge_for(Money::from_cents(9_000).expect("rate"))
        .expect("charge");

    assert_eq!(
        payment_idempotency_key(&booking_id, &charge),
        payment_idempotency_key(&booking_id, &charge)
    );
    assert_ne!(
        payment_idempotency_key(&booking_id, &charge),
        payment_idempotency_key(&booking_id, &higher)
    );
    assert_ne!(
        payment_idempotency_key(&booking_id, &charge),
        payment_idempotency_key(&BookingId::random(), &charge)
    );
}

#[rstest]
#[tokio::test]
async fn paid_session_settles_the_booking(mut scene: Scene) {
    scene.booking.payment_status = PaymentStatus::Pending;
    let booking_id = scene.booking.id;
    let settled = Booking {
        payment_status: PaymentStatus::Paid,
        status: BookingStatus::Confirmed,
        ..scene.booking.clone()
    };
    let mut booking_repo = booking_repo_with(scene.booking.clone());
    booking_repo
        .expect_mark_paid()
        .times(1)
        .return_once(move |_| {
            Ok(Some(PaymentSettlement {
                booking: settled,
                transitioned: true,
            }))
        });
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_retrieve_checkout_session()
        .return_once(move |_| Ok(paid_session(booking_id)));

    let verification = orchestrator(booking_repo, MockProfessionalRepository::new(), gateway)
        .verify_payment(verify_request(&scene))
        .await
        .expect("verified");

    assert!(verification.success);
    assert_eq!(verification.message, "Payment verified successfully");
}

#[rstest]
#[tokio::test]
async fn second_verification_of_paid_booking_writes_nothing(mut scene: Scene) {
    scene.booking.payment_status = PaymentStatus::Paid;
    scene.booking.status = BookingStatus::Confirmed;
    let mut booking_repo = booking_repo_with(scene.booking.clone());
    booking_repo.expect_mark_paid().times(0);
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_retrieve_checkout_session().times(0);

    let verification = orchestrator(booking_repo, MockProfessionalRepository::new(), gateway)
        .verify_payment(verify_request(&scene))
        .await
        .expect("idempotent");

    assert!(verification.success);
}

#[rstest]
#[tokio::test]
async fn unpaid_session_reports_without_mutation(mut scene: Scene) {
    scene.booking.payment_status = PaymentStatus::Pending;
    let booking_id = scene.booking.id;
    let mut booking_repo = booking_repo_with(scene.booking.clone());
    booking_repo.expect_mark_paid().times(0);
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_retrieve_checkout_session().return_once(move |_| {
        Ok(CheckoutSessionStatus {
            paid: false,
            ..paid_session(booking_id)
        })
    });

    let verification = orchestrator(booking_repo, MockProfessionalRepository::new(), gateway)
        .verify_payment(verify_request(&scene))
        .await
        .expect("not completed");

    assert!(!verification.success);
    assert_eq!(verification.message, "Payment not completed");
}

#[rstest]
#[tokio::test]
async fn foreign_session_is_rejected(mut scene: Scene) {
    scene.booking.payment_status = PaymentStatus::Pending;
    scene.booking.payment_intent_id = Some("pi_mine".to_owned());
    let mut booking_repo = booking_repo_with(scene.booking.clone());
    booking_repo.expect_mark_paid().times(0);
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_retrieve_checkout_session()
        .return_once(|_| Ok(paid_session(BookingId::random())));

    let err = orchestrator(booking_repo, MockProfessionalRepository::new(), gateway)
        .verify_payment(verify_request(&scene))
        .await
        .expect_err("unbound session");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn paid_session_for_cancelled_booking_is_not_settled(mut scene: Scene) {
    scene.booking.payment_status = PaymentStatus::Pending;
    scene.booking.status = BookingStatus::Cancelled;
    let booking_id = scene.booking.id;
    let mut booking_repo = booking_repo_with(scene.booking.clone());
    booking_repo.expect_mark_paid().times(0);
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_retrieve_checkout_session()
        .return_once(move |_| Ok(paid_session(booking_id)));

    let err = orchestrator(booking_repo, MockProfessionalRepository::new(), gateway)
        .verify_payment(verify_request(&scene))
        .await
        .expect_err("refund required");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn cancellation_racing_settlement_is_reported(mut scene: Scene) {
    scene.booking.payment_status = PaymentStatus::Pending;
    let booking_id = scene.booking.id;
    let cancelled = Booking {
        status: BookingStatus::Cancelled,
        ..scene.booking.clone()
    };
    let mut booking_repo = booking_repo_with(scene.booking.clone());
    booking_repo
        .expect_mark_paid()
        .times(1)
        .return_once(move |_| {
            Ok(Some(PaymentSettlement {
                booking: cancelled,
                transitioned: false,
            }))
        });
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_retrieve_checkout_session()
        .return_once(move |_| Ok(paid_session(booking_id)));

    let err = orchestrator(booking_repo, MockProfessionalRepository::new(), gateway)
        .verify_payment(verify_request(&scene))
        .await
        .expect_err("cancelled under the lock");

    assert_eq!(err.code(), ErrorCode::Conflict);
}
