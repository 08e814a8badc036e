//! In-memory marketplace wiring for integration tests.
//!
//! Every repository is the shared [`InMemoryStore`] and the processor is a
//! [`ScriptedPaymentGateway`], so flows run end to end without PostgreSQL or
//! network access.

use std::sync::Arc;

use bluecaller::domain::ports::{
    FixtureIdentityProvider, FixtureNotificationDispatcher, NotificationDispatcher,
};
use bluecaller::domain::{
    BookingPaymentOrchestrator, BookingService, NotificationInboxService, PaymentTerms,
    PayoutOnboardingGate, ProfessionalService, PromotionService, PromotionTerms,
    QuoteLifecycleManager, QuoteMatcher, QuoteRequestQueryService, QuoteResponseController,
};
use bluecaller::inbound::http::state::{HttpState, HttpStatePorts};
use bluecaller::test_support::{InMemoryStore, ScriptedPaymentGateway};
use mockable::{Clock, DefaultClock};

pub const PUBLIC_ORIGIN: &str = "https://app.bluecaller.test";

pub struct Marketplace {
    pub store: InMemoryStore,
    pub gateway: ScriptedPaymentGateway,
    pub ports: HttpStatePorts,
}

impl Marketplace {
    pub fn http_state(&self) -> HttpState {
        HttpState::new(self.ports.clone(), PUBLIC_ORIGIN)
    }
}

pub fn marketplace() -> Marketplace {
    let store = InMemoryStore::new();
    let gateway = ScriptedPaymentGateway::new();
    let repo = Arc::new(store.clone());
    let gateway_port = Arc::new(gateway.clone());
    let dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(FixtureNotificationDispatcher);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let professionals = Arc::new(ProfessionalService::new(repo.clone(), clock.clone()));
    let bookings = Arc::new(BookingService::new(repo.clone(), repo.clone(), clock.clone()));

    let ports = HttpStatePorts {
        identity: Arc::new(FixtureIdentityProvider),
        professionals: professionals.clone(),
        professionals_query: professionals,
        quote_requests: Arc::new(QuoteMatcher::new(
            repo.clone(),
            repo.clone(),
            dispatcher.clone(),
            clock.clone(),
        )),
        quote_requests_query: Arc::new(QuoteRequestQueryService::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
        )),
        quote_responses: Arc::new(QuoteResponseController::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            dispatcher.clone(),
            clock.clone(),
        )),
        quote_lifecycle: Arc::new(QuoteLifecycleManager::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            dispatcher,
            clock.clone(),
        )),
        bookings: bookings.clone(),
        bookings_query: bookings,
        booking_payments: Arc::new(BookingPaymentOrchestrator::new(
            repo.clone(),
            repo.clone(),
            gateway_port.clone(),
            PaymentTerms::default(),
        )),
        payouts: Arc::new(PayoutOnboardingGate::new(repo.clone(), gateway_port.clone())),
        promotions: Arc::new(PromotionService::new(
            repo.clone(),
            gateway_port,
            clock,
            PromotionTerms::default(),
        )),
        notifications: Arc::new(NotificationInboxService::new(repo)),
    };

    Marketplace {
        store,
        gateway,
        ports,
    }
}
