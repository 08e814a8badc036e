//! Builders wiring repositories, outbound adapters and domain services into
//! the HTTP and WebSocket adapter state.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use bluecaller::domain::ports::{
    BookingRepository, FixtureBookingRepository, FixtureIdentityProvider,
    FixtureNotificationRepository, FixturePaymentGateway, FixtureProfessionalRepository,
    FixtureQuoteRequestRepository, FixtureQuoteResponseRepository, IdentityProvider,
    NotificationDispatcher, NotificationFeed, NotificationRepository, PaymentGateway,
    ProfessionalRepository, QuoteRequestRepository, QuoteResponseRepository,
};
use bluecaller::domain::{
    BookingPaymentOrchestrator, BookingService, NotificationInboxService, PayoutOnboardingGate,
    ProfessionalService, PromotionService, QuoteLifecycleManager, QuoteMatcher,
    QuoteRequestQueryService, QuoteResponseController,
};
use bluecaller::inbound::http::state::{HttpState, HttpStatePorts};
use bluecaller::inbound::ws::state::WsState;
use bluecaller::outbound::identity::HttpIdentityProvider;
use bluecaller::outbound::notifications::{
    BroadcastNotificationFeed, NotificationWorker, QueuedNotificationDispatcher,
};
use bluecaller::outbound::payments::HttpPaymentGateway;
use bluecaller::outbound::persistence::{
    DbPool, DieselBookingRepository, DieselNotificationRepository, DieselProfessionalRepository,
    DieselQuoteRequestRepository, DieselQuoteResponseRepository,
};
use bluecaller::settings::ServiceSettings;

use super::ServerConfig;

const IDENTITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Adapter state shared by every worker.
pub(super) struct AppState {
    pub(super) http: web::Data<HttpState>,
    pub(super) ws: web::Data<WsState>,
}

/// One repository per aggregate, either all Diesel-backed or all fixtures.
struct Repositories<P, Q, R, B, N> {
    professionals: Arc<P>,
    requests: Arc<Q>,
    responses: Arc<R>,
    bookings: Arc<B>,
    notifications: Arc<N>,
}

impl
    Repositories<
        DieselProfessionalRepository,
        DieselQuoteRequestRepository,
        DieselQuoteResponseRepository,
        DieselBookingRepository,
        DieselNotificationRepository,
    >
{
    fn diesel(pool: &DbPool) -> Self {
        Self {
            professionals: Arc::new(DieselProfessionalRepository::new(pool.clone())),
            requests: Arc::new(DieselQuoteRequestRepository::new(pool.clone())),
            responses: Arc::new(DieselQuoteResponseRepository::new(pool.clone())),
            bookings: Arc::new(DieselBookingRepository::new(pool.clone())),
            notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        }
    }
}

impl
    Repositories<
        FixtureProfessionalRepository,
        FixtureQuoteRequestRepository,
        FixtureQuoteResponseRepository,
        FixtureBookingRepository,
        FixtureNotificationRepository,
    >
{
    fn fixtures() -> Self {
        Self {
            professionals: Arc::new(FixtureProfessionalRepository),
            requests: Arc::new(FixtureQuoteRequestRepository),
            responses: Arc::new(FixtureQuoteResponseRepository),
            bookings: Arc::new(FixtureBookingRepository),
            notifications: Arc::new(FixtureNotificationRepository),
        }
    }
}

/// Collaborators that do not depend on the repository flavour.
struct Collaborators {
    identity: Arc<dyn IdentityProvider>,
    gateway: Arc<dyn PaymentGateway>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
}

fn build_ports<P, Q, R, B, N>(
    repos: &Repositories<P, Q, R, B, N>,
    collaborators: &Collaborators,
    settings: &ServiceSettings,
) -> HttpStatePorts
where
    P: ProfessionalRepository + 'static,
    Q: QuoteRequestRepository + 'static,
    R: QuoteResponseRepository + 'static,
    B: BookingRepository + 'static,
    N: NotificationRepository + 'static,
{
    let Collaborators {
        identity,
        gateway,
        dispatcher,
        clock,
    } = collaborators;

    let professionals = Arc::new(ProfessionalService::new(
        repos.professionals.clone(),
        clock.clone(),
    ));
    let bookings = Arc::new(BookingService::new(
        repos.bookings.clone(),
        repos.professionals.clone(),
        clock.clone(),
    ));

    HttpStatePorts {
        identity: identity.clone(),
        professionals: professionals.clone(),
        professionals_query: professionals,
        quote_requests: Arc::new(QuoteMatcher::new(
            repos.requests.clone(),
            repos.professionals.clone(),
            dispatcher.clone(),
            clock.clone(),
        )),
        quote_requests_query: Arc::new(QuoteRequestQueryService::new(
            repos.requests.clone(),
            repos.responses.clone(),
            repos.professionals.clone(),
        )),
        quote_responses: Arc::new(QuoteResponseController::new(
            repos.responses.clone(),
            repos.requests.clone(),
            repos.professionals.clone(),
            dispatcher.clone(),
            clock.clone(),
        )),
        quote_lifecycle: Arc::new(
            QuoteLifecycleManager::new(
                repos.responses.clone(),
                repos.requests.clone(),
                repos.professionals.clone(),
                dispatcher.clone(),
                clock.clone(),
            )
            .with_acceptance_window(settings.acceptance_window_minutes),
        ),
        bookings: bookings.clone(),
        bookings_query: bookings,
        booking_payments: Arc::new(BookingPaymentOrchestrator::new(
            repos.bookings.clone(),
            repos.professionals.clone(),
            gateway.clone(),
            settings.payment_terms.clone(),
        )),
        payouts: Arc::new(PayoutOnboardingGate::new(
            repos.professionals.clone(),
            gateway.clone(),
        )),
        promotions: Arc::new(PromotionService::new(
            repos.professionals.clone(),
            gateway.clone(),
            clock.clone(),
            settings.promotion_terms.clone(),
        )),
        notifications: Arc::new(NotificationInboxService::new(
            repos.notifications.clone(),
        )),
    }
}

fn build_identity(settings: &ServiceSettings) -> std::io::Result<Arc<dyn IdentityProvider>> {
    match &settings.identity {
        Some(identity) => {
            let provider =
                HttpIdentityProvider::new(&identity.url, identity.api_key.clone(), IDENTITY_TIMEOUT)
                    .map_err(|err| std::io::Error::other(format!("identity provider: {err}")))?;
            Ok(Arc::new(provider))
        }
        None => {
            warn!("auth_url not configured; accepting user ids as bearer tokens");
            Ok(Arc::new(FixtureIdentityProvider))
        }
    }
}

fn build_gateway(settings: &ServiceSettings) -> std::io::Result<Arc<dyn PaymentGateway>> {
    match &settings.payments {
        Some(payments) => {
            let gateway = HttpPaymentGateway::new(
                payments.base_url.clone(),
                payments.secret.clone(),
                payments.timeout,
            )
            .map_err(|err| std::io::Error::other(format!("payment gateway: {err}")))?;
            Ok(Arc::new(gateway))
        }
        None => {
            warn!("payments_secret_key not configured; payment calls will be rejected");
            Ok(Arc::new(FixturePaymentGateway))
        }
    }
}

/// Build adapter state and start the notification worker.
///
/// Must run inside a Tokio runtime because the worker is spawned here. The
/// worker stops once the last dispatcher handle held by the services drops.
///
/// # Errors
///
/// Returns [`std::io::Error`] when an outbound HTTP client cannot be built.
pub(super) fn build_app_state(config: &ServerConfig) -> std::io::Result<AppState> {
    let settings = &config.settings;
    let feed = Arc::new(BroadcastNotificationFeed::default());
    let (dispatcher, receiver) =
        QueuedNotificationDispatcher::channel(settings.notification_queue_capacity);
    let identity = build_identity(settings)?;
    let collaborators = Collaborators {
        identity: identity.clone(),
        gateway: build_gateway(settings)?,
        dispatcher: Arc::new(dispatcher),
        clock: Arc::new(DefaultClock),
    };

    let ports = match &config.db_pool {
        Some(pool) => {
            let repos = Repositories::diesel(pool);
            NotificationWorker::new(repos.notifications.clone(), feed.clone()).spawn(receiver);
            build_ports(&repos, &collaborators, settings)
        }
        None => {
            let repos = Repositories::fixtures();
            NotificationWorker::new(repos.notifications.clone(), feed.clone()).spawn(receiver);
            build_ports(&repos, &collaborators, settings)
        }
    };

    Ok(AppState {
        http: web::Data::new(HttpState::new(ports, settings.public_origin.clone())),
        ws: web::Data::new(WsState::new(
            identity,
            feed as Arc<dyn NotificationFeed>,
            settings.allowed_ws_origins.clone(),
        )),
    })
}
