//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;
#[cfg(feature = "metrics")]
pub(crate) use metrics::build_metrics;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::{AppState, build_app_state};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use bluecaller::Trace;
#[cfg(debug_assertions)]
use bluecaller::doc::ApiDoc;
use bluecaller::inbound::http::health::{HealthState, live, ready};
use bluecaller::inbound::http::state::HttpState;
use bluecaller::inbound::http::{configure_api, cors};
use bluecaller::inbound::ws;
use bluecaller::inbound::ws::state::WsState;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .wrap(cors::default_headers())
        .wrap(Trace)
        .service(ready)
        .service(live)
        .service(ws::notifications_stream)
        .service(web::scope("/api/v1").configure(configure_api));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server from validated configuration.
///
/// Readiness flips once the listener is bound.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when an outbound adapter cannot be built or
/// the socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let AppState { http, ws } = build_app_state(&config)?;
    let bind_addr = config.bind_addr();
    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(config.prometheus);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http.clone(), ws.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
