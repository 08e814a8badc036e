//! Permissive CORS headers and pre-flight handling for browser clients.
//!
//! Every response carries the same three headers, and any `OPTIONS` request
//! under a wrapped scope is answered with an empty `200 OK`.

use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{HttpResponse, web};

/// Value of `Access-Control-Allow-Origin`.
pub const ALLOW_ORIGIN: &str = "*";
/// Request headers browsers may send cross-origin.
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
/// Methods accepted cross-origin.
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

/// Middleware stamping the CORS headers onto every response.
///
/// Headers already set by a handler are left untouched.
pub fn default_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", ALLOW_ORIGIN))
        .add(("Access-Control-Allow-Headers", ALLOW_HEADERS))
        .add(("Access-Control-Allow-Methods", ALLOW_METHODS))
}

async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Route answering pre-flight requests for any path it is mounted on.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use bluecaller::inbound::http::cors;
///
/// let app = App::new()
///     .wrap(cors::default_headers())
///     .service(web::scope("/api/v1").route("/{tail:.*}", cors::preflight_route()));
/// ```
pub fn preflight_route() -> actix_web::Route {
    web::route().method(Method::OPTIONS).to(preflight)
}
