//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint of the inbound layer, grouped by tag
//! - **Schemas**: the error envelope wrappers ([`ErrorSchema`],
//!   [`ErrorCodeSchema`]); request and response bodies are collected from the
//!   paths that reference them
//! - **Security**: bearer token authentication against the identity provider
//!
//! The generated specification is served by Swagger UI in debug builds.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some(
                        "Access token issued by the identity provider.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bluecaller marketplace API",
        description = "Quote requests, bookings, payments and notifications for home-service professionals and their customers."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::quote_requests::submit_quote_request,
        crate::inbound::http::quote_requests::list_my_quote_requests,
        crate::inbound::http::quote_requests::get_quote_request,
        crate::inbound::http::quote_responses::submit_quote_response,
        crate::inbound::http::quote_responses::set_quote_response_status,
        crate::inbound::http::professionals::register_professional,
        crate::inbound::http::professionals::get_my_professional,
        crate::inbound::http::professionals::get_professional,
        crate::inbound::http::payouts::connect_payout_account,
        crate::inbound::http::payouts::check_payout_status,
        crate::inbound::http::promotions::create_promotion_checkout,
        crate::inbound::http::promotions::verify_promotion_payment,
        crate::inbound::http::bookings::create_booking,
        crate::inbound::http::bookings::list_my_bookings,
        crate::inbound::http::bookings::list_assigned_bookings,
        crate::inbound::http::bookings::get_booking,
        crate::inbound::http::bookings::apply_booking_action,
        crate::inbound::http::booking_payments::create_booking_payment,
        crate::inbound::http::booking_payments::verify_booking_payment,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_all_notifications_read,
        crate::inbound::http::notifications::mark_notification_read,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "quotes", description = "Quote requests and professional responses"),
        (name = "professionals", description = "Professional profiles"),
        (name = "payouts", description = "Connected payout account onboarding"),
        (name = "promotions", description = "Paid profile promotion"),
        (name = "bookings", description = "Booking lifecycle"),
        (name = "payments", description = "Booking checkout and reconciliation"),
        (name = "notifications", description = "Notification inbox"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
