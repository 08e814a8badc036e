//! HTTP inbound adapter exposing the marketplace REST endpoints.
//!
//! Every handler depends only on the driving ports held in
//! [`state::HttpState`]. [`configure_api`] mounts them under `/api/v1`.

pub mod auth;
pub mod booking_payments;
pub mod bookings;
pub mod cors;
pub mod error;
pub mod health;
pub mod notifications;
pub mod payouts;
pub mod professionals;
pub mod promotions;
pub mod quote_requests;
pub mod quote_responses;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub(crate) mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// Literal segments (`/mine`, `/me`, `/assigned`) are registered before the
/// `{id}` routes that would otherwise capture them.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(quote_requests::submit_quote_request)
        .service(quote_requests::list_my_quote_requests)
        .service(quote_requests::get_quote_request)
        .service(quote_responses::submit_quote_response)
        .service(quote_responses::set_quote_response_status)
        .service(professionals::register_professional)
        .service(professionals::get_my_professional)
        .service(professionals::get_professional)
        .service(payouts::connect_payout_account)
        .service(payouts::check_payout_status)
        .service(promotions::create_promotion_checkout)
        .service(promotions::verify_promotion_payment)
        .service(bookings::create_booking)
        .service(bookings::list_my_bookings)
        .service(bookings::list_assigned_bookings)
        .service(bookings::get_booking)
        .service(bookings::apply_booking_action)
        .service(booking_payments::create_booking_payment)
        .service(booking_payments::verify_booking_payment)
        .service(notifications::list_notifications)
        .service(notifications::mark_all_notifications_read)
        .service(notifications::mark_notification_read)
        .route("/{tail:.*}", cors::preflight_route());
}
