//! Payment processor outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `PaymentGateway`
//! port for a Stripe-compatible, form-encoded REST API.

mod dto;
mod http_gateway;

pub use http_gateway::{HttpPaymentGateway, ProcessorSecret};
