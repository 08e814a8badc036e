//! In-memory adapters for integration tests.
//!
//! Compiled for unit tests and behind the `test-support` feature so the
//! `tests/` crate can drive the full service graph without PostgreSQL or the
//! payment processor.

mod in_memory_store;
mod scripted_gateway;

pub use in_memory_store::InMemoryStore;
pub use scripted_gateway::{RecordedCheckout, ScriptedPaymentGateway};
