//! Marketplace backend connecting customers with home-service professionals.
//!
//! The crate follows a hexagonal layout: [`domain`] owns entities, services
//! and ports; [`inbound`] adapts HTTP and WebSocket traffic onto the driving
//! ports; [`outbound`] implements the driven ports against PostgreSQL, the
//! payment processor and the identity provider.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
