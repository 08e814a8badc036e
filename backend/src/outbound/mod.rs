//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits for each external collaborator:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **payments**: the hosted payment processor over `reqwest`
//! - **identity**: bearer-token resolution against the hosted auth service
//! - **notifications**: the best-effort delivery queue and realtime feed
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod identity;
pub mod notifications;
pub mod payments;
pub mod persistence;
