//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. Business rules stay in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leak into the domain layer.
//! - **Guarded writes**: state transitions are conditional `UPDATE`s or
//!   locked transactions, so concurrent callers cannot overwrite each other.
//!
//! # Example
//!
//! ```ignore
//! use bluecaller::outbound::persistence::{DbPool, DieselBookingRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/bluecaller")).await?;
//! let bookings = DieselBookingRepository::new(pool);
//! ```

mod diesel_booking_repository;
mod diesel_notification_repository;
mod diesel_professional_repository;
mod diesel_quote_request_repository;
mod diesel_quote_response_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_professional_repository::DieselProfessionalRepository;
pub use diesel_quote_request_repository::DieselQuoteRequestRepository;
pub use diesel_quote_response_repository::DieselQuoteResponseRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
