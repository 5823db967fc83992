//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain store ports backed by PostgreSQL
//! via Diesel with async support through `diesel-async` and `bb8` pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: store implementations only translate between Diesel
//!   models and domain types. No business policy lives here beyond the
//!   transactional consistency rules the ports document.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are implementation details, never exposed to
//!   the domain layer.
//! - **One transaction per mutation**: every multi-step write runs inside
//!   `AsyncConnection::transaction`, which commits on `Ok` and rolls back on
//!   every `Err` path. Adapter error types convert from
//!   `diesel::result::Error` so `?` aborts the enclosing transaction.

mod checks;
mod diesel_batch_store;
mod diesel_course_store;
mod diesel_syllabus_store;
mod diesel_user_store;
mod enrollment;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_batch_store::DieselBatchStore;
pub use diesel_course_store::DieselCourseStore;
pub use diesel_syllabus_store::DieselSyllabusStore;
pub use diesel_user_store::DieselUserStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
