//! Transactional provisioning core for a learning-management admin backend.
//!
//! The crate is organised hexagonally: `domain` holds entities, services,
//! and ports; `outbound::persistence` implements the ports over PostgreSQL.
//! Transport concerns (HTTP, auth tokens, file handling, email) live in
//! external collaborators and consume the domain services directly.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
