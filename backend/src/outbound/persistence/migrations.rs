//! Embedded schema migrations.
//!
//! Migrations run over a synchronous connection during process start, before
//! the async pool serves any request.

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// All SQL migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to run migrations: {message}")]
pub struct MigrationError {
    message: String,
}

/// Apply every pending migration, returning how many ran.
pub fn run_pending_migrations(
    conn: &mut impl MigrationHarness<diesel::pg::Pg>,
) -> Result<usize, MigrationError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| applied.len())
        .map_err(|err| MigrationError {
            message: err.to_string(),
        })
}
