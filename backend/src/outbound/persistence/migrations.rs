//! Embedded schema migrations for the Record Store.
//!
//! Migrations are compiled into the binary from `backend/migrations` and run
//! over a synchronous connection; they execute once at deploy time, before
//! the async pool exists.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect for migrations: {message}")]
    Connect {
        /// Connection failure reported by Diesel.
        message: String,
    },
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply {
        /// Failure reported by the migration harness.
        message: String,
    },
}

/// Apply every pending migration and return the applied versions in order.
///
/// Re-running against an up-to-date schema applies nothing.
///
/// # Errors
///
/// Returns [`MigrationError`] when the connection or a migration fails.
pub fn run_migrations(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| MigrationError::Connect {
        message: err.to_string(),
    })?;

    let applied: Vec<String> = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?
        .into_iter()
        .map(|version| version.to_string())
        .collect();

    if applied.is_empty() {
        info!("schema already up to date");
    }
    for version in &applied {
        info!(%version, "applied migration");
    }
    Ok(applied)
}
