//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! desk-cli migrate
//! ```
//!
//! Migrations live in `crates/server/migrations/` and are embedded into the
//! binary at build time.

use civic_desk_server::db::MIGRATOR;

use super::{CommandError, connect};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!(available = MIGRATOR.iter().count(), "Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
