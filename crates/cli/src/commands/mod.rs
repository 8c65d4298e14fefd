//! Subcommand implementations.
//!
//! # Environment Variables
//!
//! - `DESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

pub mod migrate;
pub mod seed;
pub mod worker;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use civic_desk_core::ValidationError;
use civic_desk_server::db::seed::SeedError;
use civic_desk_server::services::AuthError;
use civic_desk_server::store::StoreError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Seeding failed.
    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    /// Input rejected.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Store operation failed.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Password hashing failed.
    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Database URL from the environment.
fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("DESK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DESK_DATABASE_URL"))
}

/// Connect to the dashboard database.
async fn connect() -> Result<PgPool, CommandError> {
    let url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(civic_desk_server::db::create_pool(&url).await?)
}
