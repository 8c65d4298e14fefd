//! Load the fixture data set into `PostgreSQL`.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;

use civic_desk_core::{IdSequence, fixtures};

use super::{RepositoryError, admin_users, citizens, complaints, counters};
use crate::services::auth::{AuthError, hash_password};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<sqlx::Error> for SeedError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(err.into())
    }
}

/// Rows written by [`seed_fixtures`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub admins: usize,
    pub citizens: usize,
    pub complaints: usize,
}

/// Write the fixture accounts, citizens and complaints.
///
/// Fixture rows are upserted by id, so running this twice is harmless. With
/// `reset`, every existing row is deleted first.
///
/// # Errors
///
/// Returns `SeedError` if hashing a fixture password or any write fails.
/// Nothing is written on error.
pub async fn seed_fixtures(pool: &PgPool, reset: bool) -> Result<SeedSummary, SeedError> {
    let now = Utc::now();
    let admins = fixtures::admins(now);
    let citizen_rows = fixtures::citizens(now);
    let complaint_rows = fixtures::complaints(now);

    let mut hashes: HashMap<&'static str, String> = HashMap::new();
    let mut accounts = Vec::with_capacity(admins.len());
    for fixture in &admins {
        let hash = match hashes.get(fixture.password) {
            Some(hash) => hash.clone(),
            None => {
                let hash = hash_password(fixture.password)?;
                hashes.insert(fixture.password, hash.clone());
                hash
            }
        };
        accounts.push((&fixture.user, hash));
    }

    let mut tx = pool.begin().await?;

    if reset {
        sqlx::query("DELETE FROM complaints").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM citizens").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM admin_users").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM id_counters").execute(&mut *tx).await?;
        tracing::info!("existing data cleared");
    }

    for (user, hash) in &accounts {
        admin_users::upsert(&mut tx, user, hash).await?;
    }
    for citizen in &citizen_rows {
        citizens::upsert(&mut tx, citizen).await?;
    }
    for complaint in &complaint_rows {
        complaints::upsert(&mut tx, complaint).await?;
    }
    for sequence in [IdSequence::Complaints, IdSequence::Citizens, IdSequence::Workers] {
        counters::raise_to(&mut tx, sequence, sequence.fixture_floor()).await?;
    }

    tx.commit().await?;

    let summary = SeedSummary {
        admins: admins.len(),
        citizens: citizen_rows.len(),
        complaints: complaint_rows.len(),
    };
    tracing::info!(
        admins = summary.admins,
        citizens = summary.citizens,
        complaints = summary.complaints,
        "fixtures seeded"
    );
    Ok(summary)
}
