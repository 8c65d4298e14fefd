//! Load the demo data set.
//!
//! Writes the Main Admin account, four workers, five citizens and five
//! complaints. Fixture rows are upserted, so reseeding restores them without
//! touching other rows unless `--reset` is given.

use civic_desk_server::db::seed::seed_fixtures;

use super::{CommandError, connect};

/// Seed the database with the fixture data set.
///
/// # Errors
///
/// Returns an error if the database is unreachable or any write fails.
pub async fn fixtures(reset: bool) -> Result<(), CommandError> {
    let pool = connect().await?;

    if reset {
        tracing::warn!("Deleting all existing admins, citizens and complaints");
    }

    let summary = seed_fixtures(&pool, reset).await?;
    tracing::info!(
        admins = summary.admins,
        citizens = summary.citizens,
        complaints = summary.complaints,
        "Seed complete"
    );
    Ok(())
}
