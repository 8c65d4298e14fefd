//! Per-collection id sequences.

use sqlx::PgConnection;

use civic_desk_core::IdSequence;

use super::RepositoryError;

/// Advance `sequence` and return the formatted identifier.
///
/// The counter never hands out values at or below the fixture floor, so
/// generated ids cannot collide with seeded rows.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn next_id(
    conn: &mut PgConnection,
    sequence: IdSequence,
) -> Result<String, RepositoryError> {
    let value: i64 = sqlx::query_scalar(
        r"
        INSERT INTO id_counters (name, value)
        VALUES ($1, $2 + 1)
        ON CONFLICT (name) DO UPDATE
            SET value = GREATEST(id_counters.value, $2) + 1
        RETURNING value
        ",
    )
    .bind(sequence.counter_name())
    .bind(sequence.fixture_floor())
    .fetch_one(&mut *conn)
    .await?;

    Ok(sequence.format(value))
}

/// Raise `sequence` to at least `value` without handing out an id.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn raise_to(
    conn: &mut PgConnection,
    sequence: IdSequence,
    value: i64,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO id_counters (name, value)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE
            SET value = GREATEST(id_counters.value, EXCLUDED.value)
        ",
    )
    .bind(sequence.counter_name())
    .bind(value)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
