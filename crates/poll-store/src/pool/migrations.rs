//! Schema migrations
//!
//! Migrations are embedded at compile time and applied in version order.
//! Each one runs in its own transaction together with its bookkeeping row,
//! so a failed migration leaves the recorded version unchanged.

use sqlx::sqlite::SqlitePool;
use tracing::info;

/// Embedded migrations, ordered by version
const MIGRATIONS: &[(i64, &str, &str)] = &[(
    1,
    "create polls",
    include_str!("../../migrations/0001_create_polls.sql"),
)];

/// Apply every migration newer than the recorded schema version
///
/// Returns the number of migrations applied.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize, sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            description TEXT    NOT NULL,
            applied_at  TEXT    NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    let current: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
        .fetch_one(pool)
        .await?;

    let mut applied = 0;
    for (version, description, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(sql).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO schema_version (version, description) VALUES (?, ?)")
            .bind(version)
            .bind(description)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(version, description, "Applied migration");
        applied += 1;
    }

    Ok(applied)
}
