//! Database schema migrations.
//!
//! A `_migrations` table records the highest applied version; each pending
//! migration runs inside its own transaction together with its version row.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Ordered `(version, SQL)` pairs. Versions must strictly increase.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_cache_stores.sql")),
    (2, include_str!("../../migrations/002_cache_entries.sql")),
];

/// Apply every migration newer than the recorded schema version.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` naming the version whose SQL failed.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for (version, sql) in MIGRATIONS.iter().filter(|(version, _)| *version > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            tx.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::debug!(version, "applied cache schema migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        let tables: i64 = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master
                     WHERE type='table' AND name IN ('cache_stores', 'cache_entries')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert_eq!(tables, 2);
    }

    #[tokio::test]
    async fn test_migrations_version_tracking() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let latest: i64 = conn
            .call(|conn| conn.query_row("SELECT MAX(version) FROM _migrations", [], |row| row.get(0)))
            .await
            .unwrap();

        assert_eq!(latest, MIGRATIONS.len() as i64);
    }

    #[test]
    fn test_versions_strictly_increase() {
        assert!(MIGRATIONS.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }
}
