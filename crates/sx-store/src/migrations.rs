//! Embedded schema migrations for the metadata database.
//!
//! Each [`Migration`] runs at most once, inside its own transaction. The
//! highest applied version is recorded in `schema_migrations`.

use rusqlite::Connection;
use sx_core::{Error, Result};

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// All migrations in ascending version order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "kv",
    sql: "CREATE TABLE kv (
              key        TEXT PRIMARY KEY,
              value      TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
          );",
}];

/// Latest schema version this build knows about.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Highest version recorded in `schema_migrations`, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .map_err(Error::database)
}

/// Bring the schema up to [`latest_version`]. Returns how many migrations ran.
pub fn run_migrations(conn: &Connection) -> Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            name       TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(Error::database)?;

    let current = current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let tx = conn.unchecked_transaction().map_err(Error::database)?;
        tx.execute_batch(migration.sql).map_err(|e| {
            Error::database(format!(
                "migration {} ({}) failed: {e}",
                migration.version, migration.name
            ))
        })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.name],
        )
        .map_err(Error::database)?;
        tx.commit().map_err(Error::database)?;

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applied schema migration"
        );
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_latest() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(run_migrations(&conn).unwrap(), MIGRATIONS.len());
        assert_eq!(current_version(&conn).unwrap(), latest_version());

        conn.execute("INSERT INTO kv (key, value) VALUES ('a', '{}')", [])
            .unwrap();
    }

    #[test]
    fn rerun_is_noop() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(run_migrations(&conn).unwrap(), 0);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, MIGRATIONS.len() as i64);
    }

    #[test]
    fn versions_ascend() {
        assert!(MIGRATIONS.windows(2).all(|w| w[0].version < w[1].version));
    }
}
