//! SQLite-backed metadata store.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use sx_core::{Error, Result};

use super::{KeyListing, ListOptions, MetadataStore};
use crate::pool::{get_conn, DbPool};

/// [`MetadataStore`] over the `kv` table.
///
/// Queries are blocking, so each call hops onto the blocking thread pool.
#[derive(Clone)]
pub struct SqliteMetadataStore {
    pool: DbPool,
}

impl SqliteMetadataStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::Internal(format!("metadata store task failed: {e}")))?
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.with_conn(move |conn| get_value(conn, &key)).await
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn| put_value(conn, &key, &value))
            .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn| delete_value(conn, &key)).await
    }

    async fn list(&self, options: ListOptions) -> Result<KeyListing> {
        let limit = options.effective_limit();
        let after = options.start_after()?;
        self.with_conn(move |conn| list_keys(conn, after.as_deref(), limit))
            .await
    }
}

fn get_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .optional()
    .map_err(Error::database)
}

fn put_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value],
    )
    .map_err(Error::database)?;
    Ok(())
}

fn delete_value(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM kv WHERE key = ?1", [key])
        .map_err(Error::database)?;
    Ok(())
}

fn list_keys(conn: &Connection, after: Option<&str>, limit: usize) -> Result<KeyListing> {
    let mut stmt = conn
        .prepare("SELECT key FROM kv WHERE key > ?1 ORDER BY key LIMIT ?2")
        .map_err(Error::database)?;
    let names = stmt
        .query_map(params![after.unwrap_or(""), (limit + 1) as i64], |row| {
            row.get::<_, String>(0)
        })
        .map_err(Error::database)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::database)?;
    Ok(KeyListing::from_overfetch(names, limit))
}
