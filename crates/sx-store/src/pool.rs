//! r2d2 connection pool over the SQLite metadata database.

use std::sync::atomic::{AtomicU64, Ordering};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use sx_core::{Error, Result};

use crate::migrations;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Connections kept per pool.
pub const POOL_SIZE: u32 = 4;

/// Open (or create) the database at `db_path` and migrate it.
///
/// Every connection runs in WAL mode with a 5s busy timeout.
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
    });
    build_migrated(manager)
}

/// Fresh in-memory database for tests.
///
/// Each call gets its own named shared-cache database, so pools never see
/// each other's rows while connections within one pool do.
pub fn init_memory_pool() -> Result<DbPool> {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    let manager =
        SqliteConnectionManager::file(format!("file:sharex_memdb_{n}?mode=memory&cache=shared"));
    build_migrated(manager)
}

fn build_migrated(manager: SqliteConnectionManager) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(POOL_SIZE)
        .build(manager)
        .map_err(|e| Error::database(format!("failed to open connection pool: {e}")))?;

    let applied = migrations::run_migrations(&*get_conn(&pool)?)?;
    if applied > 0 {
        tracing::debug!(applied, "Metadata schema migrated");
    }
    Ok(pool)
}

pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("failed to check out connection: {e}")))
}
