//! sx-server: HTTP API for uploading, listing, fetching, and deleting images.
//!
//! This crate wires the sx-store backends into an Axum application. It
//! provides the router, the API key and request id middleware, and the
//! server entry point with graceful shutdown.

pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use sx_core::config::Config;
use sx_store::pool::init_pool;
use sx_store::{FsObjectStore, SqliteMetadataStore};

use crate::context::AppContext;

pub use crate::router::build_router;

/// Start the sharex server.
///
/// Opens the metadata database and object directory, binds the listener, and
/// serves until Ctrl+C or SIGTERM.
pub async fn start(config: Config) -> sx_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| sx_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = build_context(config)?;
    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| sx_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Open the production stores described by `config`.
pub fn build_context(config: Config) -> sx_core::Result<AppContext> {
    let db_path = &config.storage.db_path;
    let existed = db_path.exists();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }

    let db_str = db_path.to_string_lossy();
    let pool = init_pool(&db_str)?;
    if existed {
        tracing::info!("Database opened (existing) at {db_str}");
    } else {
        tracing::info!("Database created (new) at {db_str}");
    }

    let objects = FsObjectStore::open(&config.storage.objects_dir)?;
    tracing::info!("Object store at {}", objects.root().display());

    Ok(AppContext::new(
        config,
        Arc::new(SqliteMetadataStore::new(pool)),
        Arc::new(objects),
    ))
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_context_creates_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.db_path = dir.path().join("nested/sharex.db");
        config.storage.objects_dir = dir.path().join("objects");

        let ctx = build_context(config).unwrap();
        assert!(dir.path().join("nested/sharex.db").exists());
        assert!(dir.path().join("objects").is_dir());

        ctx.metadata.put("BCDFGHJKLM", "{}".into()).await.unwrap();
        assert_eq!(
            ctx.metadata.get("BCDFGHJKLM").await.unwrap().as_deref(),
            Some("{}")
        );
    }
}
