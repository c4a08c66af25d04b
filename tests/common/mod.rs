//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which builds an [`AppContext`] over memory stores
//! (or the on-disk backends), starts Axum on a random port, and wraps a
//! `reqwest` client for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use sx_core::config::Config;
use sx_core::ImageMetadata;
use sx_server::context::AppContext;
use sx_server::router::build_router;
use sx_store::{ListOptions, MemoryMetadataStore, MemoryObjectStore, MetadataStore, ObjectStore};

/// API key configured by [`test_config`].
pub const API_KEY: &str = "test-key";

/// Running server plus handles on its stores.
pub struct TestHarness {
    pub ctx: AppContext,
    pub addr: SocketAddr,
    pub client: reqwest::Client,
}

/// Default configuration for tests: API key set, everything else default.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.api_key = Some(API_KEY.into());
    config
}

impl TestHarness {
    /// Start a server over memory stores with [`test_config`].
    pub async fn with_server() -> Self {
        Self::with_server_config(test_config()).await
    }

    /// Start a server over memory stores with a custom configuration.
    pub async fn with_server_config(config: Config) -> Self {
        Self::serve(config, |config| {
            Ok(AppContext::new(
                config,
                Arc::new(MemoryMetadataStore::new()),
                Arc::new(MemoryObjectStore::new()),
            ))
        })
        .await
    }

    /// Start a server over SQLite and a filesystem object store rooted in
    /// `dir`.
    pub async fn with_storage(dir: &Path) -> Self {
        let mut config = test_config();
        config.storage.db_path = dir.join("sharex.db");
        config.storage.objects_dir = dir.join("objects");
        Self::serve(config, sx_server::build_context).await
    }

    /// Bind a random port, point `server.public_url` at it, build the context
    /// with `make_ctx`, and serve in the background.
    pub async fn serve<F>(mut config: Config, make_ctx: F) -> Self
    where
        F: FnOnce(Config) -> sx_core::Result<AppContext>,
    {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        config.server.public_url = format!("http://{addr}");
        let ctx = make_ctx(config).expect("failed to build context");
        let app = build_router(ctx.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            ctx,
            addr,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// POST `data` as the `upload` field with the test API key.
    pub async fn upload(&self, data: &[u8], content_type: &str) -> reqwest::Response {
        let part = Part::bytes(data.to_vec())
            .file_name("upload.bin")
            .mime_str(content_type)
            .expect("valid mime");
        self.post_form(Form::new().part("upload", part), Some(API_KEY))
            .await
    }

    /// Upload and decode the returned record, asserting success.
    pub async fn upload_ok(&self, data: &[u8], content_type: &str) -> ImageMetadata {
        let resp = self.upload(data, content_type).await;
        assert_eq!(resp.status(), 200, "upload failed");
        resp.json().await.expect("upload response is a record")
    }

    pub async fn post_form(&self, form: Form, key: Option<&str>) -> reqwest::Response {
        let mut req = self.client.post(self.url("/api/images")).multipart(form);
        if let Some(key) = key {
            req = req.header("x-api-key", key);
        }
        req.send().await.expect("request failed")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("request failed")
    }

    pub async fn delete(&self, path: &str, key: Option<&str>) -> reqwest::Response {
        let mut req = self.client.delete(self.url(path));
        if let Some(key) = key {
            req = req.header("x-api-key", key);
        }
        req.send().await.expect("request failed")
    }

    /// Every key currently in the metadata store.
    pub async fn metadata_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        let mut cursor = None;
        loop {
            let listing = self
                .ctx
                .metadata
                .list(ListOptions {
                    cursor,
                    ..ListOptions::default()
                })
                .await
                .expect("list failed");
            keys.extend(listing.keys.into_iter().map(|k| k.name));
            if listing.list_complete {
                return keys;
            }
            cursor = listing.cursor;
        }
    }

    /// Write a record straight into the stores, bypassing the API.
    pub async fn seed(&self, id: &str, body: &[u8]) -> ImageMetadata {
        let id = sx_core::ImageId::parse(id).expect("valid id");
        let object = self
            .ctx
            .objects
            .put(id.as_str(), Bytes::copy_from_slice(body))
            .await
            .expect("object put failed");
        let record = ImageMetadata {
            url: self.ctx.config.media_url(&id),
            delete: self.ctx.config.delete_url(&id),
            id,
            object,
            content_type: "image/png".into(),
            hash: String::new(),
        };
        self.ctx
            .metadata
            .put(record.id.as_str(), record.to_wire().expect("encode"))
            .await
            .expect("metadata put failed");
        record
    }
}
