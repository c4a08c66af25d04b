//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON. Every section
//! defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::ids::ImageId;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub media: MediaConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.server.max_upload_bytes == 0 {
            warnings.push("server.max_upload_bytes is 0; every upload will be rejected".into());
        }

        if !is_http_url(&self.server.public_url) {
            warnings.push(format!(
                "server.public_url '{}' is not an http(s) URL",
                self.server.public_url
            ));
        }

        match self.auth.api_key.as_deref() {
            None => warnings.push(
                "auth.api_key is not set; every upload and delete will be rejected".into(),
            ),
            Some("") => warnings.push(
                "auth.api_key is empty; every upload and delete will be rejected".into(),
            ),
            Some(_) => {}
        }

        match self.media.public_url.as_deref() {
            Some(url) if !is_http_url(url) => {
                warnings.push(format!("media.public_url '{url}' is not an http(s) URL"));
            }
            None if !self.media.serve => warnings.push(
                "media.serve is disabled and media.public_url is unset; image urls will not resolve"
                    .into(),
            ),
            _ => {}
        }

        warnings
    }

    /// Base URL that image bodies are publicly readable under.
    pub fn media_base_url(&self) -> String {
        match self.media.public_url.as_deref() {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("{}/media", self.server.public_url.trim_end_matches('/')),
        }
    }

    /// Public read URL for an image.
    pub fn media_url(&self, id: &ImageId) -> String {
        format!("{}/{id}", self.media_base_url())
    }

    /// API URL that deletes an image.
    pub fn delete_url(&self, id: &ImageId) -> String {
        format!(
            "{}/api/images/{id}",
            self.server.public_url.trim_end_matches('/')
        )
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally visible base URL of this API, used to build `delete` links.
    pub public_url: String,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            public_url: "http://localhost:8080".into(),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Authentication settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret expected in the `X-API-KEY` header of non-GET requests.
    pub api_key: Option<String>,
}

/// Where metadata and image bodies live on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
    pub objects_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/sharex.db"),
            objects_dir: PathBuf::from("./data/objects"),
        }
    }
}

/// Public media serving settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Serve stored bodies at `/media/{id}`.
    pub serve: bool,
    /// Base URL for `url` links when bodies are served elsewhere (a CDN or
    /// bucket domain). Defaults to `{server.public_url}/media`.
    pub public_url: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            serve: true,
            public_url: None,
        }
    }
}
