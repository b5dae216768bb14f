//! # Configuration
//!
//! Settings are read from a YAML file. Every section has defaults, so an empty
//! file (or no file at all) starts a local development board.
//!
//! ```yaml
//! server:
//!   bind_addr: "0.0.0.0:8080"
//!   base_url: "https://board.example.org"
//! auth:
//!   tokens:
//!     - token: "s3cret"
//!       username: "alice"
//!       roles: ["Administrator"]
//! features:
//!   spam_words: ["viagra", "cialis"]
//! log:
//!   level: "debug"
//! ```

use axum::http::HeaderValue;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(String),
    #[error("server.base_url `{0}` is not a valid origin")]
    InvalidBaseUrl(String),
    #[error("store.buffer_size must be at least 1")]
    ZeroBufferSize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub features: FeaturesConfig,
    pub log: LogConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_saphyr::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values serde cannot: the CORS origin and the store buffer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.allowed_origin()?;
        if self.store.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// The single origin allowed by CORS.
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            base_url: "http://localhost:4200".to_owned(),
        }
    }
}

impl ServerConfig {
    /// `base_url` as a CORS origin header value. A trailing slash is dropped.
    pub fn allowed_origin(&self) -> Result<HeaderValue, ConfigError> {
        let origin = self.base_url.trim_end_matches('/');
        let valid = (origin.starts_with("http://") || origin.starts_with("https://"))
            && !origin.contains(char::is_whitespace);
        if !valid {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Request channel capacity of each store actor.
    pub buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { buffer_size: 32 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub tokens: Vec<TokenConfig>,
}

/// A bearer token and the user it stands for.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeaturesConfig {
    /// Case-insensitive phrases rejected in authenticated shouts.
    pub spam_words: Vec<String>,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            spam_words: ["sex", "hard core", "viagra", "cialis"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}
