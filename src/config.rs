//! Store configuration
//!
//! Read from the environment:
//! - `BLOBPIPE_ENDPOINT`: S3-compatible endpoint; selects the HTTP backend
//! - `BLOBPIPE_TOKEN`: optional bearer token for the endpoint
//! - `BLOBPIPE_ROOT`: directory for the local backend
//! - `BLOBPIPE_TIMEOUT_SECS`: HTTP request timeout
//! - `BLOBPIPE_RETENTION_SECS`: expiration hint for written blobs
//! - `BLOBPIPE_COMPRESSION`: `zlib` or `gzip`

use crate::codec::{Codec, Compression};
use crate::store::{expiry_after, FsBackend, ObjectStore, DEFAULT_RETENTION};
use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where blobs live
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendConfig {
    /// Remote S3-compatible endpoint
    Http { endpoint: String },
    /// Directory on the local filesystem
    Local { root: PathBuf },
}

/// Everything needed to open an `ObjectStore`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: BackendConfig,
    /// Bearer token sent to the HTTP backend
    pub token: Option<String>,
    /// Request timeout in seconds (HTTP backend only)
    pub timeout_secs: u64,
    /// Expiration hint in seconds
    pub retention_secs: u64,
    pub compression: Compression,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: BackendConfig::Local {
                root: default_root(),
            },
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retention_secs: DEFAULT_RETENTION.as_secs(),
            compression: Compression::default(),
        }
    }
}

/// Default local root: `<data dir>/blobpipe`, or `./.blobpipe` without one
pub fn default_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("blobpipe"))
        .unwrap_or_else(|| PathBuf::from(".blobpipe"))
}

impl StoreConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = StoreConfig::default();

        if let Some(endpoint) = var("BLOBPIPE_ENDPOINT") {
            config.backend = BackendConfig::Http { endpoint };
        } else if let Some(root) = var("BLOBPIPE_ROOT") {
            config.backend = BackendConfig::Local {
                root: PathBuf::from(root),
            };
        }

        config.token = var("BLOBPIPE_TOKEN");
        if let Some(timeout) = var("BLOBPIPE_TIMEOUT_SECS") {
            config.timeout_secs = parse_secs("BLOBPIPE_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(retention) = var("BLOBPIPE_RETENTION_SECS") {
            config.retention_secs = parse_secs("BLOBPIPE_RETENTION_SECS", &retention)?;
            expiry_after(chrono::Utc::now(), Duration::from_secs(config.retention_secs))?;
        }
        if let Some(compression) = var("BLOBPIPE_COMPRESSION") {
            config.compression = compression.parse()?;
        }

        Ok(config)
    }

    /// Open an object store for this configuration
    pub fn open(&self) -> Result<ObjectStore> {
        let store = match &self.backend {
            BackendConfig::Local { root } => ObjectStore::new(FsBackend::new(root)),
            BackendConfig::Http { endpoint } => self.open_http(endpoint)?,
        };

        Ok(store
            .with_codec(Codec::new(self.compression))
            .with_retention(Duration::from_secs(self.retention_secs)))
    }

    #[cfg(feature = "http")]
    fn open_http(&self, endpoint: &str) -> Result<ObjectStore> {
        let backend = crate::store::HttpBackend::new(
            endpoint,
            self.token.clone(),
            Duration::from_secs(self.timeout_secs),
        )?;
        Ok(ObjectStore::new(backend))
    }

    #[cfg(not(feature = "http"))]
    fn open_http(&self, endpoint: &str) -> Result<ObjectStore> {
        Err(Error::Config(format!(
            "Endpoint {} configured but the `http` feature is disabled",
            endpoint
        )))
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        Error::Config(format!(
            "{} must be a whole number of seconds, got {:?}",
            name, value
        ))
    })
}
