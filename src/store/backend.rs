//! Backend trait for key-addressed blob storage

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content type for base64 encoded payloads
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Content type for plain JSON bodies
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Metadata written alongside every blob
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// MIME type of the body
    pub content_type: String,
    /// Expiration hint for the store; not enforced here
    pub expires: DateTime<Utc>,
}

impl ObjectMeta {
    pub fn new(content_type: impl Into<String>, expires: DateTime<Utc>) -> Self {
        ObjectMeta {
            content_type: content_type.into(),
            expires,
        }
    }
}

/// A bucket/key addressed byte store
///
/// Implementations can use:
/// - An in-process map (tests, local tooling)
/// - A directory on the local filesystem
/// - A remote S3-compatible service over HTTP
///
/// Implementations must report a missing object as `Error::NotFound` and
/// keep it distinguishable from transport failures.
pub trait BlobBackend: Send + Sync {
    /// Fetch the full body stored at `bucket`/`key`
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Store `data` at `bucket`/`key`, replacing any previous body
    fn put(&self, bucket: &str, key: &str, data: &[u8], meta: &ObjectMeta) -> Result<()>;

    /// Short backend name used in log output
    fn name(&self) -> &str;
}

/// Check a bucket name before it becomes a path or URL segment
pub(crate) fn validate_bucket(bucket: &str) -> Result<&str> {
    if bucket.is_empty() || bucket.starts_with('.') || bucket.contains(['/', '\\']) {
        return Err(Error::InvalidKey(format!("Invalid bucket name: {:?}", bucket)));
    }
    Ok(bucket)
}

/// Split a key on `/`, rejecting segments that a path or URL would collapse
///
/// Empty, `.` and `..` segments are refused rather than normalized, so two
/// distinct keys can never address the same object.
pub(crate) fn key_segments(key: &str) -> Result<Vec<&str>> {
    if key.is_empty() {
        return Err(Error::InvalidKey("Empty key".into()));
    }

    let segments: Vec<&str> = key.split('/').collect();
    for segment in &segments {
        if segment.is_empty() || *segment == "." || *segment == ".." || segment.contains('\\') {
            return Err(Error::InvalidKey(format!("Invalid key: {:?}", key)));
        }
    }
    Ok(segments)
}
