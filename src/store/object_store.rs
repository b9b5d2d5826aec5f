//! Object store: JSON records in and out of a blob backend

use super::backend::{BlobBackend, ObjectMeta, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT};
use crate::codec::Codec;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Default expiration hint attached to written blobs (one day)
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Reads and writes records against a blob backend, optionally through the codec
///
/// Cheap to clone; clones share the same backend. No caching and no retries:
/// every call goes straight to the backend and failures surface immediately.
#[derive(Clone)]
pub struct ObjectStore {
    backend: Arc<dyn BlobBackend>,
    codec: Codec,
    retention: Duration,
}

impl ObjectStore {
    /// Create a store over `backend` with the default codec and retention
    pub fn new(backend: impl BlobBackend + 'static) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Create a store over a shared backend
    pub fn from_arc(backend: Arc<dyn BlobBackend>) -> Self {
        ObjectStore {
            backend,
            codec: Codec::default(),
            retention: DEFAULT_RETENTION,
        }
    }

    /// Use a different codec for compressed reads and writes
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Change the expiration hint stamped on writes
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn backend(&self) -> &dyn BlobBackend {
        self.backend.as_ref()
    }

    /// Fetch a blob, decoding it first when `decompress` is set
    pub fn get(&self, bucket: &str, key: &str, decompress: bool) -> Result<Vec<u8>> {
        let body = self.backend.get(bucket, key)?;
        tracing::debug!(
            backend = self.backend.name(),
            bucket,
            key,
            bytes = body.len(),
            decompress,
            "fetched blob"
        );

        if decompress {
            self.codec.decode(&body)
        } else {
            Ok(body)
        }
    }

    /// Fetch a blob and deserialize its JSON body
    pub fn get_json<T: DeserializeOwned>(
        &self,
        bucket: &str,
        key: &str,
        decompress: bool,
    ) -> Result<T> {
        let body = self.get(bucket, key, decompress)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Store `value` as JSON, or as an encoded payload when `compress` is set
    pub fn put<T: Serialize + ?Sized>(
        &self,
        bucket: &str,
        key: &str,
        value: &T,
        compress: bool,
    ) -> Result<()> {
        if compress {
            let payload = self.codec.encode(value)?;
            self.put_raw(bucket, key, payload.as_bytes(), CONTENT_TYPE_TEXT)
        } else {
            let body = serde_json::to_vec(value)?;
            self.put_raw(bucket, key, &body, CONTENT_TYPE_JSON)
        }
    }

    /// Store bytes as-is with the given content type
    pub fn put_raw(&self, bucket: &str, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let meta = ObjectMeta::new(content_type, expiry_after(Utc::now(), self.retention)?);
        self.backend.put(bucket, key, data, &meta)?;
        tracing::debug!(
            backend = self.backend.name(),
            bucket,
            key,
            bytes = data.len(),
            content_type,
            "stored blob"
        );
        Ok(())
    }

    /// Fetch the blob referenced by a storage notification
    pub fn get_from_event(&self, event: &[u8], bucket: &str, decompress: bool) -> Result<Vec<u8>> {
        let (body, _key) = crate::event::resolve_body(self, event, bucket, decompress)?;
        Ok(body)
    }
}

/// Expiration timestamp `retention` after `now`
///
/// Fails with `Error::Config` when the result is past the latest
/// representable date.
pub(crate) fn expiry_after(now: DateTime<Utc>, retention: Duration) -> Result<DateTime<Utc>> {
    chrono::Duration::from_std(retention)
        .ok()
        .and_then(|retention| now.checked_add_signed(retention))
        .ok_or_else(|| {
            Error::Config(format!(
                "Retention of {}s is out of range",
                retention.as_secs()
            ))
        })
}
