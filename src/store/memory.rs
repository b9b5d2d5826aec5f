//! In-memory backend

use super::backend::{BlobBackend, ObjectMeta};
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

struct StoredObject {
    data: Vec<u8>,
    meta: ObjectMeta,
}

/// A backend that keeps every blob in process memory
///
/// Useful for tests and for wiring functions together locally. Safe to share
/// between threads.
#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata recorded for a blob, if it exists
    pub fn meta(&self, bucket: &str, key: &str) -> Option<ObjectMeta> {
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .map(|obj| obj.meta.clone())
    }

    /// Number of stored blobs across all buckets
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

impl BlobBackend for MemoryBackend {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .map(|obj| obj.data.clone())
            .ok_or_else(|| Error::not_found(bucket, key))
    }

    fn put(&self, bucket: &str, key: &str, data: &[u8], meta: &ObjectMeta) -> Result<()> {
        let object = StoredObject {
            data: data.to_vec(),
            meta: meta.clone(),
        };
        self.objects
            .write()
            .insert((bucket.to_string(), key.to_string()), object);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
