//! Local filesystem backend
//!
//! Layout:
//! ```text
//! <root>/
//!   <bucket>/<key>                       - blob body
//!   .meta/<bucket>/<dir>.d/.../<name>.json - ObjectMeta as JSON
//!   .staging/                            - writes in flight
//! ```
//!
//! Keys may contain `/`, which maps onto nested directories. Directory
//! segments of the metadata tree carry a `.d` suffix and file names a
//! `.json` suffix, so `x` and `x.json/y` get separate sidecars. A key can
//! not be both a blob and a prefix of other keys (`x` and `x/y`).

use super::backend::{key_segments, validate_bucket, BlobBackend, ObjectMeta};
use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const META_DIR: &str = ".meta";
const STAGING_DIR: &str = ".staging";

static STAGED: AtomicU64 = AtomicU64::new(0);

/// A backend storing each blob as a file under a root directory
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    /// Create a backend rooted at `root`; the directory is created on first write
    pub fn new(root: impl AsRef<Path>) -> Self {
        FsBackend {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the metadata sidecar for a blob
    pub fn meta(&self, bucket: &str, key: &str) -> Result<ObjectMeta> {
        let path = self.meta_path(bucket, key)?;
        let content = read_file(&path, bucket, key)?;
        Ok(serde_json::from_slice(&content)?)
    }

    fn blob_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let mut path = self.root.join(validate_bucket(bucket)?);
        for segment in key_segments(key)? {
            path.push(segment);
        }
        Ok(path)
    }

    fn meta_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let mut path = self.root.join(META_DIR).join(validate_bucket(bucket)?);
        let segments = key_segments(key)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| Error::InvalidKey("Empty key".into()))?;
        for segment in parents {
            path.push(format!("{}.d", segment));
        }
        path.push(format!("{}.json", last));
        Ok(path)
    }

    /// Refuse keys that would turn an existing blob into a directory or back
    fn check_layout(&self, bucket: &str, key: &str, blob_path: &Path) -> Result<()> {
        if blob_path.is_dir() {
            return Err(Error::InvalidKey(format!(
                "Key {:?} in {:?} is a prefix of existing keys",
                key, bucket
            )));
        }

        let mut dir = self.root.join(bucket);
        let segments = key_segments(key)?;
        for segment in &segments[..segments.len() - 1] {
            dir.push(segment);
            if dir.is_file() {
                return Err(Error::InvalidKey(format!(
                    "Key {:?} in {:?} is nested under an existing key",
                    key, bucket
                )));
            }
        }
        Ok(())
    }

    /// Write `data` to a fresh file in the staging directory
    fn stage(&self, data: &[u8]) -> Result<PathBuf> {
        let dir = self.root.join(STAGING_DIR);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!(
            "{}-{}",
            std::process::id(),
            STAGED.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&path, data)?;
        Ok(path)
    }
}

fn read_file(path: &Path, bucket: &str, key: &str) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == ErrorKind::NotFound || !path.is_file() => {
            Err(Error::not_found(bucket, key))
        }
        Err(e) => Err(e.into()),
    }
}

/// Move a staged file into place
fn commit(staged: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::rename(staged, target)?;
    Ok(())
}

impl BlobBackend for FsBackend {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(bucket, key)?;
        read_file(&path, bucket, key)
    }

    fn put(&self, bucket: &str, key: &str, data: &[u8], meta: &ObjectMeta) -> Result<()> {
        let blob_path = self.blob_path(bucket, key)?;
        let meta_path = self.meta_path(bucket, key)?;
        self.check_layout(bucket, key, &blob_path)?;

        let staged_meta = self.stage(&serde_json::to_vec_pretty(meta)?)?;
        let staged_blob = match self.stage(data) {
            Ok(path) => path,
            Err(e) => {
                let _ = std::fs::remove_file(&staged_meta);
                return Err(e);
            }
        };

        // The body goes last: a failed put never replaces it
        let result =
            commit(&staged_meta, &meta_path).and_then(|_| commit(&staged_blob, &blob_path));
        if result.is_err() {
            let _ = std::fs::remove_file(&staged_meta);
            let _ = std::fs::remove_file(&staged_blob);
        }
        result
    }

    fn name(&self) -> &str {
        "fs"
    }
}
