//! Blob storage
//!
//! `ObjectStore` moves JSON records in and out of a `BlobBackend`, routing
//! them through the payload codec on request. Backends only deal in bytes
//! and metadata.

mod backend;
mod fs;
#[cfg(feature = "http")]
mod http;
mod memory;
mod object_store;

pub use backend::{BlobBackend, ObjectMeta, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT};
pub use fs::FsBackend;
#[cfg(feature = "http")]
pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use object_store::{ObjectStore, DEFAULT_RETENTION};
pub(crate) use object_store::expiry_after;
