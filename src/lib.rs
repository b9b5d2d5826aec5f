//! # blobpipe
//!
//! Compressed JSON persistence for event-driven functions.
//!
//! blobpipe moves structured records between compute functions and a
//! key-addressed blob store. Records are stored either as plain JSON or as
//! base64 text over a zlib (or gzip) compressed JSON body, and storage
//! change notifications can be resolved straight to the blob they reference.
//!
//! ## Core Concepts
//!
//! - **Codec**: JSON → compress → base64, and back
//! - **ObjectStore**: get/put records by bucket and key over a `BlobBackend`
//! - **Events**: pull the affected key out of a storage notification
//! - **Transactions**: all-or-nothing database work with panic capture
//! - **Ranking**: top-K over counted keys
//!
//! ## Example
//!
//! ```ignore
//! use blobpipe::{MemoryBackend, ObjectStore};
//!
//! let store = ObjectStore::new(MemoryBackend::new());
//! store.put("reports", "daily.json", &report, true)?;
//! let body = store.get_from_event(&event, "reports", true)?;
//! ```

pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod event;
pub mod rank;
pub mod store;
pub mod txn;
pub mod util;

mod error;

pub use codec::{compress_raw, decompress_raw, Codec, Compression};
pub use config::{BackendConfig, StoreConfig};
pub use diagnostics::{DiagnosticSink, MemorySink, StderrSink};
pub use error::{Error, Result};
pub use event::{resolve_body, resolve_key, StorageEvent};
pub use rank::{top_k, RankedEntry};
#[cfg(feature = "http")]
pub use store::HttpBackend;
pub use store::{BlobBackend, FsBackend, MemoryBackend, ObjectMeta, ObjectStore};
pub use txn::{run_in_transaction, TransactionHandle, TransactionSource};
