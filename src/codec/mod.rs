//! Payload codec
//!
//! Structured records travel as base64 text wrapping a compressed JSON
//! document. The compression stage is selectable (zlib by default, gzip on
//! request); decoders never leave this module, callers only see final bytes.

mod compression;
mod payload;

pub use compression::{compress_raw, decompress_raw, Compression};
pub use payload::Codec;
