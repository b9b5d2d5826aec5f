//! Compression algorithms and raw stream helpers

use crate::{Error, Result};
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

/// Compression algorithm used inside an encoded payload
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// zlib stream (deflate with an Adler-32 trailer)
    #[default]
    Zlib,
    /// gzip member (header, deflate body, CRC-32 trailer)
    Gzip,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Zlib => "zlib",
            Compression::Gzip => "gzip",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "zlib" | "deflate" => Ok(Compression::Zlib),
            "gzip" | "gz" => Ok(Compression::Gzip),
            other => Err(Error::Config(format!(
                "Unknown compression algorithm: {}",
                other
            ))),
        }
    }
}

/// Compress `data` with the given algorithm
///
/// The encoder is finished before returning, so the output is a complete
/// stream including its trailer.
pub fn compress_raw(data: &[u8], compression: Compression) -> Result<Vec<u8>> {
    let level = flate2::Compression::default();
    let finished = match compression {
        Compression::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), level);
            encoder.write_all(data).map_err(compression_error)?;
            encoder.finish()
        }
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), level);
            encoder.write_all(data).map_err(compression_error)?;
            encoder.finish()
        }
    };

    finished.map_err(compression_error)
}

fn compression_error(e: std::io::Error) -> Error {
    Error::Compression(e.to_string())
}

/// Decompress a complete stream produced with `compression`
///
/// The decoder is drained to the end and dropped before this returns, on
/// success and on every error path alike.
pub fn decompress_raw(data: &[u8], compression: Compression) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Err(Error::Decompression(format!(
            "Empty {} stream",
            compression
        )));
    }

    let mut output = Vec::new();
    let drained = match compression {
        Compression::Zlib => ZlibDecoder::new(data).read_to_end(&mut output),
        Compression::Gzip => GzDecoder::new(data).read_to_end(&mut output),
    };

    match drained {
        Ok(_) => Ok(output),
        Err(e) => Err(Error::Decompression(format!(
            "Invalid {} stream: {}",
            compression, e
        ))),
    }
}
