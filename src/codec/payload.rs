//! Text-safe encoded payloads

use super::compression::{compress_raw, decompress_raw, Compression};
use crate::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Converts records to and from base64 text over a compressed JSON body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Codec {
    compression: Compression,
}

impl Codec {
    /// Create a codec for the given compression algorithm
    pub fn new(compression: Compression) -> Self {
        Codec { compression }
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Serialize `value` to JSON, compress it and base64 the result
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = serde_json::to_vec(value)?;
        let compressed = compress_raw(&json, self.compression)?;
        Ok(STANDARD.encode(compressed))
    }

    /// Reverse `encode`, returning the decompressed JSON bytes
    ///
    /// Leading and trailing ASCII whitespace is ignored so that payloads
    /// read from text files or terminals decode as-is.
    pub fn decode(&self, payload: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let compressed = STANDARD.decode(payload.as_ref().trim_ascii())?;
        decompress_raw(&compressed, self.compression)
    }

    /// Decode a payload straight into a typed record
    pub fn decode_json<T: DeserializeOwned>(&self, payload: impl AsRef<[u8]>) -> Result<T> {
        let bytes = self.decode(payload)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        id: u64,
        name: String,
        tags: Vec<String>,
        manager: Option<Box<User>>,
    }

    fn sample_user() -> User {
        User {
            id: 7,
            name: "Ada".into(),
            tags: vec!["admin".into(), "ops".into()],
            manager: Some(Box::new(User {
                id: 1,
                name: "Grace".into(),
                tags: vec![],
                manager: None,
            })),
        }
    }

    #[test]
    fn test_encode_decode_record() {
        let codec = Codec::default();
        let user = sample_user();

        let payload = codec.encode(&user).unwrap();
        let bytes = codec.decode(&payload).unwrap();
        let restored: User = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(restored, user);
    }

    #[test]
    fn test_payload_is_standard_base64() {
        let codec = Codec::default();
        let payload = codec.encode(&vec![1, 2, 3]).unwrap();

        assert!(payload
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='));
        assert_eq!(payload.len() % 4, 0);
    }

    #[test]
    fn test_decode_json_values() {
        let codec = Codec::default();
        let values = vec![
            serde_json::json!(null),
            serde_json::json!("plain string"),
            serde_json::json!([1, 2.5, -3, "x", true]),
            serde_json::json!({"nested": {"list": [{"a": 1}], "unicode": "héllo ✓"}}),
        ];

        for value in values {
            let payload = codec.encode(&value).unwrap();
            let restored: serde_json::Value = codec.decode_json(&payload).unwrap();
            assert_eq!(restored, value);
        }
    }

    #[test]
    fn test_gzip_codec() {
        let codec = Codec::new(Compression::Gzip);
        let mut counts = BTreeMap::new();
        counts.insert("beep".to_string(), 20);
        counts.insert("boop".to_string(), 30);

        let payload = codec.encode(&counts).unwrap();
        let restored: BTreeMap<String, i32> = codec.decode_json(&payload).unwrap();
        assert_eq!(restored, counts);

        // A zlib codec cannot read a gzip payload
        let err = Codec::default().decode(&payload).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));
    }

    #[test]
    fn test_decode_tolerates_surrounding_whitespace() {
        let codec = Codec::default();
        let payload = format!("  {}\n", codec.encode(&"hi").unwrap());
        let restored: String = codec.decode_json(payload).unwrap();
        assert_eq!(restored, "hi");
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = Codec::default().decode("not base64!!").unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_decode_valid_base64_invalid_stream() {
        let payload = STANDARD.encode(b"definitely not deflate");
        let err = Codec::default().decode(payload).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));
    }

    #[test]
    fn test_encode_unserializable_value() {
        // JSON object keys must be strings
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "value");

        let err = Codec::default().encode(&map).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
