//! Storage change notifications
//!
//! Only the key of the first record is used:
//! ```text
//! { "Records": [ { "s3": { "object": { "key": "<string>" } } }, ... ] }
//! ```
//! Every other field is ignored.

use crate::store::ObjectStore;
use crate::{Error, Result};
use serde::Deserialize;

/// A storage change notification
#[derive(Clone, Debug, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

/// One change record inside a notification
#[derive(Clone, Debug, Deserialize)]
pub struct EventRecord {
    pub s3: EventEntity,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventEntity {
    pub object: EventObject,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventObject {
    pub key: String,
}

impl StorageEvent {
    /// Parse a raw notification payload
    pub fn parse(event: &[u8]) -> Result<Self> {
        serde_json::from_slice(event).map_err(|e| Error::MalformedEvent(e.to_string()))
    }

    /// Key of the first record
    pub fn first_key(&self) -> Result<&str> {
        let record = self.records.first().ok_or(Error::EmptyEvent)?;
        let key = record.s3.object.key.as_str();
        if key.is_empty() {
            return Err(Error::MalformedEvent("First record has an empty key".into()));
        }
        Ok(key)
    }
}

/// Extract the blob key referenced by a notification payload
pub fn resolve_key(event: &[u8]) -> Result<String> {
    Ok(StorageEvent::parse(event)?.first_key()?.to_string())
}

/// Resolve the key and fetch its blob, returning both
pub fn resolve_body(
    store: &ObjectStore,
    event: &[u8],
    bucket: &str,
    decompress: bool,
) -> Result<(Vec<u8>, String)> {
    let key = resolve_key(event)?;
    let body = store.get(bucket, &key, decompress)?;
    Ok((body, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    #[test]
    fn test_resolve_key() {
        let event = br#"{"Records":[{"s3":{"object":{"key":"abc"}}}]}"#;
        assert_eq!(resolve_key(event).unwrap(), "abc");
    }

    #[test]
    fn test_resolve_key_uses_first_record_and_ignores_extras() {
        let event = br#"{
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": {"name": "uploads"},
                        "object": {"key": "first.json", "size": 42}
                    }
                },
                {"s3": {"object": {"key": "second.json"}}}
            ]
        }"#;
        assert_eq!(resolve_key(event).unwrap(), "first.json");
    }

    #[test]
    fn test_empty_records() {
        let err = resolve_key(br#"{"Records":[]}"#).unwrap_err();
        assert!(matches!(err, Error::EmptyEvent));
    }

    #[test]
    fn test_malformed_events() {
        let cases: [&[u8]; 6] = [
            b"{}",
            b"not json",
            b"",
            br#"{"Records":null}"#,
            br#"{"Records":[{"s3":{}}]}"#,
            br#"{"Records":[{"s3":{"object":{"key":7}}}]}"#,
        ];
        for event in cases {
            let err = resolve_key(event).unwrap_err();
            assert!(
                matches!(err, Error::MalformedEvent(_)),
                "{:?} gave {:?}",
                String::from_utf8_lossy(event),
                err
            );
        }
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let err = resolve_key(br#"{"Records":[{"s3":{"object":{"key":""}}}]}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent(_)));
    }

    #[test]
    fn test_resolve_body_returns_key() {
        let store = ObjectStore::new(MemoryBackend::new());
        store.put("bucket", "users.json", &vec!["ada", "grace"], true).unwrap();

        let event = br#"{"Records":[{"s3":{"object":{"key":"users.json"}}}]}"#;
        let (body, key) = resolve_body(&store, event, "bucket", true).unwrap();

        assert_eq!(key, "users.json");
        let users: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(users, vec!["ada", "grace"]);
    }

    #[test]
    fn test_resolve_body_missing_blob() {
        let store = ObjectStore::new(MemoryBackend::new());
        let event = br#"{"Records":[{"s3":{"object":{"key":"gone"}}}]}"#;

        let err = resolve_body(&store, event, "bucket", false).unwrap_err();
        assert!(err.is_not_found());
    }
}
