//! Top-K ranking over counted keys

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A key with its count
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub key: String,
    pub value: i64,
}

impl RankedEntry {
    pub fn new(key: impl Into<String>, value: i64) -> Self {
        RankedEntry {
            key: key.into(),
            value,
        }
    }
}

/// Sort `counts` by value and keep at most `limit` entries
///
/// Ascending unless `descending` is set. A `limit` of zero or less, or one
/// at least as large as the number of keys, keeps every entry. The order of
/// entries with equal values is unspecified.
pub fn top_k(counts: &HashMap<String, i64>, limit: i64, descending: bool) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = counts
        .iter()
        .map(|(key, value)| RankedEntry::new(key.as_str(), *value))
        .collect();

    if descending {
        entries.sort_unstable_by(|a, b| b.value.cmp(&a.value));
    } else {
        entries.sort_unstable_by_key(|entry| entry.value);
    }

    if let Ok(limit) = usize::try_from(limit) {
        if limit > 0 && limit < entries.len() {
            entries.truncate(limit);
        }
    }

    entries
}
