use std::time::{SystemTime, UNIX_EPOCH};

use lexi_types::VocabularyEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

pub const VOCABULARY_KEY: &str = "vocabularyList";
pub const CLUE_MODE_KEY: &str = "clueMode";

/// One element of the stored vocabulary list
///
/// Early versions saved bare words, and old writers appended bare words to
/// lists that already held entries, so both shapes can share one list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedItem {
    Entry(VocabularyEntry),
    Word(String),
}

impl PersistedItem {
    /// Decode one stored element; `None` when unreadable or keyless
    pub fn decode(item: &Value, now: u64) -> Option<VocabularyEntry> {
        match PersistedItem::deserialize(item) {
            Ok(persisted) => Some(persisted.into_entry(now)).filter(|e| !e.key().is_empty()),
            Err(e) => {
                tracing::warn!("Skipping unreadable vocabulary item {}: {}", item, e);
                None
            }
        }
    }

    pub fn into_entry(self, now: u64) -> VocabularyEntry {
        match self {
            PersistedItem::Entry(entry) => entry.normalized(),
            PersistedItem::Word(word) => VocabularyEntry::bare(&word, now),
        }
    }
}

/// Raw elements of the stored list; missing or null is an empty list
pub fn stored_items(value: Option<&Value>) -> Result<Vec<Value>, StoreError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(_) => Err(StoreError::Format(format!(
            "'{}' is not a list",
            VOCABULARY_KEY
        ))),
    }
}

/// Decode the stored list element by element, skipping what cannot be read
pub fn decode_vocabulary(value: Option<&Value>, now: u64) -> Vec<VocabularyEntry> {
    let items = match stored_items(value) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("Ignoring vocabulary: {}", e);
            return Vec::new();
        }
    };
    let legacy = items.iter().filter(|item| item.is_string()).count();
    if legacy > 0 {
        tracing::info!("Migrating {} legacy vocabulary words", legacy);
    }
    items
        .iter()
        .filter_map(|item| PersistedItem::decode(item, now))
        .collect()
}

/// Stored clue-mode flag; anything but `true` counts as off
pub fn decode_clue_mode(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
