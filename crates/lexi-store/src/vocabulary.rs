use std::collections::HashMap;
use std::sync::Arc;

use kanal::AsyncReceiver;
use lexi_core::TermIndex;
use lexi_types::{StorageChange, VocabularyEntry, normalize_term};
use serde_json::Value;

use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::persisted::{
    CLUE_MODE_KEY, PersistedItem, VOCABULARY_KEY, decode_clue_mode, decode_vocabulary, now_millis,
    stored_items,
};

/// State read from the store at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedState {
    pub clue_mode: bool,
    pub entries: usize,
}

/// Vocabulary view over a key-value store that keeps a `TermIndex` in sync
pub struct VocabularyStore {
    backend: Option<Arc<dyn KeyValueStore>>,
    entries: Vec<VocabularyEntry>,
    by_lemma: HashMap<String, usize>,
}

impl VocabularyStore {
    pub fn new(backend: Option<Arc<dyn KeyValueStore>>) -> Self {
        Self {
            backend,
            entries: Vec::new(),
            by_lemma: HashMap::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Read vocabulary and clue mode; a missing or failing store loads as empty and off
    pub async fn load(&mut self, index: &mut TermIndex) -> LoadedState {
        let Some(backend) = self.backend.clone() else {
            tracing::warn!("No vocabulary store available, starting empty");
            self.replace(Vec::new(), index);
            return LoadedState {
                clue_mode: false,
                entries: 0,
            };
        };

        let vocabulary = backend.get(VOCABULARY_KEY).await.unwrap_or_else(|e| {
            tracing::error!("Failed to read vocabulary: {}", e);
            None
        });
        let clue_mode = backend.get(CLUE_MODE_KEY).await.unwrap_or_else(|e| {
            tracing::error!("Failed to read clue mode: {}", e);
            None
        });

        let entries = self.apply_vocabulary(vocabulary.as_ref(), index);
        let clue_mode = decode_clue_mode(clue_mode.as_ref());
        tracing::info!("Loaded {} vocabulary entries, clue mode {}", entries, clue_mode);
        LoadedState { clue_mode, entries }
    }

    pub fn subscribe(&self) -> Option<AsyncReceiver<StorageChange>> {
        self.backend.as_ref().map(|b| b.subscribe())
    }

    /// Replace the cached list from a stored value and rebuild the index
    pub fn apply_vocabulary(&mut self, value: Option<&Value>, index: &mut TermIndex) -> usize {
        let entries = decode_vocabulary(value, now_millis());
        self.replace(entries, index);
        self.entries.len()
    }

    fn replace(&mut self, entries: Vec<VocabularyEntry>, index: &mut TermIndex) {
        self.entries.clear();
        self.by_lemma.clear();
        for entry in entries {
            let key = entry.key();
            if self.by_lemma.contains_key(&key) {
                tracing::warn!("Duplicate vocabulary entry '{}' ignored", key);
                continue;
            }
            self.by_lemma.insert(key, self.entries.len());
            self.entries.push(entry);
        }

        index.clear();
        for entry in &self.entries {
            let lemma = entry.key();
            index.insert_variant(&lemma, &lemma);
            for variant in &entry.variants {
                index.insert_variant(variant, &lemma);
            }
        }
        tracing::debug!(
            "Term index rebuilt: {} words, {} phrases",
            index.single_word_count(),
            index.phrase_count()
        );
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, lemma: &str) -> Option<&VocabularyEntry> {
        self.by_lemma
            .get(&normalize_term(lemma))
            .and_then(|&i| self.entries.get(i))
    }

    /// Entry for a marker key: through the variant map, else the key itself
    pub fn resolve(&self, key: &str, index: &TermIndex) -> Option<&VocabularyEntry> {
        let lemma = index
            .lemma_for(key)
            .map(str::to_string)
            .unwrap_or_else(|| normalize_term(key));
        self.get(&lemma)
    }

    fn backend(&self) -> Result<&Arc<dyn KeyValueStore>, StoreError> {
        self.backend.as_ref().ok_or(StoreError::Unavailable)
    }

    /// Stored elements as they are; unreadable ones are carried through writes
    async fn read_items(&self) -> Result<Vec<Value>, StoreError> {
        let value = self.backend()?.get(VOCABULARY_KEY).await?;
        stored_items(value.as_ref())
    }

    async fn write_items(&self, items: Vec<Value>) -> Result<(), StoreError> {
        self.backend()?.set(VOCABULARY_KEY, Value::Array(items)).await
    }

    /// Append an entry unless its lemma is already saved; returns whether it was added
    pub async fn add_entry(&self, entry: VocabularyEntry) -> Result<bool, StoreError> {
        let entry = entry.normalized();
        let key = entry.key();
        if key.is_empty() {
            return Ok(false);
        }

        let mut items = self.read_items().await?;
        let now = now_millis();
        if items
            .iter()
            .filter_map(|item| PersistedItem::decode(item, now))
            .any(|e| e.key() == key)
        {
            tracing::debug!("'{}' already saved", key);
            return Ok(false);
        }
        items.push(serde_json::to_value(&entry)?);
        self.write_items(items).await?;
        tracing::info!("Saved '{}' to vocabulary", key);
        Ok(true)
    }

    pub async fn remove(&self, lemma: &str) -> Result<bool, StoreError> {
        let key = normalize_term(lemma);
        let mut items = self.read_items().await?;
        let now = now_millis();
        let before = items.len();
        items.retain(|item| PersistedItem::decode(item, now).is_none_or(|e| e.key() != key));
        if items.len() == before {
            return Ok(false);
        }
        self.write_items(items).await?;
        tracing::info!("Removed '{}' from vocabulary", key);
        Ok(true)
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.write_items(Vec::new()).await
    }

    pub async fn set_clue_mode(&self, enabled: bool) -> Result<(), StoreError> {
        self.backend()?.set(CLUE_MODE_KEY, Value::Bool(enabled)).await
    }
}
