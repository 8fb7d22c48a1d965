use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geometry::Placement;

/// Normalized form of a term: trimmed and lower-cased
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// A saved word or phrase with its definition data
///
/// Persisted in camelCase; the snake_case keys written by older versions
/// (`word`, `definition_en`, ...) are accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    #[serde(alias = "word")]
    pub lemma: String,
    #[serde(default)]
    pub phonetic: String,
    #[serde(default, alias = "definition_en")]
    pub definition_primary: String,
    #[serde(default, alias = "definition_zh")]
    pub definition_secondary: String,
    #[serde(default, alias = "example_sentences")]
    pub example_sentences: Vec<ExampleSentence>,
    /// Surface forms that resolve to this entry, always including the lemma
    #[serde(default)]
    pub variants: BTreeSet<String>,
    /// Milliseconds since the Unix epoch
    #[serde(default, alias = "added_at")]
    pub added_at: u64,
}

impl VocabularyEntry {
    /// Entry with no definition data, as produced by migrating a bare word
    pub fn bare(word: &str, added_at: u64) -> Self {
        let lemma = normalize_term(word);
        Self {
            variants: BTreeSet::from([lemma.clone()]),
            lemma,
            phonetic: String::new(),
            definition_primary: String::new(),
            definition_secondary: String::new(),
            example_sentences: Vec::new(),
            added_at,
        }
    }

    /// Identity key (lower-cased lemma)
    pub fn key(&self) -> String {
        normalize_term(&self.lemma)
    }

    /// Normalize variants and make sure the lemma is one of them
    pub fn normalized(mut self) -> Self {
        let key = self.key();
        let mut variants: BTreeSet<String> = self
            .variants
            .iter()
            .map(|v| normalize_term(v))
            .filter(|v| !v.is_empty())
            .collect();
        if !key.is_empty() {
            variants.insert(key);
        }
        self.variants = variants;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleSentence {
    #[serde(default, alias = "en")]
    pub primary: String,
    #[serde(default, alias = "zh")]
    pub secondary: String,
}

/// A term occurrence inside a single text node
///
/// `start` is a byte offset into the node's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub matched_text: String,
    pub start: usize,
    /// Lookup key: the phrase, or the lower-cased word
    pub term: String,
}

impl Match {
    pub fn end(&self) -> usize {
        self.start + self.matched_text.len()
    }

    pub fn overlaps(&self, other: &Match) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// Handle of a node inside a `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Definition popup as handed to the UI
#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    /// Lookup key carried by the clicked marker
    pub key: String,
    pub entry: VocabularyEntry,
    pub placement: Placement,
    pub pinned: bool,
}
