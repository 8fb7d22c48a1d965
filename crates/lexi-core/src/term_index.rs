use std::collections::{HashMap, HashSet};

use lexi_types::normalize_term;

/// In-memory projection of the saved vocabulary
///
/// Rebuilt from scratch whenever the vocabulary changes; never persisted.
#[derive(Debug, Default, Clone)]
pub struct TermIndex {
    all_terms: HashSet<String>,
    single_word_terms: HashSet<String>,
    phrase_terms: HashSet<String>,
    variant_to_lemma: HashMap<String, String>,
}

fn is_phrase(term: &str) -> bool {
    term.chars().any(char::is_whitespace)
}

impl TermIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term; returns false when it was empty or already present
    pub fn insert(&mut self, term: &str) -> bool {
        let normalized = normalize_term(term);
        if normalized.is_empty() || self.all_terms.contains(&normalized) {
            return false;
        }

        if is_phrase(&normalized) {
            self.phrase_terms.insert(normalized.clone());
        } else {
            self.single_word_terms.insert(normalized.clone());
        }
        self.all_terms.insert(normalized);
        true
    }

    /// Add a variant and record the lemma it belongs to
    pub fn insert_variant(&mut self, variant: &str, lemma: &str) {
        let variant = normalize_term(variant);
        let lemma = normalize_term(lemma);
        if variant.is_empty() || lemma.is_empty() {
            return;
        }

        self.insert(&lemma);
        // Lemmas always resolve to themselves
        self.variant_to_lemma.insert(lemma.clone(), lemma.clone());

        self.insert(&variant);
        // Otherwise a variant shared by two lemmas keeps its first owner
        self.variant_to_lemma.entry(variant).or_insert(lemma);
    }

    pub fn clear(&mut self) {
        self.all_terms.clear();
        self.single_word_terms.clear();
        self.phrase_terms.clear();
        self.variant_to_lemma.clear();
    }

    pub fn has(&self, term: &str) -> bool {
        self.all_terms.contains(&normalize_term(term))
    }

    pub fn has_single_word(&self, term: &str) -> bool {
        self.single_word_terms.contains(&normalize_term(term))
    }

    pub fn has_phrase(&self, term: &str) -> bool {
        self.phrase_terms.contains(&normalize_term(term))
    }

    /// Phrase terms in sorted order
    pub fn list_phrases(&self) -> Vec<&str> {
        let mut phrases: Vec<&str> = self.phrase_terms.iter().map(String::as_str).collect();
        phrases.sort_unstable();
        phrases
    }

    pub fn lemma_for(&self, key: &str) -> Option<&str> {
        self.variant_to_lemma
            .get(&normalize_term(key))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.all_terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_terms.is_empty()
    }

    pub fn single_word_count(&self) -> usize {
        self.single_word_terms.len()
    }

    pub fn phrase_count(&self) -> usize {
        self.phrase_terms.len()
    }
}
