use lexi_types::{ExampleSentence, VocabularyEntry, normalize_term};
use serde::Deserialize;

use crate::LookupError;

/// Definition data returned by the lookup service
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LookupRecord {
    #[serde(alias = "lemma")]
    pub word: String,
    pub phonetic: String,
    #[serde(alias = "definition_en")]
    pub definition_primary: String,
    #[serde(alias = "definition_zh")]
    pub definition_secondary: String,
    #[serde(alias = "example_sentences")]
    pub example_sentences: Vec<ExampleSentence>,
    pub variants: Vec<String>,
}

/// Strip a markdown code fence some models wrap around JSON
fn unfence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

impl LookupRecord {
    /// Decode the service's JSON object; missing fields fall back to empty values
    pub fn from_content(content: &str, requested: &str) -> Result<Self, LookupError> {
        let mut record: LookupRecord = serde_json::from_str(unfence(content))
            .map_err(|e| LookupError::Parse(e.to_string()))?;
        if record.word.trim().is_empty() {
            record.word = requested.trim().to_string();
        }
        Ok(record)
    }

    /// Entry keyed by the lower-cased word, variants normalized
    pub fn into_entry(self, added_at: u64) -> VocabularyEntry {
        VocabularyEntry {
            lemma: normalize_term(&self.word),
            phonetic: self.phonetic,
            definition_primary: self.definition_primary,
            definition_secondary: self.definition_secondary,
            example_sentences: self.example_sentences,
            variants: self.variants.into_iter().collect(),
            added_at,
        }
        .normalized()
    }
}
