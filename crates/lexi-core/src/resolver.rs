use lexi_types::Match;
use regex::Regex;

use crate::term_index::TermIndex;

/// Finds saved terms inside a text node
///
/// Phrase patterns are compiled once on construction, so build one resolver
/// per scan pass and reuse it for every text node.
pub struct MatchResolver<'a> {
    index: &'a TermIndex,
    phrases: Vec<(String, Regex)>,
    min_word_len: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive pattern with word boundaries; inner whitespace matches any run of whitespace
fn phrase_pattern(phrase: &str) -> String {
    let body = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let lead = if phrase.chars().next().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    let trail = if phrase.chars().last().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    format!("(?i){lead}{body}{trail}")
}

/// Runs of ASCII letters not glued to other word characters, as (start, word)
fn word_runs(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut chars = text.char_indices().peekable();
    let mut prev: Option<char> = None;
    std::iter::from_fn(move || {
        while let Some((start, c)) = chars.next() {
            let glued = prev.is_some_and(is_word_char);
            prev = Some(c);
            if !c.is_ascii_alphabetic() {
                continue;
            }
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !next.is_ascii_alphabetic() {
                    break;
                }
                end = i + next.len_utf8();
                prev = Some(next);
                chars.next();
            }
            let followed = chars.peek().is_some_and(|&(_, next)| is_word_char(next));
            if glued || followed {
                continue;
            }
            return Some((start, &text[start..end]));
        }
        None
    })
}

impl<'a> MatchResolver<'a> {
    pub fn new(index: &'a TermIndex, min_word_len: usize) -> Self {
        let phrases = index
            .list_phrases()
            .into_iter()
            .filter_map(|phrase| match Regex::new(&phrase_pattern(phrase)) {
                Ok(re) => Some((phrase.to_string(), re)),
                Err(e) => {
                    tracing::warn!("Skipping phrase '{}': {}", phrase, e);
                    None
                }
            })
            .collect();

        Self {
            index,
            phrases,
            min_word_len,
        }
    }

    /// Ordered, non-overlapping matches for one text node
    pub fn resolve(&self, text: &str) -> Vec<Match> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut found: Vec<Match> = Vec::new();

        for (phrase, re) in &self.phrases {
            for m in re.find_iter(text) {
                found.push(Match {
                    matched_text: m.as_str().to_string(),
                    start: m.start(),
                    term: phrase.clone(),
                });
            }
        }
        let phrase_spans: Vec<(usize, usize)> = found.iter().map(|m| (m.start, m.end())).collect();

        for (start, word) in word_runs(text) {
            if word.len() < self.min_word_len {
                continue;
            }
            let key = word.to_ascii_lowercase();
            if !self.index.has_single_word(&key) {
                continue;
            }
            let end = start + word.len();
            let inside_phrase = phrase_spans
                .iter()
                .any(|&(p_start, p_end)| start >= p_start && end <= p_end);
            if inside_phrase {
                continue;
            }
            found.push(Match {
                matched_text: word.to_string(),
                start,
                term: key,
            });
        }

        // Leftmost first, longer first on equal starts
        found.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| b.matched_text.len().cmp(&a.matched_text.len()))
                .then_with(|| a.term.cmp(&b.term))
        });

        let mut kept: Vec<Match> = Vec::with_capacity(found.len());
        let mut last_end = 0;
        for m in found {
            if m.start >= last_end {
                last_end = m.end();
                kept.push(m);
            }
        }

        tracing::trace!("Resolved {} matches in {} bytes", kept.len(), text.len());
        kept
    }
}
