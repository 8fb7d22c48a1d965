use serde::{Deserialize, Serialize};

fn default_idle_timeout_ms() -> u64 {
    1000
}

fn default_min_word_len() -> usize {
    3
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ScanConfig {
    /// Upper bound on how long a requested scan waits for the event queue to drain
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    /// Shortest ASCII-letter run tested against single-word terms
    #[serde(default = "default_min_word_len")]
    pub min_word_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout_ms(),
            min_word_len: default_min_word_len(),
        }
    }
}
