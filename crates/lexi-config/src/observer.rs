use serde::{Deserialize, Serialize};

fn default_debounce_ms() -> u64 {
    300
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ObserverConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}
