use std::env;

use lexi_types::Viewport;
use serde::{Deserialize, Serialize};

use self::highlight::HighlightConfig;
use self::observer::ObserverConfig;
use self::popup::PopupConfig;
use self::scan::ScanConfig;
use self::store::StoreConfig;

pub mod highlight;
pub mod observer;
pub mod popup;
pub mod scan;
pub mod store;

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub observer: ObserverConfig,
    pub highlight: HighlightConfig,
    pub popup: PopupConfig,
    pub store: StoreConfig,
    /// Initial viewport size until the host reports one
    pub viewport: Viewport,
    /// Capacity of the host -> app event channel
    pub event_capacity: usize,
}

impl Config {
    pub fn new() -> Self {
        let mut scan = ScanConfig::default();
        if let Some(ms) = env_u64("LEXI_IDLE_TIMEOUT_MS") {
            scan.idle_timeout_ms = ms;
        }

        let mut observer = ObserverConfig::default();
        if let Some(ms) = env_u64("LEXI_DEBOUNCE_MS") {
            observer.debounce_ms = ms;
        }

        Config {
            scan,
            observer,
            highlight: HighlightConfig::default(),
            popup: PopupConfig::default(),
            store: StoreConfig::new(),
            viewport: Viewport::default(),
            event_capacity: 256,
        }
    }

    /// Fill zero values a partial config file may leave behind
    pub fn sanitized(mut self) -> Self {
        if self.event_capacity == 0 {
            self.event_capacity = 256;
        }
        if self.scan.min_word_len == 0 {
            self.scan.min_word_len = 1;
        }
        self
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "observer": { "debounce_ms": 50 } }"#).unwrap();
        assert_eq!(config.observer.debounce_ms, 50);
        assert_eq!(config.scan.idle_timeout_ms, 1000);
        assert_eq!(config.scan.min_word_len, 3);
        assert_eq!(config.highlight.marker_class, "leximind-clue");
        assert_eq!(config.popup.width, 400.0);
        assert_eq!(config.store.path, "vocabulary.json");
    }

    #[test]
    fn test_sanitized_restores_capacity() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.event_capacity, 0);
        assert_eq!(config.sanitized().event_capacity, 256);
    }
}
