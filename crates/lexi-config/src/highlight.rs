use serde::{Deserialize, Serialize};

fn default_marker_tag() -> String {
    "span".to_string()
}

fn default_marker_class() -> String {
    "leximind-clue".to_string()
}

fn default_key_attribute() -> String {
    "data-leximind-key".to_string()
}

fn default_processed_attribute() -> String {
    "data-leximind-processed".to_string()
}

fn default_reserved_prefix() -> String {
    "leximind-".to_string()
}

fn default_marker_style() -> String {
    "border-bottom: 2px dotted #3b82f6; cursor: pointer;".to_string()
}

/// Names used for everything the highlighter writes into the page
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HighlightConfig {
    #[serde(default = "default_marker_tag")]
    pub marker_tag: String,
    #[serde(default = "default_marker_class")]
    pub marker_class: String,
    #[serde(default = "default_key_attribute")]
    pub key_attribute: String,
    #[serde(default = "default_processed_attribute")]
    pub processed_attribute: String,
    /// Elements whose id starts with this prefix belong to the extension
    #[serde(default = "default_reserved_prefix")]
    pub reserved_prefix: String,
    #[serde(default = "default_marker_style")]
    pub marker_style: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            marker_tag: default_marker_tag(),
            marker_class: default_marker_class(),
            key_attribute: default_key_attribute(),
            processed_attribute: default_processed_attribute(),
            reserved_prefix: default_reserved_prefix(),
            marker_style: default_marker_style(),
        }
    }
}
