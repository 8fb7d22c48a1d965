use std::env;

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "vocabulary.json".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding the persisted keys
    #[serde(default = "default_path")]
    pub path: String,
}

impl StoreConfig {
    pub fn new() -> Self {
        let path = env::var("LEXI_STORE_PATH").unwrap_or_else(|_| default_path());

        Self { path }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
