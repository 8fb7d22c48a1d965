use serde::{Deserialize, Serialize};

fn default_width() -> f32 {
    400.0
}

fn default_max_height() -> f32 {
    350.0
}

fn default_margin() -> f32 {
    10.0
}

fn default_gap() -> f32 {
    8.0
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PopupConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_max_height")]
    pub max_height: f32,
    /// Minimum distance to the viewport edges
    #[serde(default = "default_margin")]
    pub margin: f32,
    /// Distance between the marker and the popup
    #[serde(default = "default_gap")]
    pub gap: f32,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            max_height: default_max_height(),
            margin: default_margin(),
            gap: default_gap(),
        }
    }
}
