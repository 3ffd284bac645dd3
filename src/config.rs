//! Editor configuration
//!
//! Tunables for span bookkeeping and the defaults applied to new or
//! partially restored hidden elements.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTEXT_WINDOW: usize = 10;
pub const DEFAULT_BUBBLE_COLOR: &str = "#3B82F6";
pub const DEFAULT_TEXT_COLOR: &str = "#FFFFFF";
pub const DEFAULT_HIDDEN_NAME: &str = "Hidden content";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Characters captured on each side of a fragment for disambiguation
    pub context_window: usize,
    pub default_bubble_color: String,
    pub default_text_color: String,
    /// Display name given to newly hidden snippets
    pub default_hidden_name: String,
    /// Relative position band used when no anchor is known (exclusive bounds)
    pub edge_band_low: f64,
    pub edge_band_high: f64,
    pub delete_confirm_message: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            default_bubble_color: DEFAULT_BUBBLE_COLOR.to_string(),
            default_text_color: DEFAULT_TEXT_COLOR.to_string(),
            default_hidden_name: DEFAULT_HIDDEN_NAME.to_string(),
            edge_band_low: 0.1,
            edge_band_high: 0.9,
            delete_confirm_message: "Delete this hidden element?".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON, falling back to defaults for anything missing
    ///
    /// Malformed JSON yields the default config and a warning.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid editor config, using defaults: {}", e);
                Self::default()
            }
        }
    }
}
