//! Hidden element model
//!
//! Hidden elements are named snippets excised from the document and kept
//! out-of-band. Their content never appears in the text; inserting one copies
//! the content back without consuming the element.

use serde::{Deserialize, Serialize};

use super::fragment::SpanKind;
use crate::config::EditorConfig;

pub type HiddenId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenElement {
    pub id: HiddenId,
    pub content: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    pub bubble_color: String,
    pub text_color: String,
}

impl HiddenElement {
    /// Create a hidden element with the configured default colors
    pub fn new(id: HiddenId, content: &str, display_name: &str, config: &EditorConfig) -> Self {
        Self {
            id,
            content: content.to_string(),
            display_name: display_name.to_string(),
            kind: SpanKind::Hidden,
            bubble_color: config.default_bubble_color.clone(),
            text_color: config.default_text_color.clone(),
        }
    }
}

/// Accepts `#rgb` and `#rrggbb` hex colors
pub fn is_valid_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
