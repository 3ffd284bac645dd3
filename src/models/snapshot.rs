//! Persisted editor state
//!
//! `EditorSnapshot` is the raw, unfiltered shape written out by
//! `getFullValue()`. `SnapshotData` is the lenient shape read back in: every
//! field is optional so older or partial saves still load, and `restore`
//! fills whatever is missing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fragment::{Fragment, FragmentId, SpanKind};
use super::hidden::{HiddenElement, HiddenId};
use super::ids;
use crate::config::EditorConfig;
use crate::text::TextBuffer;

/// Full editor state as persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub text: String,
    pub fragments: Vec<Fragment>,
    pub hidden_elements: Vec<HiddenElement>,
}

impl EditorSnapshot {
    pub fn to_json(&self) -> String {
        // Plain strings, integers and options cannot fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// A fragment as it may appear in saved data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FragmentRecord {
    pub id: Option<FragmentId>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<SpanKind>,
    pub start_offset: Option<i64>,
    pub end_offset: Option<i64>,
    pub original_start_offset: Option<i64>,
    pub context_before: Option<String>,
    pub context_after: Option<String>,
}

/// A hidden element as it may appear in saved data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HiddenRecord {
    pub id: Option<HiddenId>,
    pub content: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<SpanKind>,
    pub bubble_color: Option<String>,
    pub text_color: Option<String>,
}

/// Lenient input for `setFullValue()`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotData {
    pub text: Option<String>,
    pub fragments: Vec<FragmentRecord>,
    pub hidden_elements: Vec<HiddenRecord>,
}

/// State rebuilt from saved data, ready to hand to the editor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoredState {
    pub text: TextBuffer,
    pub fragments: Vec<Fragment>,
    pub hidden_elements: Vec<HiddenElement>,
}

impl SnapshotData {
    /// Parse saved JSON; never fails
    pub fn from_json_lenient(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_value_lenient(value),
            Err(e) => {
                log::warn!("Saved editor state is not valid JSON, starting empty: {}", e);
                Self::default()
            }
        }
    }

    /// Build from an already-parsed JSON value, skipping entries that cannot be read
    pub fn from_value_lenient(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            log::warn!("Saved editor state is not an object, starting empty");
            return Self::default();
        };

        let text = match map.remove("text") {
            Some(Value::String(text)) => Some(text),
            _ => None,
        };

        Self {
            text,
            fragments: parse_entries(map.remove("fragments"), "fragment"),
            hidden_elements: parse_entries(map.remove("hiddenElements"), "hidden element"),
        }
    }

    /// Fill defaults and rebuild fragments and hidden elements
    ///
    /// Fragments whose recorded position still holds their content get a
    /// fresh context window when the refresh rule asks for one; the rest are
    /// left for the editor's relocation pass.
    pub fn restore(self, config: &EditorConfig) -> RestoredState {
        let text = TextBuffer::from_str(self.text.as_deref().unwrap_or_default());
        let window = config.context_window;

        let mut fragments = Vec::new();
        for record in self.fragments {
            if record.kind.unwrap_or_default() != SpanKind::Disabled {
                log::warn!("Skipping saved fragment {:?} with non-disabled type", record.id);
                continue;
            }
            let Some(content) = record.content.filter(|c| !c.is_empty()) else {
                log::warn!("Skipping saved fragment {:?} without content", record.id);
                continue;
            };

            let start = record.start_offset.and_then(non_negative);
            let len = content.chars().count();
            let mut fragment = Fragment {
                id: record.id.unwrap_or(0),
                content,
                kind: SpanKind::Disabled,
                start_offset: start.unwrap_or(0),
                end_offset: start.map_or(0, |s| s.saturating_add(len)),
                original_start_offset: record.original_start_offset.and_then(non_negative).or(start),
                context_before: record.context_before.unwrap_or_default(),
                context_after: record.context_after.unwrap_or_default(),
            };
            if fragment.is_in_place(&text) && fragment.needs_context_refresh() {
                fragment.refresh_context(&text, window);
            }
            fragments.push(fragment);
        }
        assign_missing_ids(fragments.iter_mut().map(|f| &mut f.id));

        let mut hidden_elements = Vec::new();
        for record in self.hidden_elements {
            let Some(content) = record.content.filter(|c| !c.is_empty()) else {
                log::warn!("Skipping saved hidden element {:?} without content", record.id);
                continue;
            };
            hidden_elements.push(HiddenElement {
                id: record.id.unwrap_or(0),
                content,
                display_name: or_default(record.display_name, &config.default_hidden_name),
                kind: SpanKind::Hidden,
                bubble_color: or_default(record.bubble_color, &config.default_bubble_color),
                text_color: or_default(record.text_color, &config.default_text_color),
            });
        }
        assign_missing_ids(hidden_elements.iter_mut().map(|h| &mut h.id));

        RestoredState {
            text,
            fragments,
            hidden_elements,
        }
    }
}

impl From<EditorSnapshot> for SnapshotData {
    fn from(snapshot: EditorSnapshot) -> Self {
        Self {
            text: Some(snapshot.text),
            fragments: snapshot
                .fragments
                .into_iter()
                .map(|f| FragmentRecord {
                    id: Some(f.id),
                    content: Some(f.content),
                    kind: Some(f.kind),
                    start_offset: Some(f.start_offset as i64),
                    end_offset: Some(f.end_offset as i64),
                    original_start_offset: f.original_start_offset.map(|o| o as i64),
                    context_before: Some(f.context_before),
                    context_after: Some(f.context_after),
                })
                .collect(),
            hidden_elements: snapshot
                .hidden_elements
                .into_iter()
                .map(|h| HiddenRecord {
                    id: Some(h.id),
                    content: Some(h.content),
                    display_name: Some(h.display_name),
                    kind: Some(h.kind),
                    bubble_color: Some(h.bubble_color),
                    text_color: Some(h.text_color),
                })
                .collect(),
        }
    }
}

fn parse_entries<T: serde::de::DeserializeOwned>(value: Option<Value>, what: &str) -> Vec<T> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable saved {}: {}", what, e);
                None
            }
        })
        .collect()
}

fn non_negative(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Give id 0 entries fresh ids above the largest one present
fn assign_missing_ids<'a>(slots: impl Iterator<Item = &'a mut u64>) {
    let mut slots: Vec<&mut u64> = slots.collect();
    let mut taken: BTreeSet<u64> = slots.iter().map(|id| **id).filter(|&id| id != 0).collect();
    let mut counter = ids::next_after(&taken);
    for id in slots.iter_mut().filter(|id| ***id == 0) {
        let fresh = ids::issue(&mut counter, &taken);
        taken.insert(fresh);
        **id = fresh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_original_offset_defaults_to_start() {
        let data = SnapshotData::from_json_lenient(
            r#"{"text": "Hello world, keep this safe.",
                "fragments": [{"id": 3, "content": "world", "type": "disabled", "startOffset": 6, "endOffset": 11}]}"#,
        );
        let state = data.restore(&EditorConfig::default());
        let fragment = &state.fragments[0];

        assert_eq!(fragment.original_start_offset, Some(6));
        assert_eq!(fragment.context_before, "Hello ");
        assert_eq!(fragment.context_after, ", keep thi");
    }

    #[test]
    fn test_hidden_colors_defaulted() {
        let data = SnapshotData::from_json_lenient(
            r#"{"text": "", "hiddenElements": [{"id": 1, "content": "secret", "displayName": "S"}]}"#,
        );
        let state = data.restore(&EditorConfig::default());

        assert_eq!(state.hidden_elements[0].bubble_color, "#3B82F6");
        assert_eq!(state.hidden_elements[0].text_color, "#FFFFFF");
        assert_eq!(state.hidden_elements[0].display_name, "S");
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let data = SnapshotData::from_json_lenient(
            r#"{"text": "abc", "fragments": ["nope", {"content": "b", "startOffset": 1}, {"content": ""}],
                "hiddenElements": 5}"#,
        );
        let state = data.restore(&EditorConfig::default());

        assert_eq!(state.fragments.len(), 1);
        assert_eq!(state.fragments[0].id, 1);
        assert!(state.hidden_elements.is_empty());
    }

    #[test]
    fn test_garbage_json_loads_empty() {
        let state = SnapshotData::from_json_lenient("<<<").restore(&EditorConfig::default());
        assert!(state.text.is_empty());
        assert!(state.fragments.is_empty());
    }

    #[test]
    fn test_negative_offset_is_unresolved() {
        let data = SnapshotData::from_json_lenient(r#"{"text": "abc", "fragments": [{"id": 2, "content": "c", "startOffset": -1}]}"#);
        let state = data.restore(&EditorConfig::default());

        assert!(state.fragments[0].is_orphaned());
        assert_eq!(state.fragments[0].original_start_offset, None);
    }

    #[test]
    fn test_missing_ids_assigned_above_max() {
        let data = SnapshotData::from_json_lenient(
            r#"{"hiddenElements": [{"content": "a"}, {"id": 7, "content": "b"}, {"content": "c"}]}"#,
        );
        let state = data.restore(&EditorConfig::default());
        let ids: Vec<u64> = state.hidden_elements.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![8, 7, 9]);
    }

    #[test]
    fn test_missing_ids_next_to_max_id() {
        let data = SnapshotData::from_json_lenient(
            r#"{"hiddenElements": [{"id": 18446744073709551615, "content": "x"}, {"content": "y"}, {"content": "z"}]}"#,
        );
        let state = data.restore(&EditorConfig::default());
        let ids: Vec<u64> = state.hidden_elements.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![u64::MAX, 1, 2]);
    }
}
