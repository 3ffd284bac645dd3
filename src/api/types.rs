//! Shared types for the WASM API

use serde::{Deserialize, Serialize};

use crate::spans::{EditIntent, Key, Modifiers};
use crate::text::{Selection, TextBuffer};

/// The fields of a DOM `KeyboardEvent` the editor needs, plus the selection
/// at the time of the event
///
/// Selection offsets are UTF-16 code units, as the DOM reports them.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyEventInput {
    pub key: String,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub alt_key: bool,
    pub shift_key: bool,
    pub selection_start: usize,
    pub selection_end: usize,
}

impl KeyEventInput {
    /// `None` for keys the editor does not model (function keys etc.)
    pub fn to_intent(&self, text: &TextBuffer) -> Option<EditIntent> {
        let key = Key::from_dom(&self.key)?;
        Some(EditIntent::Key {
            key,
            modifiers: Modifiers {
                ctrl: self.ctrl_key,
                meta: self.meta_key,
                alt: self.alt_key,
                shift: self.shift_key,
            },
            selection: Selection::new(
                text.index_from_utf16(self.selection_start),
                text.index_from_utf16(self.selection_end),
            ),
        })
    }
}
