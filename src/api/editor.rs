//! `PromptEditor` class exposed to JavaScript
//!
//! Each instance owns its own editor; there is no module-level document.
//! Mutating methods never throw for rejected operations: they log a warning
//! and return `false` / `undefined`. Only values that fail to cross the
//! serde boundary surface as JS errors.
//!
//! Selection and caret offsets crossing this boundary are UTF-16 code units,
//! matching DOM selection APIs; the core works in codepoints. Offsets inside
//! persisted state (`getFullValue`, `fragments`) stay in codepoints.

use wasm_bindgen::prelude::*;

use super::helpers::{deserialize, id_from_js, report, serialize};
use super::types::KeyEventInput;
use crate::config::EditorConfig;
use crate::editor::{EditOutcome, HiddenUpdate, PromptEditor};
use crate::models::SnapshotData;
use crate::spans::EditIntent;
use crate::text::{Selection, TextRange};
use crate::{wasm_info, wasm_log, wasm_warn};

#[wasm_bindgen(js_name = PromptEditor)]
pub struct WasmPromptEditor {
    inner: PromptEditor,
}

#[wasm_bindgen(js_class = PromptEditor)]
impl WasmPromptEditor {
    /// Create an editor; `config` may be `undefined` or a partial config object
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmPromptEditor, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            deserialize(config, "Invalid editor config")?
        };
        wasm_info!("PromptEditor created (context window {})", config.context_window);
        Ok(Self {
            inner: PromptEditor::new(config),
        })
    }

    /// Register the change-notification callback (called with no arguments)
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: js_sys::Function) {
        self.inner.set_listener(move || {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::warn!("Change callback threw: {:?}", e);
            }
        });
    }

    /// Register the confirmation prompt (called with the message, truthy = yes)
    #[wasm_bindgen(js_name = setConfirm)]
    pub fn set_confirm(&mut self, callback: js_sys::Function) {
        self.inner.set_confirm(move |message: &str| {
            match callback.call1(&JsValue::NULL, &JsValue::from_str(message)) {
                Ok(answer) => answer.is_truthy(),
                Err(e) => {
                    log::warn!("Confirm callback threw: {:?}", e);
                    false
                }
            }
        });
    }

    // ========================================================================
    // Disabled fragments
    // ========================================================================

    /// `start`/`end` are UTF-16 offsets
    pub fn disable(&mut self, start: usize, end: usize) -> Option<f64> {
        let range = self.range_from_dom(start, end);
        report("disable", self.inner.disable(range)).map(|id| id as f64)
    }

    pub fn enable(&mut self, fragment_id: f64) -> bool {
        report("enable", self.inner.enable(id_from_js(fragment_id))).is_some()
    }

    #[wasm_bindgen(js_name = editDisabledContent)]
    pub fn edit_disabled_content(&mut self, fragment_id: f64, new_content: &str) -> bool {
        report(
            "editDisabledContent",
            self.inner.edit_disabled_content(id_from_js(fragment_id), new_content),
        )
        .is_some()
    }

    // ========================================================================
    // Hidden elements
    // ========================================================================

    /// `start`/`end` are UTF-16 offsets
    pub fn hide(&mut self, start: usize, end: usize) -> Option<f64> {
        let range = self.range_from_dom(start, end);
        report("hide", self.inner.hide(range)).map(|id| id as f64)
    }

    #[wasm_bindgen(js_name = hideDisabled)]
    pub fn hide_disabled(&mut self, fragment_id: f64) -> Option<f64> {
        report("hideDisabled", self.inner.hide_disabled(id_from_js(fragment_id))).map(|id| id as f64)
    }

    #[wasm_bindgen(js_name = renameHidden)]
    pub fn rename_hidden(&mut self, id: f64, new_name: &str) -> bool {
        report("renameHidden", self.inner.rename_hidden(id_from_js(id), new_name)).is_some()
    }

    #[wasm_bindgen(js_name = recolorHidden)]
    pub fn recolor_hidden(&mut self, id: f64, bubble_color: &str, text_color: &str) -> bool {
        report(
            "recolorHidden",
            self.inner.recolor_hidden(id_from_js(id), bubble_color, text_color),
        )
        .is_some()
    }

    #[wasm_bindgen(js_name = editHiddenContent)]
    pub fn edit_hidden_content(&mut self, id: f64, new_content: &str) -> bool {
        report("editHiddenContent", self.inner.edit_hidden_content(id_from_js(id), new_content)).is_some()
    }

    /// `update` is `{displayName, content, bubbleColor, textColor}`
    #[wasm_bindgen(js_name = updateHidden)]
    pub fn update_hidden(&mut self, id: f64, update: JsValue) -> Result<bool, JsValue> {
        let update: HiddenUpdate = deserialize(update, "Invalid hidden element update")?;
        Ok(report("updateHidden", self.inner.update_hidden(id_from_js(id), &update)).is_some())
    }

    /// True only when the element existed and the prompt confirmed
    #[wasm_bindgen(js_name = deleteHidden)]
    pub fn delete_hidden(&mut self, id: f64) -> bool {
        report("deleteHidden", self.inner.delete_hidden(id_from_js(id))).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = insertHiddenContent)]
    pub fn insert_hidden_content(&mut self, id: f64) -> Result<JsValue, JsValue> {
        match report("insertHiddenContent", self.inner.insert_hidden_content(id_from_js(id))) {
            Some(outcome) => self.outcome_to_dom(outcome),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    // ========================================================================
    // Editing
    // ========================================================================

    #[wasm_bindgen(js_name = insertAtCursor)]
    pub fn insert_at_cursor(&mut self, text: &str) -> Result<JsValue, JsValue> {
        let outcome = self.inner.insert_at_cursor(text);
        self.outcome_to_dom(outcome)
    }

    /// Route a keydown through the protection policy
    ///
    /// The host must call `preventDefault()` unless the outcome is
    /// `passThrough`, and re-render after `applied`.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, event: JsValue) -> Result<JsValue, JsValue> {
        let input: KeyEventInput = deserialize(event, "Invalid key event")?;
        let outcome = match input.to_intent(self.inner.buffer()) {
            Some(intent) => self.inner.apply_edit(intent),
            None => {
                wasm_log!("Key {:?} not modelled, passing through", input.key);
                EditOutcome::PassThrough
            }
        };
        self.outcome_to_dom(outcome)
    }

    /// `start`/`end` are UTF-16 offsets
    pub fn paste(&mut self, text: &str, start: usize, end: usize) -> Result<JsValue, JsValue> {
        let range = self.range_from_dom(start, end);
        let outcome = self.inner.apply_edit(EditIntent::Paste {
            text: text.to_string(),
            selection: Selection::new(range.start, range.end),
        });
        self.outcome_to_dom(outcome)
    }

    /// Report the surface's current text after a mutation the policy never saw
    #[wasm_bindgen(js_name = syncSurfaceText)]
    pub fn sync_surface_text(&mut self, live: &str) -> Result<JsValue, JsValue> {
        let report = self.inner.sync_surface_text(live);
        if report.text_restored {
            wasm_warn!("Surface edit touched a disabled fragment; re-render required");
        }
        serialize(&report, "Failed to serialize reconcile report")
    }

    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        let text = self.inner.buffer();
        let selection = Selection::new(text.index_from_utf16(anchor), text.index_from_utf16(head));
        self.inner.set_selection(selection);
    }

    /// `{anchor, head}` in UTF-16 offsets
    #[wasm_bindgen(js_name = getSelection)]
    pub fn get_selection(&self) -> Result<JsValue, JsValue> {
        let text = self.inner.buffer();
        let selection = self.inner.selection();
        let selection = Selection::new(text.utf16_offset(selection.anchor), text.utf16_offset(selection.head));
        serialize(&selection, "Failed to serialize selection")
    }

    // ========================================================================
    // Values and persistence
    // ========================================================================

    #[wasm_bindgen(js_name = getValue)]
    pub fn get_value(&self) -> String {
        self.inner.get_value()
    }

    #[wasm_bindgen(js_name = getText)]
    pub fn get_text(&self) -> String {
        self.inner.text()
    }

    #[wasm_bindgen(js_name = getFullValue)]
    pub fn get_full_value(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.get_full_value(), "Failed to serialize editor state")
    }

    #[wasm_bindgen(js_name = getFullValueJson)]
    pub fn get_full_value_json(&self) -> String {
        self.inner.get_full_value().to_json()
    }

    #[wasm_bindgen(js_name = setValue)]
    pub fn set_value(&mut self, text: &str) {
        self.inner.set_value(text);
    }

    /// Restore saved state; unreadable input loads as an empty editor
    #[wasm_bindgen(js_name = setFullValue)]
    pub fn set_full_value(&mut self, data: JsValue) {
        let data = match serde_wasm_bindgen::from_value::<serde_json::Value>(data) {
            Ok(value) => SnapshotData::from_value_lenient(value),
            Err(e) => {
                wasm_warn!("Saved editor state could not be read: {}", e);
                SnapshotData::default()
            }
        };
        self.inner.set_full_value(data);
        wasm_log!(
            "Restored {} fragments and {} hidden elements",
            self.inner.fragments().len(),
            self.inner.hidden_elements().len()
        );
    }

    #[wasm_bindgen(js_name = setFullValueJson)]
    pub fn set_full_value_json(&mut self, json: &str) {
        self.inner.set_full_value(SnapshotData::from_json_lenient(json));
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    #[wasm_bindgen(js_name = renderMarkup)]
    pub fn render_markup(&self) -> String {
        self.inner.render_markup()
    }

    pub fn render(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.render(), "Failed to serialize display runs")
    }

    pub fn fragments(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.fragments(), "Failed to serialize fragments")
    }

    #[wasm_bindgen(js_name = hiddenElements)]
    pub fn hidden_elements(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.hidden_elements(), "Failed to serialize hidden elements")
    }
}

impl WasmPromptEditor {
    fn range_from_dom(&self, start: usize, end: usize) -> TextRange {
        let text = self.inner.buffer();
        TextRange::new(text.index_from_utf16(start), text.index_from_utf16(end))
    }

    /// Serialize an outcome with its caret converted to a UTF-16 offset
    fn outcome_to_dom(&self, outcome: EditOutcome) -> Result<JsValue, JsValue> {
        let outcome = match outcome {
            EditOutcome::Applied { caret } => EditOutcome::Applied {
                caret: self.inner.buffer().utf16_offset(caret),
            },
            other => other,
        };
        serialize(&outcome, "Failed to serialize edit outcome")
    }
}
