//! Prompt editor
//!
//! Owns the document, the span store and the caret, and sequences every
//! public operation as: validate, mutate text, shift fragments, run the
//! relocation pass, notify. A failed operation returns an error and leaves
//! the whole state untouched; the listener only hears about successes.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collaborators::{ChangeListener, ConfirmPrompt, ContentEscaper, DeclineAll, HtmlEscaper, NoopListener};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::models::{is_valid_color, EditorSnapshot, Fragment, FragmentId, HiddenElement, HiddenId, SnapshotData};
use crate::presets::{PresetError, PresetSource};
use crate::renderers::{display_runs, extract_value, project, render_markup, DisplayRun, Run};
use crate::spans::{evaluate, reconcile, relocate, shift_fragments, EditIntent, ReconcileReport, SpanStore, Verdict};
use crate::text::{Selection, TextBuffer, TextEdit, TextRange};

/// Result of routing an edit intent through the protection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum EditOutcome {
    /// The document changed; the caret now sits at `caret`
    Applied { caret: usize },
    /// The edit would have touched a disabled fragment and was dropped
    Rejected {
        #[serde(rename = "fragmentId")]
        fragment_id: FragmentId,
    },
    /// Navigation or shortcut; the host handles it
    PassThrough,
}

/// All fields needed by `update_hidden`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenUpdate {
    pub display_name: String,
    pub content: String,
    pub bubble_color: String,
    pub text_color: String,
}

pub struct PromptEditor {
    text: TextBuffer,
    spans: SpanStore,
    selection: Selection,
    config: EditorConfig,
    listener: Box<dyn ChangeListener>,
    confirm: Box<dyn ConfirmPrompt>,
    escaper: Box<dyn ContentEscaper>,
}

impl fmt::Debug for PromptEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptEditor")
            .field("text", &self.text.to_string())
            .field("spans", &self.spans)
            .field("selection", &self.selection)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for PromptEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl PromptEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            text: TextBuffer::new(),
            spans: SpanStore::new(),
            selection: Selection::default(),
            config,
            listener: Box::new(NoopListener),
            confirm: Box::new(DeclineAll),
            escaper: Box::new(HtmlEscaper),
        }
    }

    pub fn with_listener(mut self, listener: impl ChangeListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    pub fn with_confirm(mut self, confirm: impl ConfirmPrompt + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    pub fn with_escaper(mut self, escaper: impl ContentEscaper + 'static) -> Self {
        self.escaper = Box::new(escaper);
        self
    }

    pub fn set_listener(&mut self, listener: impl ChangeListener + 'static) {
        self.listener = Box::new(listener);
    }

    pub fn set_confirm(&mut self, confirm: impl ConfirmPrompt + 'static) {
        self.confirm = Box::new(confirm);
    }

    // ==================================================================
    // State access
    // ==================================================================

    pub fn text(&self) -> String {
        self.text.to_string()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.text
    }

    pub fn fragments(&self) -> &[Fragment] {
        self.spans.fragments()
    }

    pub fn fragment(&self, id: FragmentId) -> Option<&Fragment> {
        self.spans.fragment(id)
    }

    pub fn hidden_elements(&self) -> &[HiddenElement] {
        self.spans.hidden_elements()
    }

    pub fn hidden(&self, id: HiddenId) -> Option<&HiddenElement> {
        self.spans.hidden(id)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Move the caret/selection; positions past the end are clamped
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp(self.text.len());
    }

    // ==================================================================
    // Disabled fragments
    // ==================================================================

    /// Mark the (trimmed) selection as a disabled fragment
    pub fn disable(&mut self, range: TextRange) -> EditorResult<FragmentId> {
        let span = self.trimmed_selection(range)?;
        let content = self.text.slice(span.start, span.end);
        let id = self
            .spans
            .add_disabled(&content, span.start, &self.text, self.config.context_window);

        log::info!("Disabled fragment {} at {}..{}", id, span.start, span.end);
        self.notify();
        Ok(id)
    }

    /// Remove a fragment; its text stays in the document as plain text
    pub fn enable(&mut self, id: FragmentId) -> EditorResult<()> {
        self.spans
            .remove_disabled(id)
            .ok_or(EditorError::UnknownFragment(id))?;

        log::info!("Enabled fragment {}", id);
        self.notify();
        Ok(())
    }

    /// Replace a fragment's content in place
    ///
    /// The new content is trimmed. A fragment that is currently orphaned only
    /// has its content updated; the relocation pass picks it up again if the
    /// new content is present in the document.
    pub fn edit_disabled_content(&mut self, id: FragmentId, new_content: &str) -> EditorResult<()> {
        let in_place = self
            .spans
            .fragment(id)
            .ok_or(EditorError::UnknownFragment(id))?
            .is_in_place(&self.text);

        let old_span = self.spans.edit_disabled_content(id, new_content)?;

        if in_place {
            let content = new_content.trim();
            let edit = self.text.replace_range(old_span, content);
            shift_fragments(self.spans.fragments_mut(), &edit);
            self.map_selection(&edit);

            let window = self.config.context_window;
            if let Some(fragment) = self.spans.fragments_mut().iter_mut().find(|f| f.id == id) {
                fragment.place(old_span.start, &self.text, window);
            }
        }

        self.recalculate();
        log::info!("Edited content of fragment {}", id);
        self.notify();
        Ok(())
    }

    // ==================================================================
    // Hidden elements
    // ==================================================================

    /// Excise the (trimmed) selection into a new hidden element
    pub fn hide(&mut self, range: TextRange) -> EditorResult<HiddenId> {
        let span = self.trimmed_selection(range)?;
        let content = self.text.slice(span.start, span.end);

        let edit = self.text.delete(span);
        shift_fragments(self.spans.fragments_mut(), &edit);
        self.map_selection(&edit);

        let name = self.config.default_hidden_name.clone();
        let id = self.spans.add_hidden(&content, &name, &self.config);
        self.recalculate();

        log::info!("Hid {} chars as hidden element {}", span.len(), id);
        self.notify();
        Ok(id)
    }

    /// Turn a disabled fragment into a hidden element, removing its text
    pub fn hide_disabled(&mut self, id: FragmentId) -> EditorResult<HiddenId> {
        let fragment = self
            .spans
            .remove_disabled(id)
            .ok_or(EditorError::UnknownFragment(id))?;

        if fragment.is_in_place(&self.text) {
            let edit = self.text.delete(fragment.span());
            shift_fragments(self.spans.fragments_mut(), &edit);
            self.map_selection(&edit);
        }

        let name = self.config.default_hidden_name.clone();
        let hidden_id = self.spans.add_hidden(&fragment.content, &name, &self.config);
        self.recalculate();

        log::info!("Converted fragment {} into hidden element {}", id, hidden_id);
        self.notify();
        Ok(hidden_id)
    }

    pub fn rename_hidden(&mut self, id: HiddenId, new_name: &str) -> EditorResult<()> {
        self.spans.rename_hidden(id, new_name)?;
        self.notify();
        Ok(())
    }

    pub fn recolor_hidden(&mut self, id: HiddenId, bubble_color: &str, text_color: &str) -> EditorResult<()> {
        self.spans.recolor(id, bubble_color, text_color)?;
        self.notify();
        Ok(())
    }

    pub fn edit_hidden_content(&mut self, id: HiddenId, new_content: &str) -> EditorResult<()> {
        self.spans.edit_hidden_content(id, new_content)?;
        self.notify();
        Ok(())
    }

    /// Update name, content and colors together; nothing changes unless all are valid
    pub fn update_hidden(&mut self, id: HiddenId, update: &HiddenUpdate) -> EditorResult<()> {
        if self.spans.hidden(id).is_none() {
            return Err(EditorError::UnknownHidden(id));
        }
        if update.display_name.trim().is_empty() {
            return Err(EditorError::EmptyDisplayName);
        }
        if update.content.trim().is_empty() {
            return Err(EditorError::EmptyContent);
        }
        for color in [&update.bubble_color, &update.text_color] {
            if !is_valid_color(color) {
                return Err(EditorError::InvalidColor(color.clone()));
            }
        }

        self.spans.rename_hidden(id, &update.display_name)?;
        self.spans.edit_hidden_content(id, &update.content)?;
        self.spans.recolor(id, &update.bubble_color, &update.text_color)?;
        self.notify();
        Ok(())
    }

    /// Delete a hidden element after confirmation
    ///
    /// Returns `Ok(false)` when the prompt declined. The document is never
    /// touched.
    pub fn delete_hidden(&mut self, id: HiddenId) -> EditorResult<bool> {
        if self.spans.hidden(id).is_none() {
            return Err(EditorError::UnknownHidden(id));
        }
        if !self.confirm.confirm(&self.config.delete_confirm_message) {
            log::debug!("Deletion of hidden element {} declined", id);
            return Ok(false);
        }

        self.spans.remove_hidden(id);
        self.recalculate();
        log::info!("Deleted hidden element {}", id);
        self.notify();
        Ok(true)
    }

    /// Insert a hidden element's content at the selection
    ///
    /// The element itself is not consumed.
    pub fn insert_hidden_content(&mut self, id: HiddenId) -> EditorResult<EditOutcome> {
        let content = self
            .spans
            .hidden(id)
            .ok_or(EditorError::UnknownHidden(id))?
            .content
            .clone();
        Ok(self.insert_at_cursor(&content))
    }

    // ==================================================================
    // Editing
    // ==================================================================

    /// Replace the current selection with `text`, subject to protection
    pub fn insert_at_cursor(&mut self, text: &str) -> EditOutcome {
        self.apply_edit(EditIntent::Insert {
            text: text.to_string(),
            selection: self.selection,
        })
    }

    /// Route an edit intent through the protection policy and apply it
    pub fn apply_edit(&mut self, intent: EditIntent) -> EditOutcome {
        let len = self.text.len();
        match evaluate(&intent, self.spans.fragments(), len) {
            Verdict::PassThrough => EditOutcome::PassThrough,
            Verdict::Reject { fragment_id } => EditOutcome::Rejected { fragment_id },
            Verdict::Allow => {
                let Some(mutation) = intent.mutation(len) else {
                    return EditOutcome::PassThrough;
                };
                let edit = self.text.replace_range(mutation.range, &mutation.text);
                shift_fragments(self.spans.fragments_mut(), &edit);
                self.recalculate();

                let caret = edit.range.start + edit.inserted;
                self.selection = Selection::collapsed(caret);
                self.notify();
                EditOutcome::Applied { caret }
            }
        }
    }

    /// Reconcile with the text the rendering surface actually holds
    ///
    /// Call after any mutation that bypassed `apply_edit`. When
    /// `text_restored` is set the host must re-render from `render_markup`.
    pub fn sync_surface_text(&mut self, live: &str) -> ReconcileReport {
        let live = TextBuffer::from_str(live);
        let report = reconcile(&mut self.text, &live, self.spans.fragments_mut(), &self.config);
        self.selection = self.selection.clamp(self.text.len());
        if report.changed() {
            self.notify();
        }
        report
    }

    // ==================================================================
    // Values and persistence
    // ==================================================================

    /// The document with every disabled fragment removed, trimmed
    pub fn get_value(&self) -> String {
        extract_value(&self.runs())
    }

    /// Raw, unfiltered state
    pub fn get_full_value(&self) -> EditorSnapshot {
        EditorSnapshot {
            text: self.text.to_string(),
            fragments: self.spans.fragments().to_vec(),
            hidden_elements: self.spans.hidden_elements().to_vec(),
        }
    }

    /// Reset to plain `text` with no fragments or hidden elements
    pub fn set_value(&mut self, text: &str) {
        self.text.set_text(text);
        self.spans.clear();
        self.selection = Selection::collapsed(self.text.len());
        self.notify();
    }

    /// Restore a saved state; missing fields are defaulted, never rejected
    pub fn set_full_value(&mut self, data: impl Into<SnapshotData>) {
        let restored = data.into().restore(&self.config);
        self.text = restored.text;
        self.spans.replace_all(restored.fragments, restored.hidden_elements);
        let report = self.recalculate();
        if !report.orphaned.is_empty() {
            log::warn!("{} restored fragments could not be placed", report.orphaned.len());
        }
        self.selection = Selection::collapsed(self.text.len());
        self.notify();
    }

    /// Load a preset's text through `set_value`
    pub fn load_preset(&mut self, source: &dyn PresetSource, path: &Path) -> Result<(), PresetError> {
        let content = source.load_preset(path)?;
        self.set_value(&content);
        Ok(())
    }

    // ==================================================================
    // Rendering
    // ==================================================================

    pub fn runs(&self) -> Vec<Run> {
        project(&self.text, self.spans.fragments())
    }

    pub fn render(&self) -> Vec<DisplayRun> {
        display_runs(&self.runs(), self.escaper.as_ref())
    }

    pub fn render_markup(&self) -> String {
        render_markup(&self.runs(), self.escaper.as_ref())
    }

    // ==================================================================
    // Internals
    // ==================================================================

    fn notify(&mut self) {
        self.listener.changed();
    }

    fn recalculate(&mut self) -> ReconcileReport {
        relocate(&self.text, self.spans.fragments_mut(), &self.config)
    }

    /// Validate a selection and shrink it past surrounding whitespace
    fn trimmed_selection(&self, range: TextRange) -> EditorResult<TextRange> {
        let range = TextRange::new(range.start, range.end);
        let len = self.text.len();
        if range.end > len {
            return Err(EditorError::SelectionOutOfBounds {
                start: range.start,
                end: range.end,
                len,
            });
        }

        let selected = &self.text.chars()[range.start..range.end];
        let leading = selected.iter().take_while(|c| c.is_whitespace()).count();
        if leading == selected.len() {
            return Err(EditorError::EmptySelection);
        }
        let trailing = selected.iter().rev().take_while(|c| c.is_whitespace()).count();
        let span = TextRange::new(range.start + leading, range.end - trailing);

        if let Some(fragment) = self.spans.overlapping(span) {
            return Err(EditorError::OverlapsDisabled {
                start: span.start,
                end: span.end,
                fragment_id: fragment.id,
            });
        }
        Ok(span)
    }

    /// Carry the selection across an edit applied outside `apply_edit`
    fn map_selection(&mut self, edit: &TextEdit) {
        let map = |pos: usize| {
            if pos >= edit.range.end {
                edit.shift(pos)
            } else if pos > edit.range.start {
                edit.range.start
            } else {
                pos
            }
        };
        self.selection = Selection::new(map(self.selection.anchor), map(self.selection.head));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spans::Key;
    use std::cell::Cell;
    use std::rc::Rc;

    fn editor_with(text: &str) -> PromptEditor {
        let mut editor = PromptEditor::default();
        editor.set_value(text);
        editor
    }

    fn counting_editor(text: &str) -> (PromptEditor, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let mut editor = PromptEditor::default().with_listener(move || counter.set(counter.get() + 1));
        editor.set_value(text);
        count.set(0);
        (editor, count)
    }

    #[test]
    fn test_disable_trims_selection() {
        let mut editor = editor_with("Hello world, keep this safe.");
        let id = editor.disable(TextRange::new(5, 12)).unwrap();
        let fragment = editor.fragment(id).unwrap();

        assert_eq!(fragment.content, "world,");
        assert_eq!(fragment.span(), TextRange::new(6, 12));
    }

    #[test]
    fn test_disable_rejects_whitespace_and_overlap() {
        let mut editor = editor_with("Hello world, keep this safe.");
        assert_eq!(editor.disable(TextRange::new(5, 6)), Err(EditorError::EmptySelection));

        let id = editor.disable(TextRange::new(6, 11)).unwrap();
        assert_eq!(
            editor.disable(TextRange::new(0, 8)),
            Err(EditorError::OverlapsDisabled {
                start: 0,
                end: 8,
                fragment_id: id
            })
        );
        assert_eq!(editor.fragments().len(), 1);
        assert!(matches!(
            editor.disable(TextRange::new(20, 99)),
            Err(EditorError::SelectionOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_inverted_range_literal_is_normalized() {
        let mut editor = editor_with("Hello world, keep this safe.");
        let id = editor.disable(TextRange { start: 11, end: 6 }).unwrap();
        assert_eq!(editor.fragment(id).unwrap().span(), TextRange::new(6, 11));
        assert_eq!(
            editor.hide(TextRange { start: 30, end: 0 }),
            Err(EditorError::SelectionOutOfBounds { start: 0, end: 30, len: 28 })
        );
    }

    #[test]
    fn test_enable_keeps_text() {
        let mut editor = editor_with("Hello world");
        let id = editor.disable(TextRange::new(6, 11)).unwrap();
        assert_eq!(editor.get_value(), "Hello");

        editor.enable(id).unwrap();
        assert_eq!(editor.get_value(), "Hello world");
        assert_eq!(editor.enable(id), Err(EditorError::UnknownFragment(id)));
    }

    #[test]
    fn test_edit_disabled_content_shifts_later_fragments() {
        let mut editor = editor_with("aa bb cc");
        let first = editor.disable(TextRange::new(0, 2)).unwrap();
        let second = editor.disable(TextRange::new(6, 8)).unwrap();

        editor.edit_disabled_content(first, "  longer ").unwrap();
        assert_eq!(editor.text(), "longer bb cc");
        assert_eq!(editor.fragment(first).unwrap().span(), TextRange::new(0, 6));
        assert_eq!(editor.fragment(second).unwrap().span(), TextRange::new(10, 12));
        assert_eq!(editor.get_value(), "bb");
    }

    #[test]
    fn test_edit_disabled_content_rejection_changes_nothing() {
        let (mut editor, count) = counting_editor("aa bb");
        let id = editor.disable(TextRange::new(0, 2)).unwrap();
        count.set(0);

        assert_eq!(editor.edit_disabled_content(id, " aa "), Err(EditorError::UnchangedContent));
        assert_eq!(editor.edit_disabled_content(id, ""), Err(EditorError::EmptyContent));
        assert_eq!(editor.text(), "aa bb");
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_hide_disabled_removes_text() {
        let mut editor = editor_with("one two three");
        let two = editor.disable(TextRange::new(4, 7)).unwrap();
        let three = editor.disable(TextRange::new(8, 13)).unwrap();

        let hidden = editor.hide_disabled(two).unwrap();
        assert_eq!(editor.text(), "one  three");
        assert!(editor.fragment(two).is_none());
        assert_eq!(editor.hidden(hidden).unwrap().content, "two");
        assert_eq!(editor.fragment(three).unwrap().span(), TextRange::new(5, 10));
    }

    #[test]
    fn test_rejected_key_leaves_document() {
        let (mut editor, count) = counting_editor("Hello world");
        editor.disable(TextRange::new(6, 11)).unwrap();
        count.set(0);

        let outcome = editor.apply_edit(EditIntent::key(Key::Backspace, Selection::collapsed(11)));
        assert_eq!(outcome, EditOutcome::Rejected { fragment_id: 1 });
        assert_eq!(editor.text(), "Hello world");
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_typing_before_fragment_shifts_it() {
        let mut editor = editor_with("Hello world");
        let id = editor.disable(TextRange::new(6, 11)).unwrap();

        let outcome = editor.apply_edit(EditIntent::typed('!', Selection::collapsed(0)));
        assert_eq!(outcome, EditOutcome::Applied { caret: 1 });
        assert_eq!(editor.fragment(id).unwrap().span(), TextRange::new(7, 12));
        assert_eq!(editor.selection(), Selection::collapsed(1));
    }

    #[test]
    fn test_delete_hidden_requires_confirmation() {
        let mut editor = editor_with("keep secret safe");
        let id = editor.hide(TextRange::new(5, 11)).unwrap();
        assert_eq!(editor.delete_hidden(id), Ok(false));
        assert!(editor.hidden(id).is_some());

        let mut editor = PromptEditor::default().with_confirm(|_: &str| true);
        editor.set_value("keep secret safe");
        let id = editor.hide(TextRange::new(5, 11)).unwrap();
        assert_eq!(editor.delete_hidden(id), Ok(true));
        assert!(editor.hidden_elements().is_empty());
        assert_eq!(editor.text(), "keep  safe");
    }

    #[test]
    fn test_update_hidden_is_all_or_nothing() {
        let mut editor = editor_with("keep secret safe");
        let id = editor.hide(TextRange::new(5, 11)).unwrap();
        let bad = HiddenUpdate {
            display_name: "Key".to_string(),
            content: "new".to_string(),
            bubble_color: "#000".to_string(),
            text_color: "white".to_string(),
        };
        assert_eq!(editor.update_hidden(id, &bad), Err(EditorError::InvalidColor("white".to_string())));
        assert_eq!(editor.hidden(id).unwrap().display_name, "Hidden content");

        let good = HiddenUpdate {
            text_color: "#fff".to_string(),
            ..bad
        };
        editor.update_hidden(id, &good).unwrap();
        let element = editor.hidden(id).unwrap();
        assert_eq!(element.display_name, "Key");
        assert_eq!(element.content, "new");
        assert_eq!(element.text_color, "#fff");
    }

    #[test]
    fn test_insert_hidden_content_replaces_selection() {
        let mut editor = editor_with("keep secret safe");
        let id = editor.hide(TextRange::new(5, 11)).unwrap();
        editor.set_selection(Selection::new(0, 4));

        let outcome = editor.insert_hidden_content(id).unwrap();
        assert_eq!(outcome, EditOutcome::Applied { caret: 6 });
        assert_eq!(editor.text(), "secret  safe");
        assert!(editor.hidden(id).is_some());
    }

    #[test]
    fn test_surface_sync_notifies_only_on_change() {
        let (mut editor, count) = counting_editor("Hello world");
        editor.disable(TextRange::new(6, 11)).unwrap();
        count.set(0);

        let report = editor.sync_surface_text("Hello world");
        assert!(!report.changed());
        assert_eq!(count.get(), 0);

        let report = editor.sync_surface_text("Hello wrld");
        assert!(report.text_restored);
        assert_eq!(editor.text(), "Hello world");
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_render_markup_uses_escaper() {
        let mut editor = editor_with("a <b> c");
        editor.disable(TextRange::new(2, 5)).unwrap();
        assert_eq!(
            editor.render_markup(),
            r#"a <span class="disabled-text" data-fragment-id="1" contenteditable="false">&lt;b&gt;</span> c"#
        );

        let runs = editor.render();
        assert!(runs[1].atomic);
        assert_eq!(runs[1].fragment_id, Some(1));
    }
}
