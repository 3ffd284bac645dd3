//! Span store
//!
//! Holds the disabled fragments and hidden elements together with their id
//! counters. The store only does bookkeeping; the editor owns the text and
//! runs the recalculation pass and change notification around every
//! mutating call.

use std::collections::BTreeSet;

use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::models::{ids, is_valid_color, Fragment, FragmentId, HiddenElement, HiddenId};
use crate::text::{TextBuffer, TextRange};

#[derive(Debug, Clone, PartialEq)]
pub struct SpanStore {
    fragments: Vec<Fragment>,
    hidden: Vec<HiddenElement>,
    /// `None` once the counter has passed `u64::MAX`
    next_fragment_id: Option<FragmentId>,
    next_hidden_id: Option<HiddenId>,
}

impl Default for SpanStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SpanStore {
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
            hidden: Vec::new(),
            next_fragment_id: Some(1),
            next_hidden_id: Some(1),
        }
    }

    // ==================================================================
    // Accessors
    // ==================================================================

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn fragments_mut(&mut self) -> &mut [Fragment] {
        &mut self.fragments
    }

    pub fn hidden_elements(&self) -> &[HiddenElement] {
        &self.hidden
    }

    pub fn fragment(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.id == id)
    }

    pub fn hidden(&self, id: HiddenId) -> Option<&HiddenElement> {
        self.hidden.iter().find(|h| h.id == id)
    }

    /// Fragments ordered by start offset
    pub fn sorted_fragments(&self) -> Vec<&Fragment> {
        let mut sorted: Vec<&Fragment> = self.fragments.iter().collect();
        sorted.sort_by_key(|f| (f.start_offset, f.id));
        sorted
    }

    /// First placed fragment intersecting `range`
    pub fn overlapping(&self, range: TextRange) -> Option<&Fragment> {
        crate::spans::protection::blocking_fragment(&self.fragments, range)
    }

    // ==================================================================
    // Disabled fragments
    // ==================================================================

    /// Record `selection_text` at `start_offset` as a disabled fragment
    pub fn add_disabled(&mut self, selection_text: &str, start_offset: usize, text: &TextBuffer, window: usize) -> FragmentId {
        let taken: BTreeSet<FragmentId> = self.fragments.iter().map(|f| f.id).collect();
        let id = ids::issue(&mut self.next_fragment_id, &taken);
        self.fragments
            .push(Fragment::new(id, selection_text, start_offset, text, window));
        id
    }

    pub fn remove_disabled(&mut self, id: FragmentId) -> Option<Fragment> {
        let index = self.fragments.iter().position(|f| f.id == id)?;
        Some(self.fragments.remove(index))
    }

    /// Validate and store new content for a fragment
    ///
    /// Returns the span the old content occupied so the caller can rewrite the
    /// text there. The new content is trimmed; empty or unchanged content is
    /// rejected and the fragment is left as it was.
    pub fn edit_disabled_content(&mut self, id: FragmentId, new_content: &str) -> EditorResult<TextRange> {
        let fragment = self
            .fragments
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(EditorError::UnknownFragment(id))?;

        let trimmed = new_content.trim();
        if trimmed.is_empty() {
            return Err(EditorError::EmptyContent);
        }
        if trimmed == fragment.content {
            return Err(EditorError::UnchangedContent);
        }

        let old_span = fragment.span();
        fragment.content = trimmed.to_string();
        Ok(old_span)
    }

    // ==================================================================
    // Hidden elements
    // ==================================================================

    pub fn add_hidden(&mut self, content: &str, display_name: &str, config: &EditorConfig) -> HiddenId {
        let taken: BTreeSet<HiddenId> = self.hidden.iter().map(|h| h.id).collect();
        let id = ids::issue(&mut self.next_hidden_id, &taken);
        self.hidden
            .push(HiddenElement::new(id, content, display_name, config));
        id
    }

    pub fn remove_hidden(&mut self, id: HiddenId) -> Option<HiddenElement> {
        let index = self.hidden.iter().position(|h| h.id == id)?;
        Some(self.hidden.remove(index))
    }

    pub fn rename_hidden(&mut self, id: HiddenId, new_name: &str) -> EditorResult<()> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(EditorError::EmptyDisplayName);
        }
        self.hidden_mut(id)?.display_name = name.to_string();
        Ok(())
    }

    pub fn edit_hidden_content(&mut self, id: HiddenId, new_content: &str) -> EditorResult<()> {
        let content = new_content.trim();
        if content.is_empty() {
            return Err(EditorError::EmptyContent);
        }
        self.hidden_mut(id)?.content = content.to_string();
        Ok(())
    }

    pub fn recolor(&mut self, id: HiddenId, bubble_color: &str, text_color: &str) -> EditorResult<()> {
        for color in [bubble_color, text_color] {
            if !is_valid_color(color) {
                return Err(EditorError::InvalidColor(color.to_string()));
            }
        }
        let element = self.hidden_mut(id)?;
        element.bubble_color = bubble_color.to_string();
        element.text_color = text_color.to_string();
        Ok(())
    }

    fn hidden_mut(&mut self, id: HiddenId) -> EditorResult<&mut HiddenElement> {
        self.hidden
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(EditorError::UnknownHidden(id))
    }

    // ==================================================================
    // Bulk
    // ==================================================================

    /// Replace both collections, advancing the counters past every restored id
    pub fn replace_all(&mut self, fragments: Vec<Fragment>, hidden: Vec<HiddenElement>) {
        let fragment_ids: BTreeSet<FragmentId> = fragments.iter().map(|f| f.id).collect();
        let hidden_ids: BTreeSet<HiddenId> = hidden.iter().map(|h| h.id).collect();
        self.next_fragment_id = advance(self.next_fragment_id, &fragment_ids);
        self.next_hidden_id = advance(self.next_hidden_id, &hidden_ids);
        self.fragments = fragments;
        self.hidden = hidden;
    }

    /// Drop every fragment and hidden element; counters keep running
    pub fn clear(&mut self) {
        self.fragments.clear();
        self.hidden.clear();
    }
}

/// Move `counter` past every id in `restored`
fn advance(counter: Option<u64>, restored: &BTreeSet<u64>) -> Option<u64> {
    let current = counter?;
    if restored.is_empty() {
        return Some(current);
    }
    ids::next_after(restored).map(|next| next.max(current))
}
