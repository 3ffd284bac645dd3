//! Disabled fragment model
//!
//! A fragment is a span of the document that stays inline but is excluded
//! from the emitted value and protected from edits. Its position is tracked
//! by content plus a small context window rather than by offsets alone.

use serde::{Deserialize, Serialize};

use crate::spans::resolver::context_around;
use crate::text::{TextBuffer, TextEdit, TextRange};

pub type FragmentId = u64;

/// Persisted `type` tag of a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    #[default]
    Disabled,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub id: FragmentId,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    pub start_offset: usize,
    pub end_offset: usize,
    /// Last known-good start, used as a tie-break anchor
    pub original_start_offset: Option<usize>,
    pub context_before: String,
    pub context_after: String,
}

impl Fragment {
    /// Create a fragment covering `content` at `start` and capture its context
    pub fn new(id: FragmentId, content: &str, start: usize, text: &TextBuffer, window: usize) -> Self {
        let mut fragment = Self {
            id,
            content: content.to_string(),
            kind: SpanKind::Disabled,
            start_offset: start,
            end_offset: start,
            original_start_offset: None,
            context_before: String::new(),
            context_after: String::new(),
        };
        fragment.place(start, text, window);
        fragment
    }

    pub fn content_chars(&self) -> Vec<char> {
        self.content.chars().collect()
    }

    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn span(&self) -> TextRange {
        TextRange::new(self.start_offset, self.end_offset)
    }

    /// An orphaned fragment could not be found in the text and has a `(0,0)` span
    pub fn is_orphaned(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Check whether the fragment's content sits exactly at its recorded span
    pub fn is_in_place(&self, text: &TextBuffer) -> bool {
        !self.is_orphaned()
            && self.end_offset == self.start_offset.saturating_add(self.content_len())
            && text.matches_at(self.start_offset, &self.content_chars())
    }

    /// Move the fragment to `start` and refresh all position bookkeeping
    pub fn place(&mut self, start: usize, text: &TextBuffer, window: usize) {
        self.start_offset = start;
        self.end_offset = start + self.content_len();
        self.refresh_context(text, window);
    }

    /// Recapture the context window and anchor from the current span
    pub fn refresh_context(&mut self, text: &TextBuffer, window: usize) {
        let (before, after) = context_around(text.chars(), self.start_offset, self.end_offset, window);
        self.context_before = before;
        self.context_after = after;
        self.original_start_offset = Some(self.start_offset);
    }

    /// Context refresh rule: either window missing, or the span moved away from its anchor
    pub fn needs_context_refresh(&self) -> bool {
        self.context_before.is_empty()
            || self.context_after.is_empty()
            || self.original_start_offset != Some(self.start_offset)
    }

    /// Collapse the span to `(0,0)`; content and anchor are retained
    pub fn orphan(&mut self) {
        self.start_offset = 0;
        self.end_offset = 0;
    }

    /// Shift the span if it lies at or after the edited range
    pub fn shift(&mut self, edit: &TextEdit) {
        if self.is_orphaned() || self.start_offset < edit.range.end {
            return;
        }
        self.start_offset = edit.shift(self.start_offset);
        self.end_offset = edit.shift(self.end_offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_captures_context() {
        let text = TextBuffer::from_str("Hello world, keep this safe.");
        let fragment = Fragment::new(1, "world", 6, &text, 10);

        assert_eq!(fragment.end_offset, 11);
        assert_eq!(fragment.context_before, "Hello ");
        assert_eq!(fragment.context_after, ", keep thi");
        assert_eq!(fragment.original_start_offset, Some(6));
        assert!(fragment.is_in_place(&text));
    }

    #[test]
    fn test_shift_only_after_edit() {
        let text = TextBuffer::from_str("abcXdefXghi");
        let mut fragment = Fragment::new(1, "X", 7, &text, 10);

        fragment.shift(&TextEdit::new(TextRange::caret(0), 2));
        assert_eq!(fragment.span(), TextRange::new(9, 10));

        // Edit after the fragment leaves it alone
        fragment.shift(&TextEdit::new(TextRange::new(10, 11), 0));
        assert_eq!(fragment.span(), TextRange::new(9, 10));
    }

    #[test]
    fn test_orphan_keeps_anchor() {
        let text = TextBuffer::from_str("abc");
        let mut fragment = Fragment::new(4, "b", 1, &text, 10);
        fragment.orphan();

        assert!(fragment.is_orphaned());
        assert!(!fragment.is_in_place(&text));
        assert_eq!(fragment.original_start_offset, Some(1));
        assert_eq!(fragment.content, "b");
    }

    #[test]
    fn test_context_refresh_rule() {
        let text = TextBuffer::from_str("only");
        let mut fragment = Fragment::new(1, "only", 0, &text, 10);
        // Whole-document fragment has no context on either side
        assert!(fragment.needs_context_refresh());

        let text = TextBuffer::from_str("a b c");
        fragment = Fragment::new(1, "b", 2, &text, 10);
        assert!(!fragment.needs_context_refresh());
        fragment.start_offset = 3;
        assert!(fragment.needs_context_refresh());
    }

    #[test]
    fn test_serializes_type_tag() {
        let text = TextBuffer::from_str("a b c");
        let fragment = Fragment::new(1, "b", 2, &text, 10);
        let json = serde_json::to_value(&fragment).unwrap();

        assert_eq!(json["type"], "disabled");
        assert_eq!(json["startOffset"], 2);
        assert_eq!(json["originalStartOffset"], 2);
        assert_eq!(json["contextBefore"], "a ");
    }
}
