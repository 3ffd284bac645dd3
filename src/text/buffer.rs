//! Text buffer implementation (Layer 0)
//!
//! Flat, codepoint-indexed text storage with no knowledge of fragments.

use super::cursor::TextRange;
use serde::{Deserialize, Serialize};

/// A single replacement applied to the buffer
///
/// `range` is in coordinates of the text before the edit; `inserted` is the
/// number of characters written in its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub range: TextRange,
    pub inserted: usize,
}

impl TextEdit {
    pub fn new(range: TextRange, inserted: usize) -> Self {
        Self { range, inserted }
    }

    /// Signed length change caused by this edit
    pub fn delta(&self) -> isize {
        self.inserted as isize - self.range.len() as isize
    }

    /// Map a position that lies at or after the edited range into the new text
    pub fn shift(&self, pos: usize) -> usize {
        (pos as isize + self.delta()).max(0) as usize
    }
}

/// Simple char-vector text buffer
///
/// Indexing is by codepoint so offsets line up with the caret model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBuffer {
    chars: Vec<char>,
}

impl TextBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self { chars: Vec::new() }
    }

    /// Create a buffer from a string
    pub fn from_str(s: &str) -> Self {
        Self {
            chars: s.chars().collect(),
        }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Borrow the raw characters
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Copy out `[start, end)`, clamped to the buffer
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    /// Check whether `needle` sits exactly at `start`
    pub fn matches_at(&self, start: usize, needle: &[char]) -> bool {
        self.chars
            .get(start..start.saturating_add(needle.len()))
            .is_some_and(|window| window == needle)
    }

    /// Replace a range of text with new text and report the edit
    pub fn replace_range(&mut self, range: TextRange, text: &str) -> TextEdit {
        let range = range.clamp(self.chars.len());
        let inserted: Vec<char> = text.chars().collect();
        let edit = TextEdit::new(range, inserted.len());
        self.chars.splice(range.start..range.end, inserted);
        edit
    }

    /// Insert text at a position
    pub fn insert(&mut self, pos: usize, text: &str) -> TextEdit {
        self.replace_range(TextRange::caret(pos), text)
    }

    /// Delete a range of text
    pub fn delete(&mut self, range: TextRange) -> TextEdit {
        self.replace_range(range, "")
    }

    /// Replace the whole content
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
    }

    // ========================================================================
    // UTF-16 offsets
    // ========================================================================

    /// Codepoint index for a UTF-16 code unit offset, as reported by the DOM
    ///
    /// An offset that splits a surrogate pair rounds forward past that
    /// character; offsets beyond the text clamp to its length.
    pub fn index_from_utf16(&self, offset: usize) -> usize {
        let mut units = 0;
        for (index, ch) in self.chars.iter().enumerate() {
            if units >= offset {
                return index;
            }
            units += ch.len_utf16();
        }
        self.chars.len()
    }

    /// UTF-16 code unit offset of a codepoint index
    pub fn utf16_offset(&self, index: usize) -> usize {
        self.chars.iter().take(index).map(|ch| ch.len_utf16()).sum()
    }
}

impl std::fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for ch in &self.chars {
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::from_str("héllo wörld");
        assert_eq!(buffer.len(), 11);
        assert_eq!(buffer.slice(6, 11), "wörld");
    }

    #[test]
    fn test_utf16_offsets_around_astral_chars() {
        let buffer = TextBuffer::from_str("😀 ab");
        assert_eq!(buffer.index_from_utf16(3), 2);
        assert_eq!(buffer.index_from_utf16(5), 4);
        assert_eq!(buffer.index_from_utf16(1), 1);
        assert_eq!(buffer.index_from_utf16(99), 4);

        assert_eq!(buffer.utf16_offset(2), 3);
        assert_eq!(buffer.utf16_offset(4), 5);
        assert_eq!(buffer.utf16_offset(99), 5);
    }

    #[test]
    fn test_insert_reports_edit() {
        let mut buffer = TextBuffer::from_str("hello");
        let edit = buffer.insert(5, "!!");
        assert_eq!(buffer.to_string(), "hello!!");
        assert_eq!(edit.delta(), 2);
        assert_eq!(edit.shift(5), 7);
    }

    #[test]
    fn test_delete_range() {
        let mut buffer = TextBuffer::from_str("keep secret safe");
        let edit = buffer.delete(TextRange::new(5, 11));
        assert_eq!(buffer.to_string(), "keep  safe");
        assert_eq!(edit.delta(), -6);
    }

    #[test]
    fn test_replace_range_clamps() {
        let mut buffer = TextBuffer::from_str("abc");
        buffer.replace_range(TextRange::new(1, 99), "Z");
        assert_eq!(buffer.to_string(), "aZ");
    }

    #[test]
    fn test_matches_at() {
        let buffer = TextBuffer::from_str("abcXdef");
        let needle: Vec<char> = "Xd".chars().collect();
        assert!(buffer.matches_at(3, &needle));
        assert!(!buffer.matches_at(2, &needle));
        assert!(!buffer.matches_at(6, &needle));
    }
}
