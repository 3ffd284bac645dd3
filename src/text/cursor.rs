//! Caret and selection model for the prompt text
//!
//! Positions are codepoint indices into the flat document. There is no line
//! structure and no dependency on any rendering tree.

use serde::{Deserialize, Serialize};

/// A half-open range of text `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Create a range, ordering the endpoints if needed
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// Create an empty range at a caret position
    pub fn caret(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// Check if this range is empty (start == end)
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if a position is contained within this range
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Half-open overlap test against a span `[span_start, span_end)`
    ///
    /// A collapsed range only overlaps a span when it sits strictly inside it,
    /// so a caret at either boundary of a span is not considered overlapping.
    pub fn overlaps(&self, span_start: usize, span_end: usize) -> bool {
        span_start < self.end && span_end > self.start
    }

    /// Clamp both endpoints to a document length, ordering them as `new` does
    pub fn clamp(&self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

/// Selection state (anchor + head)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Selection anchor (where selection started)
    pub anchor: usize,
    /// Selection head (current caret position)
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (caret only, no selection)
    pub fn collapsed(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Check if selection is collapsed (anchor == head)
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Get the range covered by this selection (ordered start to end)
    pub fn range(&self) -> TextRange {
        TextRange::new(self.anchor, self.head)
    }

    /// Get the start of the selection (min of anchor and head)
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end of the selection (max of anchor and head)
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Clamp the selection to a document length
    pub fn clamp(&self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }
}

impl From<TextRange> for Selection {
    fn from(range: TextRange) -> Self {
        Self::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_range_orders_endpoints() {
        let range = TextRange::new(9, 4);
        assert_eq!(range.start, 4);
        assert_eq!(range.end, 9);
        assert_eq!(range.len(), 5);
    }

    #[test]
    fn test_text_range_contains() {
        let range = TextRange::new(2, 5);

        assert!(range.contains(2));
        assert!(range.contains(4));
        assert!(!range.contains(5)); // Exclusive end
        assert!(!range.contains(1));
    }

    #[test]
    fn test_overlap_half_open() {
        let range = TextRange::new(3, 6);
        assert!(range.overlaps(5, 8));
        assert!(range.overlaps(0, 4));
        assert!(!range.overlaps(6, 9)); // Touching end
        assert!(!range.overlaps(0, 3)); // Touching start
    }

    #[test]
    fn test_caret_overlap_only_strictly_inside() {
        assert!(TextRange::caret(4).overlaps(3, 6));
        assert!(!TextRange::caret(3).overlaps(3, 6));
        assert!(!TextRange::caret(6).overlaps(3, 6));
    }

    #[test]
    fn test_selection_range() {
        // Forward selection
        let sel = Selection::new(2, 5);
        assert_eq!(sel.range(), TextRange::new(2, 5));

        // Backward selection (head < anchor)
        let sel = Selection::new(5, 2);
        assert_eq!(sel.range(), TextRange { start: 2, end: 5 });
        assert_eq!(sel.start(), 2);
        assert_eq!(sel.end(), 5);
    }

    #[test]
    fn test_range_clamp_orders_endpoints() {
        let inverted = TextRange { start: 8, end: 2 };
        assert_eq!(inverted.clamp(5), TextRange::new(2, 5));
    }

    #[test]
    fn test_selection_clamp() {
        let sel = Selection::new(3, 40).clamp(10);
        assert_eq!(sel, Selection::new(3, 10));
        assert!(Selection::collapsed(7).is_collapsed());
    }
}
