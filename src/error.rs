//! Error types for editor operations
//!
//! Every variant is local and recoverable: an operation that returns one of
//! these has left the document, the fragments and the hidden elements exactly
//! as they were.

use thiserror::Error;

use crate::models::{FragmentId, HiddenId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("Unknown fragment id {0}")]
    UnknownFragment(FragmentId),

    #[error("Unknown hidden element id {0}")]
    UnknownHidden(HiddenId),

    /// Selection is empty or only whitespace
    #[error("Selection is empty")]
    EmptySelection,

    #[error("Selection {start}..{end} out of bounds (document length {len})")]
    SelectionOutOfBounds { start: usize, end: usize, len: usize },

    /// Selection intersects an existing disabled fragment
    #[error("Selection {start}..{end} overlaps disabled fragment {fragment_id}")]
    OverlapsDisabled {
        start: usize,
        end: usize,
        fragment_id: FragmentId,
    },

    #[error("Content must not be empty")]
    EmptyContent,

    #[error("Content is unchanged")]
    UnchangedContent,

    #[error("Display name must not be empty")]
    EmptyDisplayName,

    #[error("Invalid color '{0}' (expected #rgb or #rrggbb)")]
    InvalidColor(String),
}

pub type EditorResult<T> = Result<T, EditorError>;
