//! Models module for the prompt editor
//!
//! Data structures for disabled fragments, hidden elements and the
//! persisted editor state.

pub mod fragment;
pub mod hidden;
pub mod ids;
pub mod snapshot;

// Re-export commonly used types
pub use fragment::{Fragment, FragmentId, SpanKind};
pub use hidden::{is_valid_color, HiddenElement, HiddenId};
pub use snapshot::{EditorSnapshot, FragmentRecord, HiddenRecord, RestoredState, SnapshotData};
