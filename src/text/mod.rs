//! Layer 0: Text Editor Core
//!
//! Pure text editing with no knowledge of disabled fragments or hidden
//! snippets. The span engine in `crate::spans` sits on top of this layer.
//!
//! ## Modules
//!
//! - `buffer`: Text storage and editing operations
//! - `cursor`: Caret and selection management (codepoint positions)

pub mod buffer;
pub mod cursor;

// Re-exports for convenience
pub use buffer::{TextBuffer, TextEdit};
pub use cursor::{Selection, TextRange};
