//! Prompt Editor WASM API
//!
//! JavaScript-facing surface of the editor.
//!
//! # Module Structure
//!
//! - `helpers`: Logging macros, serde bridging and error reporting
//! - `types`: Input shapes received from JavaScript
//! - `editor`: The `PromptEditor` class

pub mod helpers;
pub mod types;
pub mod editor;

pub use editor::WasmPromptEditor;
pub use types::KeyEventInput;
