//! Prompt Editor WASM Module
//!
//! Text editor core for prompt authoring. Spans of the prompt can be marked
//! disabled (kept inline, excluded from the emitted value and protected from
//! edits) or hidden (excised into named, reusable snippets). Disabled spans
//! are tracked by content and surrounding context so they survive edits that
//! shift raw offsets.

pub mod api;
pub mod collaborators;
pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod presets;
pub mod renderers;
pub mod spans;
pub mod text;

// Re-export commonly used types
pub use collaborators::{ChangeListener, ConfirmPrompt, ContentEscaper, DeclineAll, HtmlEscaper, NoopListener, PlainEscaper};
pub use config::EditorConfig;
pub use editor::{EditOutcome, HiddenUpdate, PromptEditor};
pub use error::{EditorError, EditorResult};
pub use models::{EditorSnapshot, Fragment, FragmentId, HiddenElement, HiddenId, SnapshotData, SpanKind};
pub use renderers::{DisplayRun, Run};
pub use spans::{EditIntent, Key, Modifiers, ReconcileReport, Verdict};
pub use text::{Selection, TextBuffer, TextRange};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }

    log::info!("Prompt Editor WASM module initialized");
}
