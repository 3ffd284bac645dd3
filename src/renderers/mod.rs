//! Renderers
//!
//! Turns the document and its fragments into something a presentation layer
//! can draw, or into the final extracted value.

pub mod projector;

pub use projector::{display_runs, extract_value, project, render_markup, DisplayRun, Run};
