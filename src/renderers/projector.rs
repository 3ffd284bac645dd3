//! Projector
//!
//! Pure mapping from (text, fragments) to an ordered run list alternating
//! plain and protected runs. The same run list feeds every presentation
//! layer and the value extraction behind `getValue()`.

use serde::{Deserialize, Serialize};

use crate::collaborators::ContentEscaper;
use crate::models::{Fragment, FragmentId};
use crate::text::TextBuffer;

/// A contiguous piece of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub text: String,
    pub protected: bool,
    pub fragment_id: Option<FragmentId>,
}

impl Run {
    fn plain(text: String) -> Self {
        Self {
            text,
            protected: false,
            fragment_id: None,
        }
    }

    fn protected(text: String, id: FragmentId) -> Self {
        Self {
            text,
            protected: true,
            fragment_id: Some(id),
        }
    }
}

/// A run prepared for a rendering surface
///
/// Protected runs are atomic: the surface must render them as a single
/// non-editable chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRun {
    pub escaped: String,
    pub protected: bool,
    pub fragment_id: Option<FragmentId>,
    pub atomic: bool,
}

/// Split `text` into plain and protected runs
///
/// Orphaned spans, spans past the end of the text and spans starting inside
/// an earlier span are skipped. Empty plain runs are not emitted.
pub fn project(text: &TextBuffer, fragments: &[Fragment]) -> Vec<Run> {
    let mut sorted: Vec<&Fragment> = fragments.iter().collect();
    sorted.sort_by_key(|f| (f.start_offset, f.id));

    let mut runs = Vec::new();
    let mut last = 0;
    for fragment in sorted {
        if fragment.is_orphaned() || fragment.end_offset > text.len() || fragment.start_offset < last {
            continue;
        }
        if fragment.start_offset > last {
            runs.push(Run::plain(text.slice(last, fragment.start_offset)));
        }
        runs.push(Run::protected(
            text.slice(fragment.start_offset, fragment.end_offset),
            fragment.id,
        ));
        last = fragment.end_offset;
    }
    if last < text.len() {
        runs.push(Run::plain(text.slice(last, text.len())));
    }
    runs
}

/// The externally visible value: plain runs only, trimmed
pub fn extract_value(runs: &[Run]) -> String {
    let value: String = runs
        .iter()
        .filter(|run| !run.protected)
        .map(|run| run.text.as_str())
        .collect();
    value.trim().to_string()
}

/// Escape every run for a rendering surface
pub fn display_runs(runs: &[Run], escaper: &dyn ContentEscaper) -> Vec<DisplayRun> {
    runs.iter()
        .map(|run| DisplayRun {
            escaped: escaper.escape(&run.text),
            protected: run.protected,
            fragment_id: run.fragment_id,
            atomic: run.protected,
        })
        .collect()
}

/// Render runs as editable-surface markup
///
/// Protected runs become non-editable spans carrying their fragment id.
pub fn render_markup(runs: &[Run], escaper: &dyn ContentEscaper) -> String {
    let mut html = String::new();
    for run in display_runs(runs, escaper) {
        match run.fragment_id {
            Some(id) if run.protected => {
                html.push_str(&format!(
                    r#"<span class="disabled-text" data-fragment-id="{}" contenteditable="false">{}</span>"#,
                    id, run.escaped
                ));
            }
            _ => html.push_str(&run.escaped),
        }
    }
    html
}
