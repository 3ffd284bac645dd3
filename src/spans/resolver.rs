//! Offset resolver
//!
//! Recomputes where a fragment's content sits after the surrounding text
//! changed. Only exact content matches are accepted; the context window and
//! the last known anchor are used purely to choose between repeated matches.
//!
//! Resolution order:
//! 1. no occurrence: not found (the caller orphans the fragment)
//! 2. one occurrence: that one
//! 3. several occurrences, some context known: first occurrence whose
//!    surroundings agree with both context strings
//! 4. several occurrences with a known anchor: closest to the anchor,
//!    leftmost on ties
//! 5. otherwise: first occurrence strictly inside the configured edge band,
//!    or the first occurrence if none is

use crate::config::EditorConfig;
use crate::models::Fragment;
use crate::text::TextBuffer;

/// Which rule settled a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    Unique(usize),
    Context(usize),
    Nearest(usize),
    Positional(usize),
}

impl Resolution {
    pub fn offset(&self) -> Option<usize> {
        match *self {
            Resolution::NotFound => None,
            Resolution::Unique(at)
            | Resolution::Context(at)
            | Resolution::Nearest(at)
            | Resolution::Positional(at) => Some(at),
        }
    }
}

/// What is known about a span when looking for it again
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub content: &'a [char],
    pub context_before: &'a [char],
    pub context_after: &'a [char],
    pub anchor: Option<usize>,
}

/// All start indices of `needle` in `text`, left to right, overlaps included
pub fn find_occurrences(text: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > text.len() {
        return Vec::new();
    }
    text.windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .map(|(start, _)| start)
        .collect()
}

/// Up to `window` characters before `start` and after `end`
pub fn context_around(text: &[char], start: usize, end: usize, window: usize) -> (String, String) {
    let start = start.min(text.len());
    let end = end.clamp(start, text.len());
    let before = text[start.saturating_sub(window)..start].iter().collect();
    let after = text[end..(end + window).min(text.len())].iter().collect();
    (before, after)
}

fn context_matches(text: &[char], at: usize, request: &ResolveRequest) -> bool {
    let before_ok = request.context_before.is_empty() || text[..at].ends_with(request.context_before);
    let after_start = at + request.content.len();
    let after_ok = request.context_after.is_empty() || text[after_start..].starts_with(request.context_after);
    before_ok && after_ok
}

/// Resolve a span's current start in `text`
pub fn resolve_offset(text: &[char], request: &ResolveRequest, config: &EditorConfig) -> Resolution {
    let occurrences = find_occurrences(text, request.content);

    match occurrences.as_slice() {
        [] => return Resolution::NotFound,
        [only] => return Resolution::Unique(*only),
        _ => {}
    }

    let has_context = !request.context_before.is_empty() || !request.context_after.is_empty();
    if has_context {
        if let Some(&at) = occurrences.iter().find(|&&at| context_matches(text, at, request)) {
            return Resolution::Context(at);
        }
    }

    if let Some(anchor) = request.anchor {
        let mut best = occurrences[0];
        for &at in &occurrences[1..] {
            if at.abs_diff(anchor) < best.abs_diff(anchor) {
                best = at;
            }
        }
        return Resolution::Nearest(best);
    }

    let len = text.len() as f64;
    let banded = occurrences.iter().copied().find(|&at| {
        let relative = at as f64 / len;
        relative > config.edge_band_low && relative < config.edge_band_high
    });
    Resolution::Positional(banded.unwrap_or(occurrences[0]))
}

/// Resolve a fragment against `text` without touching it
pub fn resolve_fragment(fragment: &Fragment, text: &TextBuffer, config: &EditorConfig) -> Resolution {
    let content = fragment.content_chars();
    let before: Vec<char> = fragment.context_before.chars().collect();
    let after: Vec<char> = fragment.context_after.chars().collect();
    let request = ResolveRequest {
        content: &content,
        context_before: &before,
        context_after: &after,
        anchor: fragment.original_start_offset,
    };
    resolve_offset(text.chars(), &request, config)
}
