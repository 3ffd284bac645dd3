//! Self-heal reconciler
//!
//! Keeps the fragment list and the text consistent after every change.
//!
//! Two passes:
//! - `relocate` first keeps every fragment whose content still sits at its
//!   span, then moves the rest through the resolver. A fragment that cannot
//!   be found, or whose every match overlaps an already placed fragment, is
//!   orphaned for this pass.
//! - `reconcile` handles text that changed behind the policy's back (the
//!   rendering surface was mutated directly). The change is located by
//!   diffing against the last consistent text. A change that leaves every
//!   disabled span intact is kept and fragments move with it; a change that
//!   damages one is dropped and the last consistent text stays expected.
//!
//! Running either pass twice without an intervening edit changes nothing.

use serde::Serialize;

use crate::config::EditorConfig;
use crate::models::{Fragment, FragmentId};
use crate::spans::resolver::{find_occurrences, resolve_fragment};
use crate::text::{TextBuffer, TextEdit, TextRange};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// The live text was replaced by the expected text
    pub text_restored: bool,
    /// The live text was accepted as the new consistent text
    pub text_accepted: bool,
    pub relocated: Vec<FragmentId>,
    pub orphaned: Vec<FragmentId>,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        self.text_restored || self.text_accepted || !self.relocated.is_empty() || !self.orphaned.is_empty()
    }
}

/// Shift every fragment at or after an applied edit
pub fn shift_fragments(fragments: &mut [Fragment], edit: &TextEdit) {
    if edit.delta() == 0 {
        return;
    }
    for fragment in fragments.iter_mut() {
        fragment.shift(edit);
    }
}

/// Bring every fragment's offsets and context in line with `text`
pub fn relocate(text: &TextBuffer, fragments: &mut [Fragment], config: &EditorConfig) -> ReconcileReport {
    let window = config.context_window;
    let mut report = ReconcileReport::default();

    // Orphans sit at (0,0); they go last so they never claim a span first
    let mut order: Vec<usize> = (0..fragments.len()).collect();
    order.sort_by_key(|&i| (fragments[i].is_orphaned(), fragments[i].start_offset, fragments[i].id));

    // Fragments still sitting on their own content keep their span
    let mut placed: Vec<TextRange> = Vec::with_capacity(fragments.len());
    let mut pending = Vec::new();
    for i in order {
        let fragment = &mut fragments[i];
        if fragment.is_in_place(text) && !overlaps_any(&placed, fragment.span()) {
            if fragment.needs_context_refresh() {
                fragment.refresh_context(text, window);
            }
            placed.push(fragment.span());
        } else {
            pending.push(i);
        }
    }

    for i in pending {
        let fragment = &mut fragments[i];
        let was_orphaned = fragment.is_orphaned();

        let resolution = resolve_fragment(fragment, text, config);
        let Some(resolved) = resolution.offset() else {
            if !was_orphaned {
                log::warn!(
                    "Could not find disabled content {:?}, orphaning fragment {}",
                    fragment.content,
                    fragment.id
                );
            }
            orphan(fragment, was_orphaned, &mut report);
            continue;
        };

        let Some(at) = free_occurrence(text, &fragment.content_chars(), resolved, &placed) else {
            log::warn!(
                "Fragment {} only matches inside other fragments, orphaning",
                fragment.id
            );
            orphan(fragment, was_orphaned, &mut report);
            continue;
        };

        log::debug!(
            "Fragment {} relocated {} -> {} ({:?})",
            fragment.id,
            fragment.start_offset,
            at,
            resolution
        );
        fragment.place(at, text, window);
        placed.push(fragment.span());
        report.relocated.push(fragment.id);
    }

    report
}

fn overlaps_any(placed: &[TextRange], span: TextRange) -> bool {
    placed.iter().any(|p| span.overlaps(p.start, p.end))
}

/// `resolved` when that span is free, otherwise the free occurrence nearest to it
fn free_occurrence(text: &TextBuffer, content: &[char], resolved: usize, placed: &[TextRange]) -> Option<usize> {
    let is_free = |at: usize| !overlaps_any(placed, TextRange::new(at, at + content.len()));
    if is_free(resolved) {
        return Some(resolved);
    }
    find_occurrences(text.chars(), content)
        .into_iter()
        .filter(|&at| is_free(at))
        .min_by_key(|&at| at.abs_diff(resolved))
}

fn orphan(fragment: &mut Fragment, was_orphaned: bool, report: &mut ReconcileReport) {
    fragment.orphan();
    if !was_orphaned {
        report.orphaned.push(fragment.id);
    }
}

/// Reconcile `consistent` (the text the fragments currently describe) with
/// `live` (the text the surface actually holds)
pub fn reconcile(
    consistent: &mut TextBuffer,
    live: &TextBuffer,
    fragments: &mut [Fragment],
    config: &EditorConfig,
) -> ReconcileReport {
    let mut text_restored = false;
    let mut text_accepted = false;

    if live != consistent {
        if let Some(edit) = surface_edit(consistent.chars(), live.chars(), fragments) {
            shift_fragments(fragments, &edit);
            *consistent = live.clone();
            text_accepted = true;
        } else if let Some(moves) = carried_fragments(consistent.chars(), live.chars(), fragments) {
            let edit = prefix_first_edit(consistent.chars(), live.chars());
            for (i, fragment) in fragments.iter_mut().enumerate() {
                match moves.iter().find(|(index, _)| *index == i) {
                    Some(&(_, start)) => {
                        fragment.end_offset = start + fragment.content_len();
                        fragment.start_offset = start;
                    }
                    None => fragment.shift(&edit),
                }
            }
            *consistent = live.clone();
            text_accepted = true;
        } else {
            let dropped = prefix_first_edit(consistent.chars(), live.chars());
            let inserted = live.slice(dropped.range.start, dropped.range.start + dropped.inserted);
            log::warn!(
                "Surface change damaged a disabled fragment, restoring expected text (discarded {}..{} -> {:?})",
                dropped.range.start,
                dropped.range.end,
                inserted
            );
            text_restored = true;
        }
    }

    let mut report = relocate(consistent, fragments, config);
    report.text_restored = text_restored;
    report.text_accepted = text_accepted;
    report
}

/// Locate the single edit turning `before` into `after` without touching a
/// fragment, trying both the leftmost and the rightmost alignment
///
/// Returns `None` when every alignment intersects a non-orphaned fragment.
pub fn surface_edit(before: &[char], after: &[char], fragments: &[Fragment]) -> Option<TextEdit> {
    let candidates = [prefix_first_edit(before, after), suffix_first_edit(before, after)];
    candidates.into_iter().find(|edit| {
        !fragments
            .iter()
            .filter(|f| !f.is_orphaned())
            .any(|f| edit.range.overlaps(f.start_offset, f.end_offset))
    })
}

/// New starts for the fragments a change spans, when each of them survives
/// intact and in order inside the changed region of `after`
///
/// Returns `(fragment index, new start)` pairs, or `None` if any spanned
/// fragment was damaged.
fn carried_fragments(before: &[char], after: &[char], fragments: &[Fragment]) -> Option<Vec<(usize, usize)>> {
    let edit = prefix_first_edit(before, after);
    let mut touched: Vec<usize> = (0..fragments.len())
        .filter(|&i| {
            let f = &fragments[i];
            !f.is_orphaned() && edit.range.overlaps(f.start_offset, f.end_offset)
        })
        .collect();
    touched.sort_by_key(|&i| fragments[i].start_offset);

    let first = fragments[*touched.first()?].start_offset;
    let last = fragments[*touched.last()?].end_offset;
    // Text outside the edited range is unchanged, so the search area maps directly
    let mut cursor = first.min(edit.range.start);
    let limit = edit.shift(last.max(edit.range.end)).min(after.len());

    let mut moves = Vec::with_capacity(touched.len());
    for i in touched {
        let content = fragments[i].content_chars();
        let area = after.get(cursor..limit)?;
        let found = area.windows(content.len()).position(|window| window == content.as_slice())?;
        moves.push((i, cursor + found));
        cursor += found + content.len();
    }
    Some(moves)
}

fn common_prefix(a: &[char], b: &[char], limit: usize) -> usize {
    a.iter().zip(b).take(limit).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[char], b: &[char], limit: usize) -> usize {
    a.iter().rev().zip(b.iter().rev()).take(limit).take_while(|(x, y)| x == y).count()
}

fn prefix_first_edit(before: &[char], after: &[char]) -> TextEdit {
    let shortest = before.len().min(after.len());
    let prefix = common_prefix(before, after, shortest);
    let suffix = common_suffix(before, after, shortest - prefix);
    diff_edit(before, after, prefix, suffix)
}

fn suffix_first_edit(before: &[char], after: &[char]) -> TextEdit {
    let shortest = before.len().min(after.len());
    let suffix = common_suffix(before, after, shortest);
    let prefix = common_prefix(before, after, shortest - suffix);
    diff_edit(before, after, prefix, suffix)
}

fn diff_edit(before: &[char], after: &[char], prefix: usize, suffix: usize) -> TextEdit {
    TextEdit::new(
        TextRange::new(prefix, before.len() - suffix),
        after.len() - suffix - prefix,
    )
}
