//! Edit-protection policy
//!
//! Every request to mutate the document is turned into an effective affected
//! range first; the request is rejected if that range intersects any disabled
//! fragment. Navigation keys and ctrl/meta combinations always pass through
//! and never mutate the document themselves.

use serde::{Deserialize, Serialize};

use crate::models::{Fragment, FragmentId};
use crate::text::{Selection, TextRange};

/// Keys the editor distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Escape,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Some(Key::Char(ch));
        }
        Some(match key {
            "Enter" => Key::Enter,
            "Tab" => Key::Tab,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "Home" => Key::Home,
            "End" => Key::End,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            "Escape" => Key::Escape,
            _ => return None,
        })
    }

    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Key::ArrowLeft
                | Key::ArrowRight
                | Key::ArrowUp
                | Key::ArrowDown
                | Key::Home
                | Key::End
                | Key::PageUp
                | Key::PageDown
                | Key::Escape
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Control or meta held: a shortcut, not text input
    pub fn is_command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A raw request to change the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditIntent {
    Key {
        key: Key,
        modifiers: Modifiers,
        selection: Selection,
    },
    Paste {
        text: String,
        selection: Selection,
    },
    /// Programmatic insert (drop, insert-at-cursor, hidden snippet reuse)
    Insert {
        text: String,
        selection: Selection,
    },
}

/// The concrete change an accepted intent makes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub range: TextRange,
    pub text: String,
}

impl EditIntent {
    pub fn typed(ch: char, selection: Selection) -> Self {
        EditIntent::Key {
            key: Key::Char(ch),
            modifiers: Modifiers::default(),
            selection,
        }
    }

    pub fn key(key: Key, selection: Selection) -> Self {
        EditIntent::Key {
            key,
            modifiers: Modifiers::default(),
            selection,
        }
    }

    /// The replacement this intent performs on a document of `len` chars
    ///
    /// `None` means the intent never mutates: navigation, shortcuts, or a
    /// collapsed delete at the document edge.
    pub fn mutation(&self, len: usize) -> Option<Mutation> {
        match self {
            EditIntent::Key { key, modifiers, selection } => {
                if modifiers.is_command() || key.is_navigation() {
                    return None;
                }
                let range = selection.clamp(len).range();
                let replace = |text: &str| Some(Mutation { range, text: text.to_string() });
                match key {
                    Key::Char(ch) => replace(&ch.to_string()),
                    Key::Enter => replace("\n"),
                    Key::Tab => replace("\t"),
                    Key::Backspace if !range.is_empty() => replace(""),
                    Key::Backspace if range.start > 0 => Some(Mutation {
                        range: TextRange::new(range.start - 1, range.start),
                        text: String::new(),
                    }),
                    Key::Delete if !range.is_empty() => replace(""),
                    Key::Delete if range.end < len => Some(Mutation {
                        range: TextRange::new(range.end, range.end + 1),
                        text: String::new(),
                    }),
                    _ => None,
                }
            }
            EditIntent::Paste { text, selection } | EditIntent::Insert { text, selection } => Some(Mutation {
                range: selection.clamp(len).range(),
                text: text.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The intent may be applied
    Allow,
    /// The intent touches a disabled fragment and must be dropped
    Reject { fragment_id: FragmentId },
    /// The intent does not mutate the document
    PassThrough,
}

/// First fragment whose span intersects `range`
pub fn blocking_fragment<'a>(fragments: &'a [Fragment], range: TextRange) -> Option<&'a Fragment> {
    fragments
        .iter()
        .filter(|f| !f.is_orphaned())
        .find(|f| range.overlaps(f.start_offset, f.end_offset))
}

/// Decide whether an intent may touch a document of `len` chars
pub fn evaluate(intent: &EditIntent, fragments: &[Fragment], len: usize) -> Verdict {
    let Some(mutation) = intent.mutation(len) else {
        return Verdict::PassThrough;
    };
    match blocking_fragment(fragments, mutation.range) {
        Some(fragment) => {
            log::debug!(
                "Rejected edit {}..{}: overlaps disabled fragment {} ({}..{})",
                mutation.range.start,
                mutation.range.end,
                fragment.id,
                fragment.start_offset,
                fragment.end_offset
            );
            Verdict::Reject { fragment_id: fragment.id }
        }
        None => Verdict::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextBuffer;

    fn world_fragment() -> (TextBuffer, Vec<Fragment>) {
        let text = TextBuffer::from_str("Hello world, keep this safe.");
        let fragment = Fragment::new(1, "world", 6, &text, 10);
        (text, vec![fragment])
    }

    #[test]
    fn test_typing_inside_fragment_rejected() {
        let (text, fragments) = world_fragment();
        let intent = EditIntent::typed('x', Selection::collapsed(8));
        assert_eq!(evaluate(&intent, &fragments, text.len()), Verdict::Reject { fragment_id: 1 });
    }

    #[test]
    fn test_typing_at_boundaries_allowed() {
        let (text, fragments) = world_fragment();
        for pos in [6, 11] {
            let intent = EditIntent::typed('x', Selection::collapsed(pos));
            assert_eq!(evaluate(&intent, &fragments, text.len()), Verdict::Allow);
        }
    }

    #[test]
    fn test_backspace_after_fragment_rejected() {
        let (text, fragments) = world_fragment();
        let intent = EditIntent::key(Key::Backspace, Selection::collapsed(11));
        assert_eq!(evaluate(&intent, &fragments, text.len()), Verdict::Reject { fragment_id: 1 });

        // Backspace right before the fragment deletes the space
        let intent = EditIntent::key(Key::Backspace, Selection::collapsed(6));
        assert_eq!(evaluate(&intent, &fragments, text.len()), Verdict::Allow);
    }

    #[test]
    fn test_delete_before_fragment_rejected() {
        let (text, fragments) = world_fragment();
        let intent = EditIntent::key(Key::Delete, Selection::collapsed(6));
        assert_eq!(evaluate(&intent, &fragments, text.len()), Verdict::Reject { fragment_id: 1 });
    }

    #[test]
    fn test_paste_over_selection_spanning_fragment_rejected() {
        let (text, fragments) = world_fragment();
        let intent = EditIntent::Paste {
            text: "hi".to_string(),
            selection: Selection::new(13, 2),
        };
        assert_eq!(evaluate(&intent, &fragments, text.len()), Verdict::Reject { fragment_id: 1 });
    }

    #[test]
    fn test_navigation_and_shortcuts_pass_through() {
        let (text, fragments) = world_fragment();
        let inside = Selection::collapsed(8);
        let nav = EditIntent::key(Key::ArrowLeft, inside);
        assert_eq!(evaluate(&nav, &fragments, text.len()), Verdict::PassThrough);

        let copy = EditIntent::Key {
            key: Key::Char('c'),
            modifiers: Modifiers { ctrl: true, ..Default::default() },
            selection: Selection::new(6, 11),
        };
        assert_eq!(evaluate(&copy, &fragments, text.len()), Verdict::PassThrough);
    }

    #[test]
    fn test_edge_deletes_do_nothing() {
        assert_eq!(EditIntent::key(Key::Backspace, Selection::collapsed(0)).mutation(5), None);
        assert_eq!(EditIntent::key(Key::Delete, Selection::collapsed(5)).mutation(5), None);
    }

    #[test]
    fn test_key_from_dom() {
        assert_eq!(Key::from_dom("a"), Some(Key::Char('a')));
        assert_eq!(Key::from_dom("é"), Some(Key::Char('é')));
        assert_eq!(Key::from_dom("Backspace"), Some(Key::Backspace));
        assert_eq!(Key::from_dom("F5"), None);
    }
}
