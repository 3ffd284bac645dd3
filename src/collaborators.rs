//! Injected collaborators
//!
//! The editor never reaches outward through global state. Everything it
//! needs from its host is handed in at construction time: who to tell about
//! changes, how to ask for confirmation, and how to make raw text safe for
//! the rendering surface.

/// Notified after every state-mutating operation
pub trait ChangeListener {
    fn changed(&mut self);
}

impl<F: FnMut()> ChangeListener for F {
    fn changed(&mut self) {
        self()
    }
}

/// Listener used when the host does not care about changes
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ChangeListener for NoopListener {
    fn changed(&mut self) {}
}

/// Yes/no prompt consumed before destructive operations
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> ConfirmPrompt for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Prompt used when no UI is attached; it always declines
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineAll;

impl ConfirmPrompt for DeclineAll {
    fn confirm(&mut self, message: &str) -> bool {
        log::debug!("No confirmation prompt attached, declining: {}", message);
        false
    }
}

/// Makes raw text safe for a rendering surface
pub trait ContentEscaper {
    fn escape(&self, raw: &str) -> String;
}

/// Escapes text for HTML element content and attribute values
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscaper;

impl ContentEscaper for HtmlEscaper {
    fn escape(&self, raw: &str) -> String {
        let mut escaped = String::with_capacity(raw.len());
        for ch in raw.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }
}

/// Identity escaper for surfaces that take raw text (terminals, native widgets)
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainEscaper;

impl ContentEscaper for PlainEscaper {
    fn escape(&self, raw: &str) -> String {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escaper() {
        assert_eq!(
            HtmlEscaper.escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(PlainEscaper.escape("<b>"), "<b>");
    }

    #[test]
    fn test_closures_as_collaborators() {
        let mut count = 0;
        {
            let mut listener = || count += 1;
            listener.changed();
            listener.changed();
        }
        assert_eq!(count, 2);

        let mut prompt = |message: &str| message.contains("Delete");
        assert!(prompt.confirm("Delete this?"));
        assert!(!DeclineAll.confirm("Delete this?"));
    }
}
