use crate::buffer::{LineRef, Span};

use super::kinds::{
    BlockQuote, CodeFence, FenceOpen, Heading, ListMarker, ListOpen, MathFence, ThematicBreak,
};

/// What kind of block a line could open, judged from the line alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOpen {
    Heading { level: u8 },
    Fence(FenceOpen),
    Math { closed: bool },
    Quote { callout: Option<String> },
    ThematicBreak,
    ListItem(ListOpen),
}

/// Classification of a single line containing only local facts.
///
/// This is phase 1 of the fallback splitter: each line is classified
/// independently without reference to surrounding context.
#[derive(Debug, Clone)]
pub struct LineClass {
    /// Span of the line without its line ending.
    pub content: Span,
    /// Line text without its line ending.
    pub text: String,
    /// Whether the line is whitespace only.
    pub is_blank: bool,
    /// Starts with a space or tab (list continuation).
    pub indented: bool,
    pub open: Option<LineOpen>,
}

pub struct LineClassifier;

impl LineClassifier {
    pub fn classify(&self, lr: &LineRef) -> LineClass {
        let text = lr.content();
        let is_blank = text.trim().is_empty();
        LineClass {
            content: lr.content_span(),
            text: text.to_string(),
            is_blank,
            indented: text.starts_with([' ', '\t']),
            open: if is_blank { None } else { Self::opener(text) },
        }
    }

    fn opener(text: &str) -> Option<LineOpen> {
        // Precedence: fence beats everything else.
        if let Some(fence) = CodeFence::open(text) {
            return Some(LineOpen::Fence(fence));
        }
        if MathFence::opens(text) {
            return Some(LineOpen::Math {
                closed: MathFence::closed_on_open(text),
            });
        }
        if let Some(level) = Heading::level(text) {
            return Some(LineOpen::Heading { level });
        }
        if BlockQuote::is_quote_line(text) {
            return Some(LineOpen::Quote {
                callout: BlockQuote::callout_kind(text),
            });
        }
        // Before lists: `* * *` is a rule, not an item.
        if ThematicBreak::matches(text) {
            return Some(LineOpen::ThematicBreak);
        }
        ListMarker::parse(text).map(LineOpen::ListItem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::lines_with_spans;

    fn classify(line: &str) -> LineClass {
        let lr = lines_with_spans(line).next().unwrap();
        LineClassifier.classify(&lr)
    }

    #[test]
    fn blank_lines_have_no_opener() {
        let c = classify("   \n");
        assert!(c.is_blank);
        assert_eq!(c.open, None);
        assert_eq!(c.content, Span::new(0, 3));
    }

    #[test]
    fn fence_beats_other_openers() {
        assert!(matches!(classify("```md").open, Some(LineOpen::Fence(_))));
    }

    #[test]
    fn rule_beats_list() {
        assert_eq!(classify("* * *").open, Some(LineOpen::ThematicBreak));
        assert!(matches!(classify("* item").open, Some(LineOpen::ListItem(_))));
    }

    #[test]
    fn callout_is_a_quote_with_kind() {
        assert_eq!(
            classify("> [!warning]").open,
            Some(LineOpen::Quote {
                callout: Some("warning".to_string())
            })
        );
    }

    #[test]
    fn plain_text_and_indentation() {
        let c = classify("  continued");
        assert_eq!(c.open, None);
        assert!(c.indented);
    }
}
