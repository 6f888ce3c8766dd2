use super::span::Span;

/// A reference to a single line of text with its byte span.
#[derive(Debug, Clone)]
pub struct LineRef {
    /// Byte span of this line (includes newline if present).
    pub span: Span,
    /// The line text, newline included.
    pub text: String,
}

impl LineRef {
    /// Line text without its trailing `\n` / `\r\n`.
    pub fn content(&self) -> &str {
        self.text.trim_end_matches(['\r', '\n'])
    }

    /// Span of the line without its trailing `\n` / `\r\n`.
    pub fn content_span(&self) -> Span {
        Span::new(self.span.start, self.span.start + self.content().len())
    }
}

/// Returns an iterator over lines with their byte spans.
///
/// Newline characters stay attached to their line so spans line up with
/// buffer offsets.
pub fn lines_with_spans(text: &str) -> impl Iterator<Item = LineRef> + '_ {
    let mut offset = 0usize;
    text.split_inclusive('\n').map(move |line| {
        let start = offset;
        offset += line.len();
        LineRef {
            span: Span { start, end: offset },
            text: line.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_cover_the_whole_text() {
        let text = "one\ntwo\r\n\nthree";
        let lines: Vec<_> = lines_with_spans(text).collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].span, Span::new(0, 4));
        assert_eq!(lines[1].span, Span::new(4, 9));
        assert_eq!(lines[3].span, Span::new(10, 15));
        assert_eq!(lines.last().map(|l| l.span.end), Some(text.len()));
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert_eq!(lines_with_spans("").count(), 0);
    }

    #[test]
    fn content_span_drops_line_endings() {
        let first = lines_with_spans("two\r\nx").next().unwrap();
        assert_eq!(first.content(), "two");
        assert_eq!(first.content_span(), Span::new(0, 3));
    }
}
