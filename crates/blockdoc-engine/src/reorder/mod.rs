//! # Reorder Engine
//!
//! Moving a block is a text operation on the buffer, not a list splice:
//! cut the block out together with one separator, then reinsert both next
//! to the target. [`move_block`] is pure so it can be tested without any
//! drag gesture or engine around it.
//!
//! Separator rule: a block carries the line breaks that follow it when more
//! content follows, otherwise the line breaks that precede it. With no line
//! breaks on either side it gets `"\n"`. The carried separator goes after
//! the block when inserting before a target and before it when inserting
//! after one, so moving a block away and back restores the text exactly.

use std::ops::Range;

use crate::buffer::Span;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Before,
    After,
}

/// Text of `text` after moving the `source` block next to `target`.
///
/// Moving a block onto itself, or onto a span overlapping it, returns the
/// text unchanged.
pub fn move_block(
    text: &str,
    source: Span,
    target: Span,
    placement: Placement,
) -> Result<String, EngineError> {
    for span in [source, target] {
        if span.start > span.end || span.end > text.len() {
            return Err(EngineError::OffsetOutOfBounds {
                from: span.start,
                to: span.end,
                len: text.len(),
            });
        }
        for offset in [span.start, span.end] {
            if !text.is_char_boundary(offset) {
                return Err(EngineError::NotCharBoundary { offset });
            }
        }
    }
    if source == target || (source.start < target.end && target.start < source.end) {
        return Ok(text.to_string());
    }

    let block = &text[source.range()];
    let (cut, separator) = excision(text, source);

    let mut result = String::with_capacity(text.len() + 1);
    result.push_str(&text[..cut.start]);
    result.push_str(&text[cut.end..]);

    let shift = |offset: usize| {
        if offset >= cut.end {
            offset - cut.len()
        } else {
            offset
        }
    };
    let (at, insertion) = match placement {
        Placement::Before => (shift(target.start), format!("{block}{separator}")),
        Placement::After => (shift(target.end), format!("{separator}{block}")),
    };
    result.insert_str(at, &insertion);
    Ok(result)
}

/// Range to cut for `source` and the separator it takes along.
fn excision(text: &str, source: Span) -> (Range<usize>, &str) {
    let is_break = |b: &u8| *b == b'\n' || *b == b'\r';
    let bytes = text.as_bytes();

    let trailing = bytes[source.end..].iter().take_while(|b| is_break(b)).count();
    if trailing > 0 && source.end + trailing < text.len() {
        let end = source.end + trailing;
        return (source.start..end, &text[source.end..end]);
    }

    let leading = bytes[..source.start]
        .iter()
        .rev()
        .take_while(|b| is_break(b))
        .count();
    if leading > 0 {
        let start = source.start - leading;
        return (start..source.end, &text[start..source.start]);
    }

    (source.range(), "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Spans of the non-blank lines of `text`, which is how blocks fall in
    /// these fixtures.
    fn spans(text: &str) -> Vec<Span> {
        crate::buffer::lines_with_spans(text)
            .filter(|l| !l.content().is_empty())
            .map(|l| l.content_span())
            .collect()
    }

    fn mv(text: &str, source: usize, target: usize, placement: Placement) -> String {
        let spans = spans(text);
        move_block(text, spans[source], spans[target], placement).unwrap()
    }

    #[rstest]
    #[case(2, 0, Placement::Before, "C\n\nA\n\nB")]
    #[case(0, 1, Placement::After, "B\n\nA\n\nC")]
    #[case(0, 2, Placement::After, "B\n\nC\n\nA")]
    #[case(1, 0, Placement::Before, "B\n\nA\n\nC")]
    #[case(2, 1, Placement::Before, "A\n\nC\n\nB")]
    fn moves_between_blank_line_separated_blocks(
        #[case] source: usize,
        #[case] target: usize,
        #[case] placement: Placement,
        #[case] expected: &str,
    ) {
        assert_eq!(mv("A\n\nB\n\nC", source, target, placement), expected);
    }

    /// Moving back means placing the block next to the neighbour whose
    /// separator it carried away.
    #[rstest]
    #[case("A\n\nB\n\nC", (2, 0, Placement::Before), (0, 2, Placement::After))]
    #[case("A\n\nB\n\nC", (0, 2, Placement::After), (2, 0, Placement::Before))]
    #[case("A\nB\n\nC\n", (1, 2, Placement::After), (2, 1, Placement::Before))]
    #[case("# T\r\n\r\nbody\r\n\r\n- x", (0, 2, Placement::After), (2, 0, Placement::Before))]
    fn moving_back_restores_text(
        #[case] text: &str,
        #[case] away: (usize, usize, Placement),
        #[case] back: (usize, usize, Placement),
    ) {
        let moved = mv(text, away.0, away.1, away.2);
        assert_ne!(moved, text);
        assert_eq!(mv(&moved, back.0, back.1, back.2), text);
    }

    #[test]
    fn moving_onto_itself_is_a_noop() {
        assert_eq!(mv("A\n\nB", 1, 1, Placement::Before), "A\n\nB");
    }

    #[test]
    fn adjacent_blocks_without_separator_get_a_newline() {
        let text = "AB";
        let moved = move_block(text, Span::new(1, 2), Span::new(0, 1), Placement::Before).unwrap();
        assert_eq!(moved, "B\nA");
    }

    #[test]
    fn out_of_range_spans_are_rejected() {
        let err = move_block("abc", Span::new(0, 9), Span::new(0, 1), Placement::Before).unwrap_err();
        assert_eq!(err, EngineError::OffsetOutOfBounds { from: 0, to: 9, len: 3 });
    }
}
