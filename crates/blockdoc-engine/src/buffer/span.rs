use std::ops::Range;

/// A byte range `[start, end)` into the document buffer.
///
/// Blocks store spans rather than owning the authoritative text: slicing the
/// buffer with any block span reproduces the exact source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// `[start, end]` containment, so an offset sitting right after the last
    /// byte still belongs to the span (caret at end of block).
    #[must_use]
    pub fn contains_inclusive(self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_saturates_on_inverted_span() {
        assert_eq!(Span::new(5, 2).len(), 0);
        assert!(Span::new(5, 2).is_empty());
    }

    #[test]
    fn inclusive_containment_includes_end() {
        let span = Span::new(3, 7);
        assert!(span.contains_inclusive(3));
        assert!(span.contains_inclusive(7));
        assert!(!span.contains_inclusive(8));
        assert!(!span.contains_inclusive(2));
    }

    #[test]
    fn empty_span_contains_its_offset() {
        assert!(Span::new(0, 0).contains_inclusive(0));
    }
}
