//! Structural checks tying a [`BlockModel`] to the buffer it was parsed from.

use crate::model::BlockModel;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("block model is empty")]
    Empty,
    #[error("block {index} span {from}..{to} is outside the buffer (len {len})")]
    OutOfBounds {
        index: usize,
        from: usize,
        to: usize,
        len: usize,
    },
    #[error("block {index} starts at {from}, before the previous block ends at {prev_end}")]
    Overlap {
        index: usize,
        from: usize,
        prev_end: usize,
    },
    #[error("block {index} content differs from the buffer")]
    ContentMismatch { index: usize },
}

/// Check that `model` is non-empty, ordered, and slices `text` exactly: block
/// contents joined with the separators between them rebuild `text`.
pub fn check(text: &str, model: &BlockModel) -> Result<(), InvariantViolation> {
    if model.is_empty() {
        return Err(InvariantViolation::Empty);
    }

    let mut prev_end = 0usize;
    let mut rebuilt = String::with_capacity(text.len());
    for (index, block) in model.iter().enumerate() {
        let (from, to) = (block.from(), block.to());
        if from > to || to > text.len() {
            return Err(InvariantViolation::OutOfBounds {
                index,
                from,
                to,
                len: text.len(),
            });
        }
        if from < prev_end {
            return Err(InvariantViolation::Overlap {
                index,
                from,
                prev_end,
            });
        }
        if text.get(from..to) != Some(block.content.as_str()) {
            return Err(InvariantViolation::ContentMismatch { index });
        }
        rebuilt.push_str(&text[prev_end..from]);
        rebuilt.push_str(&block.content);
        prev_end = to;
    }
    rebuilt.push_str(&text[prev_end..]);

    debug_assert_eq!(rebuilt, text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Span;
    use crate::model::{Block, BlockId, BlockKind, BlockMeta};

    fn block(from: usize, content: &str) -> Block {
        Block {
            id: BlockId::derived(BlockKind::Paragraph, from),
            kind: BlockKind::Paragraph,
            span: Span::new(from, from + content.len()),
            content: content.to_string(),
            meta: BlockMeta::default(),
        }
    }

    #[test]
    fn consistent_model_passes() {
        let model = BlockModel::new(vec![block(0, "a"), block(3, "b")]);
        assert_eq!(check("a\n\nb\n", &model), Ok(()));
    }

    #[test]
    fn placeholder_fits_empty_text() {
        assert_eq!(check("", &BlockModel::default()), Ok(()));
    }

    #[test]
    fn violations_are_reported() {
        let stale = BlockModel::new(vec![block(0, "a")]);
        assert_eq!(
            check("b", &stale),
            Err(InvariantViolation::ContentMismatch { index: 0 })
        );

        let overlapping = BlockModel::new(vec![block(0, "ab"), block(1, "b")]);
        assert!(matches!(
            check("ab", &overlapping),
            Err(InvariantViolation::Overlap { index: 1, .. })
        ));

        assert!(matches!(
            check("", &stale),
            Err(InvariantViolation::OutOfBounds { index: 0, .. })
        ));
    }
}
