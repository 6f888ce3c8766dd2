//! # Block Model
//!
//! The ordered list of [`Block`]s derived from the buffer. It is replaced
//! wholesale after every parse and never patched in place, so a reference held
//! across an `.await` may be stale.
//!
//! Invariants upheld on construction:
//! - at least one block (an empty paragraph at `0..0` when parsing found none)
//! - blocks sorted by `from`, non-overlapping

pub mod block;

pub use block::{Block, BlockId, BlockKind, BlockMeta, ColumnAlignment};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockModel {
    blocks: Vec<Block>,
}

impl Default for BlockModel {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl BlockModel {
    /// Build a model, synthesizing the placeholder paragraph when `blocks`
    /// is empty.
    pub fn new(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            log::debug!("parse produced no blocks, synthesizing placeholder paragraph");
            return Self {
                blocks: vec![Block::placeholder()],
            };
        }
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    pub fn find(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    /// Block whose inclusive `[from, to]` range contains `offset`.
    ///
    /// Binary search: the list is sorted by construction. When two blocks
    /// touch (`a.to == b.from`) the earlier one wins.
    pub fn block_at(&self, offset: usize) -> Option<&Block> {
        let idx = self.blocks.partition_point(|b| b.to() < offset);
        self.blocks
            .get(idx)
            .filter(|b| b.span.contains_inclusive(offset))
    }

    /// Block that starts exactly at `offset`.
    pub fn block_starting_at(&self, offset: usize) -> Option<&Block> {
        let idx = self.blocks.partition_point(|b| b.from() < offset);
        self.blocks.get(idx).filter(|b| b.from() == offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Span;

    fn block(kind: BlockKind, from: usize, content: &str) -> Block {
        Block {
            id: BlockId::derived(kind, from),
            kind,
            span: Span::new(from, from + content.len()),
            content: content.to_string(),
            meta: BlockMeta::default(),
        }
    }

    fn sample() -> BlockModel {
        // "# Title\n\nSome text\n\n- item"
        BlockModel::new(vec![
            block(BlockKind::Heading, 0, "# Title"),
            block(BlockKind::Paragraph, 9, "Some text"),
            block(BlockKind::List, 20, "- item"),
        ])
    }

    #[test]
    fn empty_input_yields_placeholder() {
        let model = BlockModel::new(vec![]);
        assert_eq!(model.len(), 1);
        assert_eq!(model.blocks()[0], Block::placeholder());
        assert!(!model.is_empty());
    }

    #[test]
    fn block_at_uses_inclusive_ranges() {
        let model = sample();
        assert_eq!(model.block_at(0).map(|b| b.kind), Some(BlockKind::Heading));
        assert_eq!(model.block_at(7).map(|b| b.kind), Some(BlockKind::Heading));
        assert_eq!(model.block_at(9).map(|b| b.kind), Some(BlockKind::Paragraph));
        assert_eq!(model.block_at(18).map(|b| b.kind), Some(BlockKind::Paragraph));
        assert_eq!(model.block_at(26).map(|b| b.kind), Some(BlockKind::List));
    }

    #[test]
    fn block_at_in_separator_gap_is_none() {
        let model = sample();
        assert!(model.block_at(8).is_none());
        assert!(model.block_at(19).is_none());
        assert!(model.block_at(100).is_none());
    }

    #[test]
    fn block_starting_at_requires_exact_start() {
        let model = sample();
        assert_eq!(
            model.block_starting_at(9).map(|b| b.id.as_str()),
            Some("paragraph-9")
        );
        assert!(model.block_starting_at(10).is_none());
    }

    #[test]
    fn lookup_by_id() {
        let model = sample();
        let id = BlockId::from("list-20");
        assert_eq!(model.index_of(&id), Some(2));
        assert_eq!(model.find(&id).map(|b| b.content.as_str()), Some("- item"));
        assert!(model.find(&BlockId::from("nope")).is_none());
    }
}
