use crate::buffer::Span;
use crate::error::EngineError;
use crate::model::{Block, BlockId, BlockKind};

/// The raw-text surface of the focused block.
///
/// `span` is where the block sat in the buffer when it was focused (or last
/// committed in place). Committing replaces exactly that range with `raw`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEdit {
    pub block_id: BlockId,
    pub kind: BlockKind,
    pub span: Span,
    /// Buffer text of `span` when the surface was seeded
    pub original: String,
    pub raw: String,
    /// Byte offset into `raw`
    pub cursor: usize,
}

impl ActiveEdit {
    /// Seed a surface from `block`. `cursor` is clamped to the content and
    /// snapped back to a char boundary.
    pub fn new(block: &Block, cursor: usize) -> Self {
        let mut cursor = cursor.min(block.content.len());
        while !block.content.is_char_boundary(cursor) {
            cursor -= 1;
        }
        Self {
            block_id: block.id.clone(),
            kind: block.kind,
            span: block.span,
            original: block.content.clone(),
            raw: block.content.clone(),
            cursor,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.raw != self.original
    }

    pub fn before_cursor(&self) -> &str {
        &self.raw[..self.cursor]
    }

    pub fn after_cursor(&self) -> &str {
        &self.raw[self.cursor..]
    }

    pub fn set_raw(&mut self, raw: String, cursor: usize) -> Result<(), EngineError> {
        check_cursor(&raw, cursor)?;
        self.raw = raw;
        self.cursor = cursor;
        Ok(())
    }

    pub fn set_cursor(&mut self, cursor: usize) -> Result<(), EngineError> {
        check_cursor(&self.raw, cursor)?;
        self.cursor = cursor;
        Ok(())
    }

    /// Type `text` at the cursor.
    pub fn insert(&mut self, text: &str) {
        self.raw.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// Delete the character before the cursor. Returns `false` at offset 0.
    pub fn delete_backward(&mut self) -> bool {
        let Some(ch) = self.before_cursor().chars().next_back() else {
            return false;
        };
        self.cursor -= ch.len_utf8();
        self.raw.remove(self.cursor);
        true
    }

    /// Record that `raw` now sits in the buffer, starting where the block did.
    pub fn mark_committed(&mut self) {
        self.span = Span::new(self.span.start, self.span.start + self.raw.len());
        self.original = self.raw.clone();
    }
}

fn check_cursor(raw: &str, cursor: usize) -> Result<(), EngineError> {
    if cursor > raw.len() {
        return Err(EngineError::OffsetOutOfBounds {
            from: cursor,
            to: cursor,
            len: raw.len(),
        });
    }
    if !raw.is_char_boundary(cursor) {
        return Err(EngineError::NotCharBoundary { offset: cursor });
    }
    Ok(())
}
