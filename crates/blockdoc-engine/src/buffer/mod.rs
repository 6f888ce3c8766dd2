//! # Document Buffer
//!
//! The single authoritative text of a document, stored in an `xi_rope::Rope`.
//! Every other component reads through it or issues offset-based commands
//! against it; nothing keeps an independent long-lived copy of the text.
//!
//! Mutations are synchronous. The block model derived from the buffer is
//! rebuilt separately (see [`crate::document::Document`]), so `text()` and
//! `slice()` are always current even while a reparse is outstanding.

pub mod lines;
pub mod span;

use std::borrow::Cow;
use std::fmt;

use xi_rope::{Rope, delta::Builder};

use crate::error::EngineError;

pub use lines::{LineRef, lines_with_spans};
pub use span::Span;

#[derive(Clone)]
pub struct DocumentBuffer {
    rope: Rope,
    /// Incremented on every mutation (enables stale-model detection)
    revision: u64,
}

impl Default for DocumentBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

impl DocumentBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from(text),
            revision: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len() == 0
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Slice the buffer, clamping the range to the document bounds. Offsets
    /// inside a multi-byte character snap back to its start.
    pub fn slice(&self, from: usize, to: usize) -> Cow<'_, str> {
        let start = self.floor_boundary(from);
        let end = self.floor_boundary(to).max(start);
        self.rope.slice_to_cow(start..end)
    }

    /// Largest char boundary at or before `offset`, clamped to the buffer.
    pub fn floor_boundary(&self, offset: usize) -> usize {
        let len = self.rope.len();
        if offset >= len {
            return len;
        }
        if offset == 0 || self.rope.is_codepoint_boundary(offset) {
            return offset;
        }
        self.rope.prev_codepoint_offset(offset).unwrap_or(0)
    }

    /// Replace the whole buffer.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from(text);
        self.revision += 1;
    }

    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), EngineError> {
        self.replace(offset, offset, text)
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<(), EngineError> {
        self.replace(from, to, "")
    }

    pub fn replace(&mut self, from: usize, to: usize, text: &str) -> Result<(), EngineError> {
        self.check_range(from, to)?;

        let mut builder = Builder::new(self.rope.len());
        builder.replace(from..to, Rope::from(text));
        let delta = builder.build();
        self.rope = delta.apply(&self.rope);
        self.revision += 1;
        Ok(())
    }

    pub fn check_range(&self, from: usize, to: usize) -> Result<(), EngineError> {
        let len = self.rope.len();
        if from > to || to > len {
            return Err(EngineError::OffsetOutOfBounds { from, to, len });
        }
        for offset in [from, to] {
            if offset != 0 && offset != len && !self.rope.is_codepoint_boundary(offset) {
                return Err(EngineError::NotCharBoundary { offset });
            }
        }
        Ok(())
    }
}

impl fmt::Display for DocumentBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.iter_chunks(..) {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DocumentBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentBuffer")
            .field("len", &self.len())
            .field("revision", &self.revision)
            .finish()
    }
}
