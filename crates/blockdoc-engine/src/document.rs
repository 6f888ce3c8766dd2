//! A buffer, the block model derived from it, and the edit history, kept
//! together so every mutation goes through one place.
//!
//! The model trails the buffer: mutations are synchronous and bump the
//! buffer revision, and the model only catches up on [`Document::reparse`].
//! `parsed_revision` is the single pending-parse slot. When it differs from
//! the buffer revision a parse is outstanding and [`Document::ensure_parsed`]
//! settles it before anything trusts block offsets again.

use std::sync::Arc;
use std::time::Instant;

use blockdoc_config::HistoryConfig;

use crate::buffer::DocumentBuffer;
use crate::error::EngineError;
use crate::history::{Transaction, TransactionHistory};
use crate::model::BlockModel;
use crate::parsing::{ParseService, ParserBridge};

pub struct Document {
    buffer: DocumentBuffer,
    model: BlockModel,
    /// Buffer revision the current model was derived from
    parsed_revision: u64,
    bridge: ParserBridge,
    history: TransactionHistory,
}

impl Document {
    pub fn new(service: Arc<dyn ParseService>, history: &HistoryConfig) -> Self {
        let buffer = DocumentBuffer::default();
        Self {
            parsed_revision: buffer.revision(),
            buffer,
            model: BlockModel::default(),
            bridge: ParserBridge::new(service),
            history: TransactionHistory::new(history),
        }
    }

    pub fn buffer(&self) -> &DocumentBuffer {
        &self.buffer
    }

    /// The block model as of the last completed parse. May trail the buffer
    /// while [`Self::is_parse_pending`].
    pub fn model(&self) -> &BlockModel {
        &self.model
    }

    pub fn history(&self) -> &TransactionHistory {
        &self.history
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn is_parse_pending(&self) -> bool {
        self.parsed_revision != self.buffer.revision()
    }

    /// Replace the whole buffer. Loading new content is not undoable and
    /// resets the history.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.history.clear();
    }

    /// Replace `from..to` with `text`, logging the edit before applying it.
    ///
    /// Returns `false` without touching anything when the range already
    /// holds `text`.
    pub fn edit(
        &mut self,
        from: usize,
        to: usize,
        text: &str,
        now: Instant,
    ) -> Result<bool, EngineError> {
        self.buffer.check_range(from, to)?;
        let deleted = self.buffer.slice(from, to).into_owned();
        if deleted == text {
            return Ok(false);
        }

        let tx = Transaction::new(from, deleted, text, now);
        self.history.push(tx.clone());
        tx.apply(&mut self.buffer)?;
        Ok(true)
    }

    /// Swap in a whole new text as one minimal logged edit.
    pub fn rewrite(&mut self, text: &str, now: Instant) -> Result<bool, EngineError> {
        let Some(tx) = Transaction::diff(&self.buffer.text(), text, now) else {
            return Ok(false);
        };
        self.history.push(tx.clone());
        tx.apply(&mut self.buffer)?;
        Ok(true)
    }

    /// Undo the latest batch. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EngineError> {
        match self.history.undo() {
            Some(batch) => self.apply_batch(&batch).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> Result<bool, EngineError> {
        match self.history.redo() {
            Some(batch) => self.apply_batch(&batch).map(|()| true),
            None => Ok(false),
        }
    }

    /// Apply a batch from history without logging it again. The model is
    /// left pending so the caller reparses once for the whole batch.
    fn apply_batch(&mut self, batch: &[Transaction]) -> Result<(), EngineError> {
        for tx in batch {
            tx.apply(&mut self.buffer)?;
        }
        Ok(())
    }

    /// Re-derive the model from the current buffer.
    ///
    /// The result is installed only if the buffer is still at the revision
    /// the parse started from.
    pub async fn reparse(&mut self) {
        let revision = self.buffer.revision();
        let text = self.buffer.text();
        let model = self.bridge.parse(&text, &self.model).await;

        if self.buffer.revision() == revision {
            self.model = model;
            self.parsed_revision = revision;
        } else {
            log::debug!(
                "discarding parse of revision {revision}, buffer is at {}",
                self.buffer.revision()
            );
        }
    }

    /// Reparse if the model trails the buffer. Returns whether a parse ran.
    pub async fn ensure_parsed(&mut self) -> bool {
        if !self.is_parse_pending() {
            return false;
        }
        self.reparse().await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockKind;
    use crate::parsing::MarkdownParseService;

    fn document() -> Document {
        Document::new(
            Arc::new(MarkdownParseService::default()),
            &HistoryConfig {
                batch_window_ms: 0,
                max_batches: 500,
            },
        )
    }

    #[test]
    fn new_document_has_placeholder_and_nothing_pending() {
        let doc = document();
        assert!(!doc.is_parse_pending());
        assert_eq!(doc.model().len(), 1);
        assert_eq!(doc.text(), "");
    }

    #[tokio::test]
    async fn mutations_mark_the_model_pending_until_reparsed() {
        let mut doc = document();
        doc.set_text("# Title");
        assert!(doc.is_parse_pending());
        assert_eq!(doc.model().blocks()[0].kind, BlockKind::Paragraph);

        assert!(doc.ensure_parsed().await);
        assert!(!doc.is_parse_pending());
        assert_eq!(doc.model().blocks()[0].kind, BlockKind::Heading);
        assert!(!doc.ensure_parsed().await);
    }

    #[tokio::test]
    async fn edits_are_logged_and_undoable() {
        let mut doc = document();
        doc.set_text("Hello");
        let now = Instant::now();

        assert!(doc.edit(5, 5, "!", now).unwrap());
        assert_eq!(doc.text(), "Hello!");
        assert!(doc.history().can_undo());

        assert!(doc.undo().unwrap());
        assert_eq!(doc.text(), "Hello");
        assert!(doc.redo().unwrap());
        assert_eq!(doc.text(), "Hello!");
    }

    #[test]
    fn identical_edit_is_not_logged() {
        let mut doc = document();
        doc.set_text("abc");
        assert!(!doc.edit(0, 3, "abc", Instant::now()).unwrap());
        assert!(!doc.history().can_undo());
    }

    #[test]
    fn out_of_range_edit_is_rejected_before_logging() {
        let mut doc = document();
        doc.set_text("abc");
        let err = doc.edit(2, 9, "x", Instant::now()).unwrap_err();

        assert_eq!(err, EngineError::OffsetOutOfBounds { from: 2, to: 9, len: 3 });
        assert!(!doc.history().can_undo());
    }

    #[test]
    fn rewrite_logs_a_minimal_edit() {
        let mut doc = document();
        doc.set_text("A\n\nB");
        assert!(doc.rewrite("B\n\nA", Instant::now()).unwrap());
        assert!(!doc.rewrite("B\n\nA", Instant::now()).unwrap());

        doc.undo().unwrap();
        assert_eq!(doc.text(), "A\n\nB");
    }
}
