use std::time::Instant;

use crate::document::Document;
use crate::editing::ActiveEdit;
use crate::error::EngineError;
use crate::model::{BlockId, BlockKind, BlockModel};

/// Focus state machine for a document: at most one block is in raw-edit
/// mode at any time.
///
/// The controller never owns text beyond the single active surface. Every
/// write goes through [`Document::edit`] so it is logged before it lands.
/// Callers settle any pending parse before invoking the async operations;
/// they read block offsets from the model.
#[derive(Debug, Default)]
pub struct EditingController {
    active: Option<ActiveEdit>,
}

impl EditingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveEdit> {
        self.active.as_ref()
    }

    pub fn is_focused(&self, id: &BlockId) -> bool {
        self.active.as_ref().is_some_and(|a| &a.block_id == id)
    }

    /// Focus `id`, committing whatever was focused before.
    ///
    /// Returns `false` (and leaves nothing focused) when the id is unknown
    /// once the previous edit has been committed.
    pub async fn focus(
        &mut self,
        doc: &mut Document,
        id: &BlockId,
        now: Instant,
    ) -> Result<bool, EngineError> {
        if self.is_focused(id) {
            return Ok(true);
        }
        self.blur(doc, now).await?;

        let Some(block) = doc.model().find(id) else {
            log::debug!("focus requested for unknown block {id}");
            return Ok(false);
        };
        log::debug!("focus {id}");
        self.active = Some(ActiveEdit::new(block, block.content.len()));
        Ok(true)
    }

    /// Leave raw-edit mode, committing the surface if it changed.
    pub async fn blur(&mut self, doc: &mut Document, now: Instant) -> Result<bool, EngineError> {
        let Some(active) = self.active.take() else {
            return Ok(false);
        };
        if !active.is_dirty() {
            return Ok(false);
        }

        log::debug!("commit {} ({} bytes)", active.block_id, active.raw.len());
        doc.edit(active.span.start, active.span.end, &active.raw, now)?;
        doc.reparse().await;
        Ok(true)
    }

    /// Write the surface into the buffer without waiting for a parse. Focus
    /// stays put with its span resized to the committed text; the model is
    /// left pending.
    pub fn commit_in_place(&mut self, doc: &mut Document, now: Instant) -> Result<bool, EngineError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(false);
        };
        if !active.is_dirty() {
            return Ok(false);
        }

        doc.edit(active.span.start, active.span.end, &active.raw, now)?;
        active.mark_committed();
        Ok(true)
    }

    /// Drop the surface without committing.
    pub fn reset(&mut self) -> Option<ActiveEdit> {
        self.active.take()
    }

    /// Re-point the surface at the freshly parsed block that starts where it
    /// does. Used after a parse the controller did not trigger itself.
    pub fn resync(&mut self, model: &BlockModel) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if let Some(block) = model.block_starting_at(active.span.start) {
            active.block_id = block.id.clone();
            active.kind = block.kind;
        }
    }

    pub fn update_raw(&mut self, raw: String, cursor: usize) -> Result<(), EngineError> {
        self.active_mut()?.set_raw(raw, cursor)
    }

    pub fn set_cursor(&mut self, cursor: usize) -> Result<(), EngineError> {
        self.active_mut()?.set_cursor(cursor)
    }

    /// Enter: newline inside code blocks, a bare newline for an empty block,
    /// otherwise a split at the cursor.
    pub async fn enter(&mut self, doc: &mut Document, now: Instant) -> Result<(), EngineError> {
        let active = self.active_mut()?;
        if active.kind == BlockKind::CodeBlock {
            active.insert("\n");
            return Ok(());
        }
        if active.raw.is_empty() {
            let at = active.span.start;
            let span = active.span;
            doc.edit(span.start, span.end, "\n", now)?;
            doc.reparse().await;
            self.refocus(doc.model(), at, at);
            return Ok(());
        }
        self.split(doc, now).await
    }

    /// Replace the block with `before + "\n" + after` and focus the block
    /// that now starts after the newline, cursor at its start.
    ///
    /// With the cursor at the end the newline opens no block of its own, so
    /// focus stays at the end of the split block.
    pub async fn split(&mut self, doc: &mut Document, now: Instant) -> Result<(), EngineError> {
        let active = self.active_mut()?;
        let before = active.before_cursor();
        let after = active.after_cursor();
        let at_end = after.is_empty();
        let replacement = format!("{before}\n{after}");
        let boundary = active.span.start + before.len() + 1;
        let span = active.span;

        log::debug!("split {} at {}", active.block_id, active.cursor);
        doc.edit(span.start, span.end, &replacement, now)?;
        doc.reparse().await;
        if at_end {
            self.refocus(doc.model(), span.start, boundary - 1);
        } else {
            self.refocus(doc.model(), boundary, boundary);
        }
        Ok(())
    }

    /// Backspace: deletes inside the surface, merges into the predecessor at
    /// offset 0, does nothing at the start of the first block.
    pub async fn backspace(&mut self, doc: &mut Document, now: Instant) -> Result<(), EngineError> {
        let active = self.active_mut()?;
        if active.delete_backward() {
            return Ok(());
        }
        self.merge(doc, now).await
    }

    /// Merge the focused block into its predecessor. The separator between
    /// them is removed; the cursor lands on the old boundary.
    ///
    /// Returns without change when there is no predecessor.
    pub async fn merge(&mut self, doc: &mut Document, now: Instant) -> Result<(), EngineError> {
        let active = self.active.as_ref().ok_or(EngineError::NothingFocused)?;
        let model = doc.model();
        let index = model
            .index_of(&active.block_id)
            .or_else(|| model.iter().position(|b| b.from() == active.span.start));
        let Some(pred) = index
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| model.get(i))
        else {
            return Ok(());
        };

        let anchor = pred.from();
        let caret = anchor + pred.content.len();
        let merged = format!("{}{}", pred.content, active.raw);
        let end = active.span.end;

        log::debug!("merge {} into {}", active.block_id, pred.id);
        doc.edit(anchor, end, &merged, now)?;
        doc.reparse().await;
        self.refocus(doc.model(), anchor, caret);
        Ok(())
    }

    /// Focus the block starting at `anchor` if it reaches `caret`, else the
    /// block containing `caret`. Clears focus when neither exists.
    fn refocus(&mut self, model: &BlockModel, anchor: usize, caret: usize) -> bool {
        let target = model
            .block_starting_at(anchor)
            .filter(|b| b.span.contains_inclusive(caret))
            .or_else(|| model.block_at(caret));

        match target {
            Some(block) => {
                self.active = Some(ActiveEdit::new(block, caret - block.from()));
                true
            }
            None => {
                log::warn!("no block at offset {caret} after structural edit, clearing focus");
                self.active = None;
                false
            }
        }
    }

    fn active_mut(&mut self) -> Result<&mut ActiveEdit, EngineError> {
        self.active.as_mut().ok_or(EngineError::NothingFocused)
    }
}
