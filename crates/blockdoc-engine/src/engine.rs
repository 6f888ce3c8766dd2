//! The public surface a host application drives.
//!
//! Mutating operations are `async` and take `&mut self`: the borrow checker
//! is what keeps two edits from interleaving around a pending parse. Reads
//! are synchronous and never wait on parsing.

use std::sync::Arc;
use std::time::Instant;

use blockdoc_config::EngineConfig;

use crate::autosave::Debouncer;
use crate::buffer::Span;
use crate::document::Document;
use crate::editing::{ActiveEdit, EditingController};
use crate::error::EngineError;
use crate::invariants::{self, InvariantViolation};
use crate::model::{Block, BlockId, BlockModel};
use crate::parsing::{MarkdownParseService, ParseService};
use crate::render;
use crate::reorder::{self, Placement};
use crate::viewport::{VirtualViewport, VisibleRange, VisibleWindow};

/// Receives the full document text.
pub type Listener = Box<dyn FnMut(&str) + Send>;

pub struct Engine {
    document: Document,
    editor: EditingController,
    viewport: VirtualViewport,
    autosave: Debouncer,
    read_only: bool,
    change_listeners: Vec<Listener>,
    autosave_listeners: Vec<Listener>,
}

impl Engine {
    pub fn new(service: Arc<dyn ParseService>, config: &EngineConfig) -> Self {
        let document = Document::new(service, &config.history);
        let mut viewport = VirtualViewport::new(config.viewport.clone());
        viewport.layout(document.model().blocks());

        Self {
            document,
            editor: EditingController::new(),
            viewport,
            autosave: Debouncer::new(config.autosave.debounce()),
            read_only: false,
            change_listeners: Vec::new(),
            autosave_listeners: Vec::new(),
        }
    }

    /// Engine backed by the in-process pulldown-cmark parser.
    pub fn with_markdown_parser(config: &EngineConfig) -> Self {
        Self::new(Arc::new(MarkdownParseService::default()), config)
    }

    // ---- content ----

    /// Load `text`, replacing the buffer and resetting focus and history.
    /// Loading is not an edit: no change or autosave notification fires.
    pub async fn set_content(&mut self, text: &str) -> &BlockModel {
        self.editor.reset();
        self.document.set_text(text);
        self.settle().await;
        log::info!(
            "loaded {} bytes into {} blocks",
            text.len(),
            self.document.model().len()
        );
        self.document.model()
    }

    /// Current text, with any in-progress focused edit written in first.
    ///
    /// Focus is kept. The block model trails until the next async operation
    /// or [`Self::settle`].
    pub fn get_content(&mut self) -> String {
        if !self.read_only {
            let now = Instant::now();
            match self.editor.commit_in_place(&mut self.document, now) {
                Ok(true) => self.changed(now),
                Ok(false) => {}
                Err(err) => log::warn!("could not commit focused edit: {err}"),
            }
        }
        self.document.text()
    }

    /// Buffer text as it is, without committing the focused edit.
    pub fn content(&self) -> String {
        self.document.text()
    }

    pub fn slice(&self, from: usize, to: usize) -> String {
        self.document.buffer().slice(from, to).into_owned()
    }

    /// Bring the block model up to date with the buffer.
    pub async fn settle(&mut self) {
        if self.document.ensure_parsed().await {
            self.editor.resync(self.document.model());
            self.relayout();
        }
    }

    pub fn is_parse_pending(&self) -> bool {
        self.document.is_parse_pending()
    }

    // ---- buffer edits ----

    pub async fn insert_at(&mut self, offset: usize, text: &str) -> Result<(), EngineError> {
        self.edit_buffer(offset, offset, text).await
    }

    pub async fn delete_range(&mut self, from: usize, to: usize) -> Result<(), EngineError> {
        self.edit_buffer(from, to, "").await
    }

    pub async fn replace_range(
        &mut self,
        from: usize,
        to: usize,
        text: &str,
    ) -> Result<(), EngineError> {
        self.edit_buffer(from, to, text).await
    }

    /// Offsets address the buffer after any focused edit has been committed.
    async fn edit_buffer(&mut self, from: usize, to: usize, text: &str) -> Result<(), EngineError> {
        self.ensure_writable()?;
        let now = Instant::now();
        self.commit_focus(now).await?;

        if self.document.edit(from, to, text, now)? {
            self.reparse().await;
            self.changed(now);
        }
        Ok(())
    }

    // ---- focus ----

    /// Focus a block for raw editing. Returns `false` for unknown ids and
    /// while read-only.
    pub async fn focus_block(&mut self, id: &BlockId) -> Result<bool, EngineError> {
        if self.read_only {
            return Ok(false);
        }
        if self.editor.is_focused(id) {
            return Ok(true);
        }
        let now = Instant::now();
        self.commit_focus(now).await?;
        self.settle().await;
        self.editor.focus(&mut self.document, id, now).await
    }

    pub async fn focus_block_by_index(&mut self, index: usize) -> Result<bool, EngineError> {
        self.settle().await;
        let Some(id) = self.document.model().get(index).map(|b| b.id.clone()) else {
            log::debug!("focus requested for block index {index} past the end");
            return Ok(false);
        };
        self.focus_block(&id).await
    }

    /// Commit and leave raw-edit mode. Returns whether the buffer changed.
    pub async fn blur(&mut self) -> Result<bool, EngineError> {
        self.commit_focus(Instant::now()).await
    }

    pub fn active_edit(&self) -> Option<&ActiveEdit> {
        self.editor.active()
    }

    pub fn is_focused(&self, id: &BlockId) -> bool {
        self.editor.is_focused(id)
    }

    /// Replace the raw text of the focused block. Nothing reaches the buffer
    /// until the block is committed.
    pub fn update_raw(&mut self, raw: impl Into<String>, cursor: usize) -> Result<(), EngineError> {
        self.ensure_writable()?;
        self.editor.update_raw(raw.into(), cursor)
    }

    pub fn set_cursor(&mut self, cursor: usize) -> Result<(), EngineError> {
        self.editor.set_cursor(cursor)
    }

    /// Enter in the focused block: split, or a newline in code blocks.
    pub async fn press_enter(&mut self) -> Result<(), EngineError> {
        self.ensure_writable()?;
        self.settle().await;
        let now = Instant::now();
        let revision = self.document.buffer().revision();
        self.editor.enter(&mut self.document, now).await?;
        self.after_structural_edit(revision, now);
        Ok(())
    }

    /// Backspace in the focused block: delete a character, or merge into the
    /// previous block at offset 0.
    pub async fn press_backspace(&mut self) -> Result<(), EngineError> {
        self.ensure_writable()?;
        self.settle().await;
        let now = Instant::now();
        let revision = self.document.buffer().revision();
        self.editor.backspace(&mut self.document, now).await?;
        self.after_structural_edit(revision, now);
        Ok(())
    }

    // ---- history ----

    pub async fn undo(&mut self) -> Result<bool, EngineError> {
        self.ensure_writable()?;
        let now = Instant::now();
        self.commit_focus(now).await?;
        if !self.document.undo()? {
            return Ok(false);
        }
        self.reparse().await;
        self.changed(now);
        Ok(true)
    }

    pub async fn redo(&mut self) -> Result<bool, EngineError> {
        self.ensure_writable()?;
        let now = Instant::now();
        self.commit_focus(now).await?;
        if !self.document.redo()? {
            return Ok(false);
        }
        self.reparse().await;
        self.changed(now);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.document.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.document.history().can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.document.history().undo_depth()
    }

    // ---- reorder ----

    /// Move `source` before or after `target`. Focus is cleared; block ids
    /// are not guaranteed to survive the move.
    pub async fn move_block(
        &mut self,
        source: &BlockId,
        target: &BlockId,
        placement: Placement,
    ) -> Result<(), EngineError> {
        self.ensure_writable()?;
        let now = Instant::now();
        self.commit_focus(now).await?;
        self.settle().await;

        let source_span = self.span_of(source)?;
        let target_span = self.span_of(target)?;
        if source_span == target_span {
            return Ok(());
        }

        let text = self.document.text();
        let moved = reorder::move_block(&text, source_span, target_span, placement)?;
        if self.document.rewrite(&moved, now)? {
            log::debug!("moved {source} {placement:?} {target}");
            self.reparse().await;
            self.changed(now);
        }
        Ok(())
    }

    fn span_of(&self, id: &BlockId) -> Result<Span, EngineError> {
        self.document
            .model()
            .find(id)
            .map(|b| b.span)
            .ok_or_else(|| EngineError::UnknownBlock(id.to_string()))
    }

    // ---- model reads ----

    pub fn model(&self) -> &BlockModel {
        self.document.model()
    }

    pub fn blocks(&self) -> &[Block] {
        self.document.model().blocks()
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.document.model().find(id)
    }

    pub fn block_at(&self, offset: usize) -> Option<&Block> {
        self.document.model().block_at(offset)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        invariants::check(&self.document.text(), self.document.model())
    }

    // ---- viewport ----

    pub fn viewport(&self) -> &VirtualViewport {
        &self.viewport
    }

    pub fn set_measured_height(&mut self, id: &BlockId, height: f64) -> bool {
        self.viewport.set_measured_height(id, height)
    }

    /// Top offset of the block, for the host to scroll to.
    pub fn scroll_to_block(&self, id: &BlockId) -> Option<f64> {
        self.viewport.position_of(id).map(|p| p.top)
    }

    pub fn visible_range(&self, scroll_top: f64, viewport_height: f64) -> VisibleRange<'_> {
        self.viewport.visible_range(scroll_top, viewport_height)
    }

    pub fn visible_window(&self, scroll_top: f64, viewport_height: f64) -> VisibleWindow {
        self.viewport.visible_window(scroll_top, viewport_height)
    }

    pub fn total_height(&self) -> f64 {
        self.viewport.total_height()
    }

    // ---- rendering ----

    pub fn render_block(&self, id: &BlockId) -> Option<String> {
        self.block(id).map(render::render)
    }

    pub fn render_document(&self) -> String {
        render::render_all(self.blocks())
    }

    // ---- read-only and notifications ----

    /// Entering read-only commits and drops any focused edit, then settles
    /// the model so reads reflect the committed text.
    pub async fn set_read_only(&mut self, read_only: bool) {
        if read_only && !self.read_only {
            if let Err(err) = self.commit_focus(Instant::now()).await {
                log::warn!("could not commit focused edit: {err}");
            }
            self.settle().await;
        }
        self.read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Called with the full text after every committed mutation.
    pub fn on_change(&mut self, listener: impl FnMut(&str) + Send + 'static) {
        self.change_listeners.push(Box::new(listener));
    }

    /// Called with the full text once changes have been quiet for the
    /// autosave debounce. Driven by [`Self::tick`].
    pub fn on_autosave(&mut self, listener: impl FnMut(&str) + Send + 'static) {
        self.autosave_listeners.push(Box::new(listener));
    }

    /// Advance the autosave timer. Returns whether autosave fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.autosave.poll(now) {
            return false;
        }
        let text = self.document.text();
        log::debug!("autosave ({} bytes)", text.len());
        for listener in &mut self.autosave_listeners {
            listener(&text);
        }
        true
    }

    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    // ---- internals ----

    fn ensure_writable(&self) -> Result<(), EngineError> {
        if self.read_only {
            return Err(EngineError::ReadOnly);
        }
        Ok(())
    }

    /// Blur, committing the focused edit, and announce it if it changed
    /// the buffer.
    async fn commit_focus(&mut self, now: Instant) -> Result<bool, EngineError> {
        let committed = self.editor.blur(&mut self.document, now).await?;
        if committed {
            self.relayout();
            self.changed(now);
        }
        Ok(committed)
    }

    async fn reparse(&mut self) {
        self.document.reparse().await;
        self.relayout();
    }

    fn after_structural_edit(&mut self, revision: u64, now: Instant) {
        if self.document.buffer().revision() != revision {
            self.relayout();
            self.changed(now);
        }
    }

    fn relayout(&mut self) {
        self.viewport.layout(self.document.model().blocks());
    }

    fn changed(&mut self, now: Instant) {
        self.autosave.touch(now);
        if self.change_listeners.is_empty() {
            return;
        }
        let text = self.document.text();
        for listener in &mut self.change_listeners {
            listener(&text);
        }
    }
}
