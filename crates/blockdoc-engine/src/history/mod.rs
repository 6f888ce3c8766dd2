//! # Transaction History
//!
//! Undo/redo over [`Transaction`]s grouped into time-windowed batches.
//!
//! A push within `batch_window` of the previous push joins the open batch,
//! so rapid typing undoes as one unit. Any other push seals the open batch
//! onto the undo stack first. Every push clears the redo stack.
//!
//! The undo stack is bounded; the oldest batches fall off the front.

pub mod transaction;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use blockdoc_config::HistoryConfig;

pub use transaction::{Transaction, TransactionKind};

#[derive(Debug, Clone)]
pub struct TransactionHistory {
    undo: VecDeque<Vec<Transaction>>,
    redo: Vec<Vec<Transaction>>,
    open: Vec<Transaction>,
    last_push: Option<Instant>,
    batch_window: Duration,
    max_batches: usize,
}

impl Default for TransactionHistory {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl TransactionHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            open: Vec::new(),
            last_push: None,
            batch_window: config.batch_window(),
            max_batches: config.max_batches.max(1),
        }
    }

    pub fn push(&mut self, tx: Transaction) {
        if tx.is_noop() {
            return;
        }

        let within_window = self
            .last_push
            .is_some_and(|last| tx.timestamp.saturating_duration_since(last) < self.batch_window);
        if !within_window {
            self.seal();
        }

        self.last_push = Some(tx.timestamp);
        self.open.push(tx);
        self.redo.clear();
    }

    /// Close the open batch, if any.
    pub fn seal(&mut self) {
        if self.open.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.open);
        self.push_undo(batch);
    }

    /// Transactions that undo the most recent batch, in the order they must
    /// be applied.
    pub fn undo(&mut self) -> Option<Vec<Transaction>> {
        self.seal();
        let batch = self.undo.pop_back()?;
        let inverse = batch.iter().rev().map(Transaction::invert).collect();
        self.redo.push(batch);
        self.last_push = None;
        Some(inverse)
    }

    /// The most recently undone batch, in its original order.
    pub fn redo(&mut self) -> Option<Vec<Transaction>> {
        self.seal();
        let batch = self.redo.pop()?;
        self.push_undo(batch.clone());
        self.last_push = None;
        Some(batch)
    }

    pub fn can_undo(&self) -> bool {
        !self.open.is_empty() || !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of batches `undo` can still pop, counting the open one.
    pub fn undo_depth(&self) -> usize {
        self.undo.len() + usize::from(!self.open.is_empty())
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.open.clear();
        self.last_push = None;
    }

    fn push_undo(&mut self, batch: Vec<Transaction>) {
        self.undo.push_back(batch);
        while self.undo.len() > self.max_batches {
            self.undo.pop_front();
            log::debug!("undo history full, dropped oldest batch");
        }
    }
}
