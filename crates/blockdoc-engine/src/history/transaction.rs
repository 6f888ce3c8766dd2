use std::time::Instant;

use crate::buffer::DocumentBuffer;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Insert,
    Delete,
    Replace,
}

/// One reversible edit against the buffer.
///
/// Applying a transaction replaces `offset..offset + deleted.len()` with
/// `inserted`. The text on both sides is stored, so the inverse is just the
/// two swapped.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub offset: usize,
    pub inserted: String,
    pub deleted: String,
    pub timestamp: Instant,
}

impl Transaction {
    pub fn new(
        offset: usize,
        deleted: impl Into<String>,
        inserted: impl Into<String>,
        timestamp: Instant,
    ) -> Self {
        let deleted = deleted.into();
        let inserted = inserted.into();
        let kind = match (deleted.is_empty(), inserted.is_empty()) {
            (true, _) => TransactionKind::Insert,
            (false, true) => TransactionKind::Delete,
            (false, false) => TransactionKind::Replace,
        };
        Self {
            kind,
            offset,
            inserted,
            deleted,
            timestamp,
        }
    }

    pub fn insert(offset: usize, text: impl Into<String>, timestamp: Instant) -> Self {
        Self::new(offset, String::new(), text, timestamp)
    }

    pub fn delete(offset: usize, text: impl Into<String>, timestamp: Instant) -> Self {
        Self::new(offset, text, String::new(), timestamp)
    }

    /// Smallest transaction turning `old` into `new`, or `None` if they are
    /// equal. Common prefix and suffix are left out.
    pub fn diff(old: &str, new: &str, timestamp: Instant) -> Option<Self> {
        if old == new {
            return None;
        }

        let prefix = common_prefix(old, new);
        let suffix = common_suffix(&old[prefix..], &new[prefix..]);

        Some(Self::new(
            prefix,
            &old[prefix..old.len() - suffix],
            &new[prefix..new.len() - suffix],
            timestamp,
        ))
    }

    /// The transaction that undoes this one.
    pub fn invert(&self) -> Self {
        Self::new(
            self.offset,
            self.inserted.clone(),
            self.deleted.clone(),
            self.timestamp,
        )
    }

    pub fn is_noop(&self) -> bool {
        self.inserted == self.deleted
    }

    pub fn apply(&self, buffer: &mut DocumentBuffer) -> Result<(), EngineError> {
        buffer.replace(self.offset, self.offset + self.deleted.len(), &self.inserted)
    }
}

/// Length in bytes of the longest common prefix, on a char boundary.
fn common_prefix(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((idx, _), _)| idx)
        .unwrap_or_else(|| a.len().min(b.len()))
}

/// Length in bytes of the longest common suffix, on a char boundary.
fn common_suffix(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(ca, cb)| ca == cb)
        .map(|(c, _)| c.len_utf8())
        .sum()
}
