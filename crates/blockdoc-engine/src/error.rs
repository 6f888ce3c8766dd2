/// Errors returned to callers of the engine.
///
/// Parse failures never appear here: the parser bridge recovers from them
/// locally. These variants describe requests the engine refuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("document is read-only")]
    ReadOnly,
    #[error("range {from}..{to} is outside the buffer (len {len})")]
    OffsetOutOfBounds { from: usize, to: usize, len: usize },
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
    #[error("unknown block: {0}")]
    UnknownBlock(String),
    #[error("no block is focused")]
    NothingFocused,
}
