//! Block-based markdown document engine.
//!
//! A single text buffer is the source of truth. The block model is derived
//! from it by a (possibly remote) parsing service and replaced wholesale on
//! every structural change. Editing happens one block at a time through a
//! raw-text surface that is committed back into the buffer.
//!
//! ```no_run
//! # async fn demo() -> Result<(), blockdoc_engine::EngineError> {
//! use blockdoc_config::EngineConfig;
//! use blockdoc_engine::Engine;
//!
//! let mut engine = Engine::with_markdown_parser(&EngineConfig::default());
//! engine.set_content("# Title\n\nSome text").await;
//! engine.focus_block_by_index(1).await?;
//! engine.update_raw("Some text changed", 17)?;
//! engine.blur().await?;
//! assert_eq!(engine.get_content(), "# Title\n\nSome text changed");
//! # Ok(())
//! # }
//! ```

pub mod autosave;
pub mod buffer;
pub mod document;
pub mod editing;
pub mod engine;
pub mod error;
pub mod history;
pub mod invariants;
pub mod model;
pub mod parsing;
pub mod render;
pub mod reorder;
pub mod viewport;

pub use buffer::{DocumentBuffer, Span};
pub use editing::{ActiveEdit, EditingController};
pub use engine::{Engine, Listener};
pub use error::EngineError;
pub use history::{Transaction, TransactionHistory, TransactionKind};
pub use model::{Block, BlockId, BlockKind, BlockMeta, BlockModel, ColumnAlignment};
pub use parsing::{
    BlockDescriptor, LineSplitterService, MarkdownParseService, ParseService, ParseServiceError,
    ParserBridge,
};
pub use reorder::Placement;
pub use viewport::{ViewportPosition, VirtualViewport, VisibleRange, VisibleWindow};
