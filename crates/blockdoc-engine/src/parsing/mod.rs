//! # Parser Bridge
//!
//! Re-derives the block model from the full buffer text on every structural
//! mutation. There is no incremental contract: the whole text goes to the
//! [`ParseService`] and the answer replaces the model.
//!
//! - **`service`**: the service contract and the default pulldown-cmark service
//! - **`fallback`**: local line splitter used when the service fails
//! - **`bridge`**: validation, fallback and id assignment

pub mod bridge;
pub mod fallback;
pub mod service;

pub use bridge::ParserBridge;
pub use service::{
    BlockDescriptor, LineSplitterService, MarkdownParseService, ParseService, ParseServiceError,
};
