//! Block openers recognized by the fallback splitter. Each kind owns the
//! syntax knowledge for its delimiters.

pub mod block_quote;
pub mod code_fence;
pub mod heading;
pub mod list;
pub mod math;
pub mod thematic_break;

pub use block_quote::BlockQuote;
pub use code_fence::{CodeFence, FenceKind, FenceOpen};
pub use heading::Heading;
pub use list::{ListMarker, ListOpen};
pub use math::MathFence;
pub use thematic_break::ThematicBreak;
