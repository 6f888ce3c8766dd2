//! # Local fallback splitter
//!
//! A conservative, line-oriented block splitter used when the parsing
//! service fails. Two phases, as in a container-stack block parser:
//!
//! 1. **Line classification** (`classify`): each line gets local facts
//!    (blank, indented, which block it could open).
//! 2. **Block construction** (`builder`): a small state machine extends or
//!    closes the current block and emits descriptors.
//!
//! Recognized: ATX headings, fenced code (matching fence markers), `$$`
//! math, blockquotes and `[!kind]` callouts, thematic breaks, lists and a
//! leading `---` frontmatter block. Every other run of non-blank lines is a
//! paragraph. The splitter never fails.

pub mod builder;
pub mod classify;
pub mod kinds;

use crate::buffer::{LineRef, Span, lines_with_spans};
use crate::model::BlockKind;
use crate::parsing::service::BlockDescriptor;

pub use builder::BlockBuilder;
pub use classify::{LineClass, LineClassifier, LineOpen};

/// Split `text` into block descriptors.
pub fn split(text: &str) -> Vec<BlockDescriptor> {
    let lines: Vec<LineRef> = lines_with_spans(text).collect();
    let mut builder = BlockBuilder::new();
    let mut out = Vec::new();

    let body = match frontmatter_end(&lines) {
        Some(closer) => {
            out.push(BlockDescriptor::new(
                BlockKind::Frontmatter,
                Span::new(0, lines[closer].content_span().end),
            ));
            &lines[closer + 1..]
        }
        None => &lines[..],
    };

    let classifier = LineClassifier;
    for line in body {
        builder.push(&classifier.classify(line));
    }

    out.extend(builder.finish());
    out
}

/// Index of the closing line of a `---` frontmatter block at the very top.
fn frontmatter_end(lines: &[LineRef]) -> Option<usize> {
    let first = lines.first()?;
    if first.content() != "---" {
        return None;
    }
    lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| matches!(line.content().trim_end(), "---" | "..."))
        .map(|(idx, _)| idx)
}

/// Human-readable dump of descriptors, one per line.
#[cfg(test)]
pub(crate) fn format_blocks(text: &str, blocks: &[BlockDescriptor]) -> String {
    blocks
        .iter()
        .map(|b| format!("{} [{}..{}] {:?}", b.kind, b.from, b.to, &text[b.from..b.to]))
        .collect::<Vec<_>>()
        .join("\n")
}
