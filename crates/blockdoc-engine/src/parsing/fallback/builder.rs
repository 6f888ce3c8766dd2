use crate::buffer::Span;
use crate::model::{BlockKind, BlockMeta};
use crate::parsing::service::BlockDescriptor;

use super::classify::{LineClass, LineOpen};
use super::kinds::{CodeFence, FenceOpen, ListOpen, MathFence};

#[derive(Debug, Clone)]
enum LeafState {
    None,
    Paragraph {
        start: usize,
        end: usize,
    },
    Fence {
        open: FenceOpen,
        start: usize,
        end: usize,
    },
    Math {
        start: usize,
        end: usize,
    },
    Quote {
        start: usize,
        end: usize,
        callout: Option<String>,
    },
    List {
        start: usize,
        end: usize,
        list: ListOpen,
    },
}

/// Phase 2 of the fallback splitter: consumes classified lines and emits
/// block descriptors as blocks open and close.
pub struct BlockBuilder {
    leaf: LeafState,
    out: Vec<BlockDescriptor>,
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self {
            leaf: LeafState::None,
            out: vec![],
        }
    }

    pub fn push(&mut self, c: &LineClass) {
        if self.consume_raw_line(c) {
            return;
        }

        if c.is_blank {
            self.flush();
            return;
        }

        if self.continue_leaf(c) {
            return;
        }

        match &c.open {
            Some(open) => self.open_leaf(open, c.content),
            None => {
                self.leaf = LeafState::Paragraph {
                    start: c.content.start,
                    end: c.content.end,
                };
            }
        }
    }

    pub fn finish(mut self) -> Vec<BlockDescriptor> {
        // EOF flush; an unclosed fence runs to the end of the document.
        self.flush();
        self.out
    }

    /// Fences and math blocks are raw zones: no other opener applies inside.
    fn consume_raw_line(&mut self, c: &LineClass) -> bool {
        match &mut self.leaf {
            LeafState::Fence { open, start, end } => {
                if !c.is_blank {
                    *end = c.content.end;
                }
                if CodeFence::closes(open, &c.text) {
                    let meta = BlockMeta {
                        language: open.language.clone(),
                        ..BlockMeta::default()
                    };
                    let span = Span::new(*start, *end);
                    self.emit(BlockKind::CodeBlock, span, meta);
                    self.leaf = LeafState::None;
                }
                true
            }
            LeafState::Math { start, end } => {
                if !c.is_blank {
                    *end = c.content.end;
                }
                if MathFence::closes(&c.text) {
                    let span = Span::new(*start, *end);
                    self.emit(BlockKind::MathBlock, span, BlockMeta::default());
                    self.leaf = LeafState::None;
                }
                true
            }
            _ => false,
        }
    }

    /// Extend the open leaf with `c` if it belongs there; otherwise close the
    /// leaf and let the caller start a new one.
    fn continue_leaf(&mut self, c: &LineClass) -> bool {
        let continues = match &self.leaf {
            LeafState::Paragraph { .. } => c.open.is_none(),
            LeafState::Quote { .. } => matches!(c.open, Some(LineOpen::Quote { .. })),
            LeafState::List { .. } => {
                c.indented || matches!(c.open, Some(LineOpen::ListItem(_)))
            }
            _ => false,
        };

        if !continues {
            self.flush();
            return false;
        }

        match &mut self.leaf {
            LeafState::Paragraph { end, .. }
            | LeafState::Quote { end, .. }
            | LeafState::List { end, .. } => *end = c.content.end,
            _ => {}
        }
        true
    }

    fn open_leaf(&mut self, open: &LineOpen, line: Span) {
        match open {
            LineOpen::Heading { level } => {
                let meta = BlockMeta {
                    level: Some(*level),
                    ..BlockMeta::default()
                };
                self.emit(BlockKind::Heading, line, meta);
            }
            LineOpen::ThematicBreak => {
                self.emit(BlockKind::ThematicBreak, line, BlockMeta::default());
            }
            LineOpen::Math { closed: true } => {
                self.emit(BlockKind::MathBlock, line, BlockMeta::default());
            }
            LineOpen::Math { closed: false } => {
                self.leaf = LeafState::Math {
                    start: line.start,
                    end: line.end,
                };
            }
            LineOpen::Fence(fence) => {
                self.leaf = LeafState::Fence {
                    open: fence.clone(),
                    start: line.start,
                    end: line.end,
                };
            }
            LineOpen::Quote { callout } => {
                self.leaf = LeafState::Quote {
                    start: line.start,
                    end: line.end,
                    callout: callout.clone(),
                };
            }
            LineOpen::ListItem(list) => {
                self.leaf = LeafState::List {
                    start: line.start,
                    end: line.end,
                    list: *list,
                };
            }
        }
    }

    fn flush(&mut self) {
        let leaf = std::mem::replace(&mut self.leaf, LeafState::None);
        match leaf {
            LeafState::None => {}
            LeafState::Paragraph { start, end } => {
                self.emit(
                    BlockKind::Paragraph,
                    Span::new(start, end),
                    BlockMeta::default(),
                );
            }
            LeafState::Fence { open, start, end } => {
                let meta = BlockMeta {
                    language: open.language,
                    ..BlockMeta::default()
                };
                self.emit(BlockKind::CodeBlock, Span::new(start, end), meta);
            }
            LeafState::Math { start, end } => {
                self.emit(
                    BlockKind::MathBlock,
                    Span::new(start, end),
                    BlockMeta::default(),
                );
            }
            LeafState::Quote {
                start,
                end,
                callout,
            } => {
                let kind = if callout.is_some() {
                    BlockKind::Callout
                } else {
                    BlockKind::Blockquote
                };
                let meta = BlockMeta {
                    callout,
                    ..BlockMeta::default()
                };
                self.emit(kind, Span::new(start, end), meta);
            }
            LeafState::List { start, end, list } => {
                let meta = BlockMeta {
                    ordered: Some(list.ordered),
                    start: list.start,
                    ..BlockMeta::default()
                };
                self.emit(BlockKind::List, Span::new(start, end), meta);
            }
        }
    }

    fn emit(&mut self, kind: BlockKind, span: Span, meta: BlockMeta) {
        self.out.push(BlockDescriptor::new(kind, span).with_meta(meta));
    }
}
