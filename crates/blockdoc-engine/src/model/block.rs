use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buffer::Span;

/// Stable handle for a block: focus, viewport heights and rendering diffs
/// are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub String);

impl BlockId {
    /// Id derived from where a block starts and what it is.
    pub fn derived(kind: BlockKind, from: usize) -> Self {
        Self(format!("{}-{}", kind.as_str(), from))
    }

    /// Freshly synthesized id, used when the derived one is already taken.
    pub fn fresh() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The closed set of block types. Adding a variant is a compile-time
/// checked change: every dispatch over it is an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading,
    Paragraph,
    CodeBlock,
    Blockquote,
    Callout,
    List,
    Table,
    ThematicBreak,
    Frontmatter,
    MathBlock,
    Html,
}

impl BlockKind {
    pub const ALL: [BlockKind; 11] = [
        BlockKind::Heading,
        BlockKind::Paragraph,
        BlockKind::CodeBlock,
        BlockKind::Blockquote,
        BlockKind::Callout,
        BlockKind::List,
        BlockKind::Table,
        BlockKind::ThematicBreak,
        BlockKind::Frontmatter,
        BlockKind::MathBlock,
        BlockKind::Html,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::CodeBlock => "code_block",
            BlockKind::Blockquote => "blockquote",
            BlockKind::Callout => "callout",
            BlockKind::List => "list",
            BlockKind::Table => "table",
            BlockKind::ThematicBreak => "thematic_break",
            BlockKind::Frontmatter => "frontmatter",
            BlockKind::MathBlock => "math_block",
            BlockKind::Html => "html",
        }
    }

    /// Map a service type tag onto the closed set. Unknown tags are
    /// paragraphs, which is also how they render.
    pub fn from_type_str(tag: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .unwrap_or(BlockKind::Paragraph)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column alignment of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAlignment {
    None,
    Left,
    Center,
    Right,
}

/// Structural annotations. Opaque to the engine; only renderers read them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockMeta {
    /// Heading level 1-6
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Code fence info string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Callout kind from `> [!kind]`, lowercased
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordered: Option<bool>,
    /// First number of an ordered list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alignments: Vec<ColumnAlignment>,
}

/// A semantic unit of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Half-open byte span into the buffer; excludes trailing line breaks.
    pub span: Span,
    /// Verbatim `buffer[span]` as of the parse that produced this block.
    pub content: String,
    pub meta: BlockMeta,
}

impl Block {
    pub fn from(&self) -> usize {
        self.span.start
    }

    pub fn to(&self) -> usize {
        self.span.end
    }

    /// The empty paragraph that stands in for a document with no blocks.
    pub fn placeholder() -> Self {
        Self {
            id: BlockId::derived(BlockKind::Paragraph, 0),
            kind: BlockKind::Paragraph,
            span: Span::new(0, 0),
            content: String::new(),
            meta: BlockMeta::default(),
        }
    }
}
