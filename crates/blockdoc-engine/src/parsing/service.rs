//! The structural parsing service contract and the default markdown
//! implementation.
//!
//! A service receives the full buffer text and answers with an ordered list
//! of [`BlockDescriptor`]s covering it contiguously. It may live out of
//! process; the engine only relies on this trait.

use std::ops::Range;

use async_trait::async_trait;
use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag};
use serde::{Deserialize, Serialize};

use crate::buffer::{Span, lines_with_spans};
use crate::model::{BlockKind, BlockMeta, ColumnAlignment};
use crate::parsing::fallback::{self, kinds::BlockQuote};

/// One block as reported by a parsing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub from: usize,
    pub to: usize,
    /// Type tag; unknown tags become paragraphs.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub meta: BlockMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl BlockDescriptor {
    pub fn new(kind: BlockKind, span: Span) -> Self {
        Self {
            from: span.start,
            to: span.end,
            kind: kind.as_str().to_string(),
            content: None,
            meta: BlockMeta::default(),
            id: None,
        }
    }

    pub fn with_meta(mut self, meta: BlockMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn span(&self) -> Span {
        Span::new(self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseServiceError {
    #[error("parse service unavailable: {0}")]
    Unavailable(String),
    #[error("parse service timed out")]
    Timeout,
    #[error("parse service failed: {0}")]
    Failed(String),
    #[error("malformed parse response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ParseService: Send + Sync {
    /// Parse the full document text into ordered block descriptors.
    async fn parse(&self, text: &str) -> Result<Vec<BlockDescriptor>, ParseServiceError>;
}

/// Service that only runs the local line splitter. Useful when no real
/// parser is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineSplitterService;

#[async_trait]
impl ParseService for LineSplitterService {
    async fn parse(&self, text: &str) -> Result<Vec<BlockDescriptor>, ParseServiceError> {
        Ok(fallback::split(text))
    }
}

/// In-process CommonMark parser built on `pulldown-cmark`.
///
/// Reports top-level blocks only. Paragraphs are emitted one block per
/// source line so that every line of prose is individually focusable.
#[derive(Debug, Clone)]
pub struct MarkdownParseService {
    options: Options,
}

impl Default for MarkdownParseService {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        options.insert(Options::ENABLE_MATH);
        Self { options }
    }
}

#[async_trait]
impl ParseService for MarkdownParseService {
    async fn parse(&self, text: &str) -> Result<Vec<BlockDescriptor>, ParseServiceError> {
        Ok(self.parse_blocks(text))
    }
}

impl MarkdownParseService {
    pub fn parse_blocks(&self, text: &str) -> Vec<BlockDescriptor> {
        let mut out = Vec::new();
        let mut depth = 0usize;
        let mut top: Option<(BlockKind, BlockMeta, Range<usize>)> = None;

        for (event, range) in Parser::new_ext(text, self.options).into_offset_iter() {
            match event {
                Event::Start(tag) => {
                    if depth == 0 {
                        let (kind, meta) = classify_tag(&tag, &text[range.clone()]);
                        top = Some((kind, meta, range));
                    }
                    depth += 1;
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0
                        && let Some((kind, meta, range)) = top.take()
                    {
                        emit(&mut out, text, kind, meta, range);
                    }
                }
                Event::Rule if depth == 0 => {
                    emit(
                        &mut out,
                        text,
                        BlockKind::ThematicBreak,
                        BlockMeta::default(),
                        range,
                    );
                }
                _ => {}
            }
        }

        out
    }
}

fn classify_tag(tag: &Tag<'_>, source: &str) -> (BlockKind, BlockMeta) {
    let mut meta = BlockMeta::default();
    let kind = match tag {
        Tag::Heading { level, .. } => {
            meta.level = Some(*level as u8);
            BlockKind::Heading
        }
        Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
            meta.language = info.split_whitespace().next().map(str::to_string);
            BlockKind::CodeBlock
        }
        Tag::CodeBlock(CodeBlockKind::Indented) => BlockKind::CodeBlock,
        Tag::BlockQuote(_) => match BlockQuote::callout_kind(source) {
            Some(callout) => {
                meta.callout = Some(callout);
                BlockKind::Callout
            }
            None => BlockKind::Blockquote,
        },
        Tag::List(start) => {
            meta.ordered = Some(start.is_some());
            meta.start = *start;
            BlockKind::List
        }
        Tag::Table(alignments) => {
            meta.alignments = alignments
                .iter()
                .map(|a| match a {
                    Alignment::None => ColumnAlignment::None,
                    Alignment::Left => ColumnAlignment::Left,
                    Alignment::Center => ColumnAlignment::Center,
                    Alignment::Right => ColumnAlignment::Right,
                })
                .collect();
            BlockKind::Table
        }
        Tag::MetadataBlock(_) => BlockKind::Frontmatter,
        Tag::HtmlBlock => BlockKind::Html,
        Tag::Paragraph if is_display_math(source) => BlockKind::MathBlock,
        _ => BlockKind::Paragraph,
    };
    (kind, meta)
}

fn is_display_math(source: &str) -> bool {
    let t = source.trim();
    t.len() >= 4 && t.starts_with("$$") && t.ends_with("$$")
}

/// Push a block for `range`, widened to the start of its first line and
/// trimmed of trailing line breaks. Paragraphs are split per line.
fn emit(
    out: &mut Vec<BlockDescriptor>,
    text: &str,
    kind: BlockKind,
    meta: BlockMeta,
    range: Range<usize>,
) {
    let span = block_span(text, range);
    if kind != BlockKind::Paragraph {
        out.push(BlockDescriptor::new(kind, span).with_meta(meta));
        return;
    }

    for line in lines_with_spans(&text[span.range()]) {
        let content = line.content_span();
        if line.content().trim().is_empty() {
            continue;
        }
        out.push(BlockDescriptor::new(
            BlockKind::Paragraph,
            Span::new(span.start + content.start, span.start + content.end),
        ));
    }
}

fn block_span(text: &str, range: Range<usize>) -> Span {
    let start = line_start(text, range.start);
    let trimmed = text[start..range.end].trim_end_matches(['\r', '\n']);
    Span::new(start, start + trimmed.len())
}

/// Start of the line holding `offset` when only indentation precedes it.
/// pulldown-cmark ranges begin after that indentation.
fn line_start(text: &str, offset: usize) -> usize {
    let start = text[..offset].rfind(['\n', '\r']).map_or(0, |i| i + 1);
    if text[start..offset].chars().all(|c| c == ' ' || c == '\t') {
        start
    } else {
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds_and_text(text: &str) -> Vec<(String, String)> {
        MarkdownParseService::default()
            .parse_blocks(text)
            .into_iter()
            .map(|d| (d.kind.clone(), text[d.from..d.to].to_string()))
            .collect()
    }

    #[test]
    fn heading_paragraph_list() {
        let text = "# Title\n\nSome text\n\n- item1\n- item2";
        assert_eq!(
            kinds_and_text(text),
            vec![
                ("heading".to_string(), "# Title".to_string()),
                ("paragraph".to_string(), "Some text".to_string()),
                ("list".to_string(), "- item1\n- item2".to_string()),
            ]
        );
    }

    #[test]
    fn paragraph_lines_become_separate_blocks() {
        let text = "Hello\n world";
        assert_eq!(
            kinds_and_text(text),
            vec![
                ("paragraph".to_string(), "Hello".to_string()),
                ("paragraph".to_string(), " world".to_string()),
            ]
        );
    }

    #[test]
    fn leading_indentation_stays_inside_the_block() {
        let text = "# Title\n here\n\n  indented para";
        let blocks = MarkdownParseService::default().parse_blocks(text);

        assert_eq!(
            kinds_and_text(text),
            vec![
                ("heading".to_string(), "# Title".to_string()),
                ("paragraph".to_string(), " here".to_string()),
                ("paragraph".to_string(), "  indented para".to_string()),
            ]
        );
        assert_eq!(blocks[1].span(), Span::new(8, 13));
    }

    #[test]
    fn code_fence_keeps_language_and_excludes_trailing_newline() {
        let text = "```rust\nfn main() {}\n```\n\nafter";
        let blocks = MarkdownParseService::default().parse_blocks(text);

        assert_eq!(blocks[0].kind, "code_block");
        assert_eq!(blocks[0].meta.language.as_deref(), Some("rust"));
        assert_eq!(&text[blocks[0].from..blocks[0].to], "```rust\nfn main() {}\n```");
        assert_eq!(blocks[1].kind, "paragraph");
    }

    #[test]
    fn callout_and_plain_quote() {
        let text = "> [!TIP] Try this\n> body\n\n> plain quote";
        let blocks = MarkdownParseService::default().parse_blocks(text);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, "callout");
        assert_eq!(blocks[0].meta.callout.as_deref(), Some("tip"));
        assert_eq!(blocks[1].kind, "blockquote");
    }

    #[test]
    fn heading_levels_ordered_lists_and_rules() {
        let text = "### Three\n\n3. c\n4. d\n\n---\n\ntext";
        let blocks = MarkdownParseService::default().parse_blocks(text);

        assert_eq!(blocks[0].meta.level, Some(3));
        assert_eq!(blocks[1].kind, "list");
        assert_eq!(blocks[1].meta.ordered, Some(true));
        assert_eq!(blocks[1].meta.start, Some(3));
        assert_eq!(blocks[2].kind, "thematic_break");
        assert_eq!(&text[blocks[2].from..blocks[2].to], "---");
    }

    #[test]
    fn table_alignments() {
        let text = "| a | b |\n|:--|--:|\n| 1 | 2 |";
        let blocks = MarkdownParseService::default().parse_blocks(text);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, "table");
        assert_eq!(
            blocks[0].meta.alignments,
            vec![ColumnAlignment::Left, ColumnAlignment::Right]
        );
    }

    #[test]
    fn blocks_are_sorted_and_within_bounds() {
        let text = "# A\n\npara one\npara two\n\n> quote\n\n```\ncode\n```\n\n- x\n  - y\n";
        let blocks = MarkdownParseService::default().parse_blocks(text);

        let mut prev_end = 0;
        for b in &blocks {
            assert!(b.from >= prev_end, "{b:?} overlaps previous block");
            assert!(b.from <= b.to && b.to <= text.len());
            assert!(!text[b.from..b.to].ends_with('\n'));
            prev_end = b.to;
        }
    }

    #[test]
    fn empty_text_has_no_blocks() {
        assert!(MarkdownParseService::default().parse_blocks("").is_empty());
        assert!(MarkdownParseService::default().parse_blocks("\n\n").is_empty());
    }

    #[tokio::test]
    async fn line_splitter_service_never_fails() {
        let blocks = LineSplitterService.parse("# a\n\nb").await.unwrap();
        assert_eq!(blocks.len(), 2);
    }
}
