//! # Block rendering
//!
//! `render(block) -> markup`, dispatched by [`BlockKind`] through an
//! exhaustive match. This is the only place with per-type behavior; the rest
//! of the engine is type-agnostic. Service tags outside the closed set were
//! already mapped to paragraphs when the model was built, so they render as
//! plain paragraph text.
//!
//! Inline markdown is not interpreted; text is escaped and emitted as is.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::model::{Block, BlockKind, ColumnAlignment};
use crate::parsing::fallback::kinds::{BlockQuote, CodeFence, Heading, MathFence};

pub type Renderer = fn(&Block) -> String;

pub fn renderer_for(kind: BlockKind) -> Renderer {
    match kind {
        BlockKind::Heading => render_heading,
        BlockKind::Paragraph => render_paragraph,
        BlockKind::CodeBlock => render_code_block,
        BlockKind::Blockquote => render_blockquote,
        BlockKind::Callout => render_callout,
        BlockKind::List => render_list,
        BlockKind::Table => render_table,
        BlockKind::ThematicBreak => render_thematic_break,
        BlockKind::Frontmatter => render_frontmatter,
        BlockKind::MathBlock => render_math,
        BlockKind::Html => render_html,
    }
}

pub fn render(block: &Block) -> String {
    renderer_for(block.kind)(block)
}

/// Render every block in order, one per line.
pub fn render_all<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> String {
    blocks.into_iter().map(render).collect::<Vec<_>>().join("\n")
}

fn render_heading(block: &Block) -> String {
    let level = block
        .meta
        .level
        .or_else(|| Heading::level(&block.content))
        .unwrap_or(1)
        .clamp(1, 6);
    let text = block
        .content
        .trim_start_matches(Heading::MARKER)
        .trim()
        .trim_end_matches(Heading::MARKER)
        .trim_end();
    format!("<h{level}>{}</h{level}>", encode_text(text))
}

fn render_paragraph(block: &Block) -> String {
    format!("<p>{}</p>", encode_text(&block.content))
}

fn render_code_block(block: &Block) -> String {
    let lines: Vec<&str> = block.content.lines().collect();
    let fence = lines.first().and_then(|first| CodeFence::open(first));
    let body = match fence {
        Some(open) => {
            let rest = &lines[1..];
            let rest = match rest.split_last() {
                Some((last, inner)) if CodeFence::closes(&open, last) => inner,
                _ => rest,
            };
            rest.join("\n")
        }
        None => lines
            .iter()
            .map(|l| strip_indent(l, 4))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    match &block.meta.language {
        Some(lang) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            encode_double_quoted_attribute(lang),
            encode_text(&body)
        ),
        None => format!("<pre><code>{}</code></pre>", encode_text(&body)),
    }
}

fn render_blockquote(block: &Block) -> String {
    format!(
        "<blockquote><p>{}</p></blockquote>",
        encode_text(&unquote(&block.content))
    )
}

fn render_callout(block: &Block) -> String {
    let text = unquote(&block.content);
    let (first, body) = text.split_once('\n').unwrap_or((text.as_str(), ""));
    let title = first
        .split_once(']')
        .map(|(_, title)| title.trim())
        .unwrap_or_default();
    let kind = block.meta.callout.as_deref().unwrap_or("note");
    let title = if title.is_empty() { kind } else { title };

    format!(
        "<div class=\"callout callout-{}\"><div class=\"callout-title\">{}</div><div class=\"callout-body\">{}</div></div>",
        encode_double_quoted_attribute(kind),
        encode_text(title),
        encode_text(body)
    )
}

fn render_list(block: &Block) -> String {
    let mut items: Vec<String> = Vec::new();
    for line in block.content.lines() {
        match strip_list_marker(line) {
            Some(text) => items.push(text.to_string()),
            None => match items.last_mut() {
                Some(item) => {
                    item.push('\n');
                    item.push_str(line.trim());
                }
                None => items.push(line.trim().to_string()),
            },
        }
    }

    let body: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", encode_text(item)))
        .collect();
    match (block.meta.ordered, block.meta.start) {
        (Some(true), Some(start)) if start != 1 => format!("<ol start=\"{start}\">{body}</ol>"),
        (Some(true), _) => format!("<ol>{body}</ol>"),
        _ => format!("<ul>{body}</ul>"),
    }
}

fn render_table(block: &Block) -> String {
    let mut rows = block.content.lines().map(table_cells);
    let Some(header) = rows.next() else {
        return String::from("<table></table>");
    };
    // Delimiter row
    rows.next();

    let cell = |tag: &str, idx: usize, text: &str| {
        let style = match block.meta.alignments.get(idx) {
            Some(ColumnAlignment::Left) => " style=\"text-align: left\"",
            Some(ColumnAlignment::Center) => " style=\"text-align: center\"",
            Some(ColumnAlignment::Right) => " style=\"text-align: right\"",
            Some(ColumnAlignment::None) | None => "",
        };
        format!("<{tag}{style}>{}</{tag}>", encode_text(text))
    };

    let head: String = header
        .iter()
        .enumerate()
        .map(|(i, text)| cell("th", i, text))
        .collect();
    let body: String = rows
        .map(|row| {
            let cells: String = row
                .iter()
                .enumerate()
                .map(|(i, text)| cell("td", i, text))
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();

    format!("<table><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table>")
}

fn render_thematic_break(_block: &Block) -> String {
    String::from("<hr />")
}

fn render_frontmatter(block: &Block) -> String {
    let inner: Vec<&str> = block
        .content
        .lines()
        .filter(|l| !matches!(l.trim_end(), "---" | "..."))
        .collect();
    format!(
        "<pre class=\"frontmatter\">{}</pre>",
        encode_text(&inner.join("\n"))
    )
}

fn render_math(block: &Block) -> String {
    let inner = block
        .content
        .trim()
        .trim_start_matches(MathFence::DELIMITER)
        .trim_end_matches(MathFence::DELIMITER)
        .trim();
    format!("<div class=\"math math-display\">{}</div>", encode_text(inner))
}

fn render_html(block: &Block) -> String {
    block.content.clone()
}

/// Quote body with `>` prefixes removed, one line per source line.
fn unquote(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            let (_, offset) = BlockQuote::strip_prefixes(line);
            &line[offset..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_indent(line: &str, max: usize) -> &str {
    let spaces = line.len() - line.trim_start_matches(' ').len();
    &line[spaces.min(max)..]
}

/// Item text after a `-`, `*`, `+`, `1.` or `1)` marker.
fn strip_list_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = match trimmed.strip_prefix(['-', '*', '+']) {
        Some(rest) => rest,
        None => {
            let digits = trimmed.len() - trimmed.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            if digits == 0 {
                return None;
            }
            trimmed[digits..].strip_prefix(['.', ')'])?
        }
    };
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix([' ', '\t']).map(str::trim_start)
}

fn table_cells(line: &str) -> Vec<String> {
    let row = line.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(|cell| cell.trim().to_string()).collect()
}
