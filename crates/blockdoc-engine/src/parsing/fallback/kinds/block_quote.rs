use std::sync::LazyLock;

use regex::Regex;

static CALLOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}>[ \t]*\[!([A-Za-z0-9_-]+)\]").expect("callout pattern is valid")
});

/// Blockquote block type with owned delimiter constant.
pub struct BlockQuote;

impl BlockQuote {
    /// The blockquote prefix character.
    pub const PREFIX: char = '>';

    /// Whether the line opens or continues a quote: up to three spaces, then `>`.
    pub fn is_quote_line(line: &str) -> bool {
        let (depth, _) = Self::strip_prefixes(line);
        depth > 0 && line.len() - line.trim_start_matches(' ').len() <= 3
    }

    /// Strips blockquote prefixes from a line, returning (depth, byte_offset).
    ///
    /// Handles various forms: `> text`, `>> nested`, `> > spaced nested`.
    pub fn strip_prefixes(s: &str) -> (u8, usize) {
        let b = s.as_bytes();
        let mut i = 0usize;
        let mut depth = 0u8;

        loop {
            while i < b.len() && b[i] == b' ' {
                i += 1;
            }
            if i < b.len() && b[i] == (Self::PREFIX as u8) {
                depth = depth.saturating_add(1);
                i += 1;
                if i < b.len() && b[i] == b' ' {
                    i += 1;
                }
            } else {
                break;
            }
        }
        (depth, i)
    }

    /// `> [!warning] Title` yields `Some("warning")`. Kinds are lowercased.
    pub fn callout_kind(first_line: &str) -> Option<String> {
        CALLOUT
            .captures(first_line)
            .map(|caps| caps[1].to_ascii_lowercase())
    }
}
