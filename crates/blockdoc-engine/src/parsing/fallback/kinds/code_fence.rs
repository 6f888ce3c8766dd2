use std::sync::LazyLock;

use regex::Regex;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(`{3,}|~{3,})[ \t]*([^ \t]*)").expect("fence pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

/// An opening fence line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceOpen {
    pub kind: FenceKind,
    /// Length of the marker run; the closer must be at least this long.
    pub len: usize,
    pub language: Option<String>,
}

pub struct CodeFence;

impl CodeFence {
    pub fn open(line: &str) -> Option<FenceOpen> {
        let caps = FENCE.captures(line)?;
        let marker = &caps[1];
        let kind = if marker.starts_with('`') {
            FenceKind::Backticks
        } else {
            FenceKind::Tildes
        };
        let info = &caps[2];
        // Backtick fences may not carry backticks in their info string.
        if kind == FenceKind::Backticks && info.contains('`') {
            return None;
        }
        Some(FenceOpen {
            kind,
            len: marker.len(),
            language: (!info.is_empty()).then(|| info.to_string()),
        })
    }

    /// A closer uses the same character, is at least as long as the opener
    /// and has nothing but whitespace after it.
    pub fn closes(open: &FenceOpen, line: &str) -> bool {
        let ch = match open.kind {
            FenceKind::Backticks => '`',
            FenceKind::Tildes => '~',
        };
        let indent = line.len() - line.trim_start_matches(' ').len();
        if indent > 3 {
            return false;
        }
        let rest = &line[indent..];
        let run = rest.len() - rest.trim_start_matches(ch).len();
        run >= open.len && rest[run..].trim().is_empty()
    }
}
