use std::sync::LazyLock;

use regex::Regex;

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(?:([-*+])|(\d{1,9})[.)])(?:[ \t]+|$)").expect("list pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOpen {
    pub ordered: bool,
    /// First number of an ordered list
    pub start: Option<u64>,
}

pub struct ListMarker;

impl ListMarker {
    pub fn parse(line: &str) -> Option<ListOpen> {
        let caps = LIST_ITEM.captures(line)?;
        if caps.get(1).is_some() {
            return Some(ListOpen {
                ordered: false,
                start: None,
            });
        }
        let start = caps.get(2).and_then(|m| m.as_str().parse().ok());
        Some(ListOpen {
            ordered: true,
            start,
        })
    }
}
