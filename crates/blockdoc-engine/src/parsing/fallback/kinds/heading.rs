/// ATX heading: a run of one to six `#` followed by a space (or end of line).
pub struct Heading;

impl Heading {
    pub const MARKER: char = '#';
    pub const MAX_LEVEL: usize = 6;

    pub fn level(line: &str) -> Option<u8> {
        let run = line.len() - line.trim_start_matches(Self::MARKER).len();
        if run == 0 || run > Self::MAX_LEVEL {
            return None;
        }
        match line[run..].chars().next() {
            None | Some(' ') | Some('\t') => Some(run as u8),
            Some(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("# Title", Some(1))]
    #[case("### Deep", Some(3))]
    #[case("###### Six", Some(6))]
    #[case("#", Some(1))]
    #[case("####### Seven", None)]
    #[case("#hashtag", None)]
    #[case("plain", None)]
    fn heading_levels(#[case] line: &str, #[case] expected: Option<u8>) {
        assert_eq!(Heading::level(line), expected);
    }
}
