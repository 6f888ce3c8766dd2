/// `---`, `***` or `___` (three or more, spaces allowed between).
pub struct ThematicBreak;

impl ThematicBreak {
    pub fn matches(line: &str) -> bool {
        let trimmed = line.trim_start_matches(' ');
        if line.len() - trimmed.len() > 3 {
            return false;
        }
        let trimmed = trimmed.trim_end();
        let Some(marker) = trimmed.chars().next() else {
            return false;
        };
        if !matches!(marker, '-' | '*' | '_') {
            return false;
        }
        let mut count = 0;
        for c in trimmed.chars() {
            if c == marker {
                count += 1;
            } else if c != ' ' && c != '\t' {
                return false;
            }
        }
        count >= 3
    }
}
