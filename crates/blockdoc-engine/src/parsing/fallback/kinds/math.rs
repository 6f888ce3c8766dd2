/// `$$` display-math fences.
pub struct MathFence;

impl MathFence {
    pub const DELIMITER: &'static str = "$$";

    pub fn opens(line: &str) -> bool {
        line.trim_start().starts_with(Self::DELIMITER)
    }

    /// True when the opening line also closes the block (`$$ x $$`).
    pub fn closed_on_open(line: &str) -> bool {
        let t = line.trim();
        t.len() >= 2 * Self::DELIMITER.len() && t.ends_with(Self::DELIMITER)
    }

    pub fn closes(line: &str) -> bool {
        line.trim_end().ends_with(Self::DELIMITER)
    }
}
