/// Cursor on a string.
///
/// Provide bounds checked APIs on operation: reading before the start or past the end yields
/// `None` instead of panicking.
pub(crate) struct Scanner {
    /// Characters splitted.
    chars: Vec<char>,

    /// Current position, the index of the next character to read.
    position: usize,
}

impl Scanner {
    pub(crate) fn new(source: &str) -> Scanner {
        Self {
            chars: source.chars().collect(),
            position: 0,
        }
    }

    /// Check the scanner process reached the end or not.
    pub fn done(&self) -> bool {
        self.position >= self.chars.len()
    }

    /// Get character at the current position, without advancing.
    pub fn curr(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    /// Move the position forward and return the character walked through.
    ///
    /// Return `None` if already finished.
    pub fn next(&mut self) -> Option<char> {
        let ch = self.curr()?;
        self.position += 1;
        Some(ch)
    }

    /// Collect chars from `start` to `end`, excluding end pos.
    ///
    /// Both ends are clamped into the scanned source.
    pub fn collect_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    pub fn position(&self) -> usize {
        self.position
    }
}
