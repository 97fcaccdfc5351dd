use std::collections::BTreeSet;
use tracing::debug;

/// Breakpoint flags over source lines. Only lines that carry a LINE
/// instruction can hold a breakpoint.
#[derive(Debug, Clone, Default)]
pub struct Breakpoints {
    valid: BTreeSet<usize>,
    points: BTreeSet<usize>,
}

impl Breakpoints {
    pub fn new(valid: BTreeSet<usize>) -> Self {
        Self {
            valid,
            points: BTreeSet::new(),
        }
    }

    /// Returns false, changing nothing, when `line` is not a valid target.
    pub fn add(&mut self, line: usize) -> bool {
        if !self.valid.contains(&line) {
            debug!(line, "rejected breakpoint on line without code");
            return false;
        }
        self.points.insert(line);
        debug!(line, "breakpoint set");
        true
    }

    pub fn remove(&mut self, line: usize) {
        if self.points.remove(&line) {
            debug!(line, "breakpoint cleared");
        }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.points.contains(&line)
    }

    /// Armed lines, ascending.
    pub fn lines(&self) -> Vec<usize> {
        self.points.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
