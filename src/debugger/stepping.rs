/// Call depth and line captured when a stepping mode is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub depth: usize,
    pub line: Option<usize>,
}

/// Run modes for the debugger. At most one stepping mode is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Continue,
    StepOver(Snapshot),
    StepInto(Snapshot),
    StepOut(Snapshot),
}

impl RunMode {
    /// Whether execution should suspend now, given the current call depth and
    /// the current record's line.
    pub fn should_stop(&self, depth: usize, line: Option<usize>) -> bool {
        match *self {
            RunMode::Continue => false,
            RunMode::StepOver(snap) => stepped_over(snap, depth, line),
            RunMode::StepInto(snap) => depth > snap.depth || stepped_over(snap, depth, line),
            RunMode::StepOut(snap) => depth < snap.depth,
        }
    }

    pub fn is_stepping(&self) -> bool {
        !matches!(self, RunMode::Continue)
    }
}

fn stepped_over(snap: Snapshot, depth: usize, line: Option<usize>) -> bool {
    depth < snap.depth || (depth == snap.depth && line > snap.line)
}
