use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Debug metadata for one activation: which function it is, where in the
/// source it is, and which frame offsets hold its named variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionEnvironmentRecord {
    pub name: Option<String>,
    pub start_line: Option<usize>,
    pub end_line: Option<usize>,
    pub current_line: Option<usize>,
    variables: HashMap<String, usize>,
}

impl FunctionEnvironmentRecord {
    pub fn set_function(&mut self, name: &str, start: Option<usize>, end: Option<usize>) {
        self.name = Some(name.to_string());
        self.start_line = start;
        self.end_line = end;
    }

    pub fn set_current_line(&mut self, line: usize) {
        self.current_line = Some(line);
    }

    pub fn enter(&mut self, name: &str, offset: usize) {
        self.variables.insert(name.to_string(), offset);
    }

    /// Drop bindings for slots at or above `frame_size`; they were popped.
    pub fn forget_from(&mut self, frame_size: usize) {
        self.variables.retain(|_, offset| *offset < frame_size);
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.variables.get(name).copied()
    }

    /// Variable names, sorted.
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// No function has been bound yet (outermost scope before FUNCTION, or a
    /// call whose FUNCTION has not run).
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }

    pub fn is_native(&self) -> bool {
        self.name.is_some() && self.start_line.is_none()
    }
}

fn line_or_dash(line: Option<usize>) -> String {
    line.map_or_else(|| "-".to_string(), |n| n.to_string())
}

/// `fib(2-11) @5 {n:0}`
impl fmt::Display for FunctionEnvironmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}-{}) @{} {{",
            self.name.as_deref().unwrap_or("<native>"),
            line_or_dash(self.start_line),
            line_or_dash(self.end_line),
            line_or_dash(self.current_line),
        )?;
        let mut bindings: Vec<(&String, &usize)> = self.variables.iter().collect();
        bindings.sort_by_key(|(_, offset)| **offset);
        for (i, (name, offset)) in bindings.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}:{offset}")?;
        }
        f.write_str("}")
    }
}

/// Stack of environment records. Never empty: the outermost record exists
/// from construction and cannot be popped.
#[derive(Debug, Clone, Default)]
pub struct RecordStack {
    outermost: FunctionEnvironmentRecord,
    calls: Vec<FunctionEnvironmentRecord>,
}

impl RecordStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fresh record for a new activation.
    pub fn begin_scope(&mut self) {
        self.calls.push(FunctionEnvironmentRecord::default());
    }

    /// Discard the innermost call's record. The outermost record stays.
    pub fn pop(&mut self) -> Option<FunctionEnvironmentRecord> {
        self.calls.pop()
    }

    pub fn current(&self) -> &FunctionEnvironmentRecord {
        self.calls.last().unwrap_or(&self.outermost)
    }

    pub fn current_mut(&mut self) -> &mut FunctionEnvironmentRecord {
        self.calls.last_mut().unwrap_or(&mut self.outermost)
    }

    /// Record `n`, where 0 is the outermost.
    pub fn get(&self, n: usize) -> Option<&FunctionEnvironmentRecord> {
        match n {
            0 => Some(&self.outermost),
            _ => self.calls.get(n - 1),
        }
    }

    pub fn len(&self) -> usize {
        self.calls.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}
