use super::Instruction;
use std::collections::{BTreeSet, HashMap};

/// A loaded instruction sequence whose jump targets are all resolved.
#[derive(Debug, Clone, Default)]
pub struct Program {
    code: Vec<Instruction>,
    labels: HashMap<String, usize>,
}

impl Program {
    /// Built by the loader after label resolution succeeded.
    pub(crate) fn from_resolved(code: Vec<Instruction>, labels: HashMap<String, usize>) -> Self {
        Self { code, labels }
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.code.get(index)
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn address_of(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    /// Source lines named by LINE instructions, excluding the native marker.
    pub fn line_numbers(&self) -> BTreeSet<usize> {
        self.code
            .iter()
            .filter_map(|instr| match instr {
                Instruction::Line(Some(line)) => Some(*line),
                _ => None,
            })
            .collect()
    }
}
