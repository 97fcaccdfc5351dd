use crate::error::LoadError;
use crate::program::{Instruction, Program};
use std::collections::HashMap;

/// Map each LABEL name to its instruction index.
pub fn build_label_map(code: &[Instruction]) -> Result<HashMap<String, usize>, LoadError> {
    let mut map = HashMap::new();
    for (i, instr) in code.iter().enumerate() {
        if let Instruction::Label(name) = instr {
            if let Some(first) = map.insert(name.clone(), i) {
                return Err(LoadError::DuplicateLabel {
                    label: name.clone(),
                    first,
                    second: i,
                });
            }
        }
    }
    Ok(map)
}

/// Patch every jump with its label's address. Runs once, after the whole
/// sequence is loaded.
pub fn resolve_addresses(mut code: Vec<Instruction>) -> Result<Program, LoadError> {
    let labels = build_label_map(&code)?;
    for (index, instr) in code.iter_mut().enumerate() {
        if let Some(jump) = instr.jump_mut() {
            jump.target = *labels
                .get(&jump.label)
                .ok_or_else(|| LoadError::UnresolvedLabel {
                    label: jump.label.clone(),
                    index,
                })?;
        }
    }
    Ok(Program::from_resolved(code, labels))
}
