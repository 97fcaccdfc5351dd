use super::decode::decode_line;
use super::labels::resolve_addresses;
use super::mnemonics::InstructionSet;
use super::types::{LoadedProgram, ParsedLine, SkippedLine};
use crate::error::LoadError;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load bytecode text. Malformed lines are skipped and reported; an
/// unresolvable jump fails the whole load.
pub fn load_program(text: &str, set: InstructionSet) -> Result<LoadedProgram, LoadError> {
    let mut code = Vec::new();
    let mut skipped = Vec::new();

    for (i, line) in text.lines().enumerate() {
        match decode_line(line, set) {
            ParsedLine::Instruction(instr) => code.push(instr),
            ParsedLine::Blank => {}
            ParsedLine::Malformed(reason) => {
                debug!(line = i + 1, %reason, "skipping bytecode line");
                skipped.push(SkippedLine {
                    line_number: i + 1,
                    text: line.to_string(),
                    reason,
                });
            }
        }
    }

    let program = resolve_addresses(code)?;
    debug!(
        instructions = program.len(),
        skipped = skipped.len(),
        "bytecode loaded"
    );
    Ok(LoadedProgram { program, skipped })
}

pub fn load_file(path: &Path, set: InstructionSet) -> Result<LoadedProgram, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    load_program(&text, set)
}
