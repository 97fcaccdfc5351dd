use crate::program::{Instruction, Program};
use thiserror::Error;

/// Why a bytecode line was dropped by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),
    #[error("{mnemonic} is missing operand {position}")]
    MissingOperand { mnemonic: String, position: usize },
    #[error("{mnemonic} expects an integer, got '{token}'")]
    BadInteger { mnemonic: String, token: String },
    #[error("unknown operator '{0}'")]
    BadOperator(String),
}

/// Result of decoding one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Instruction(Instruction),
    Blank,
    Malformed(ParseFailure),
}

/// A bytecode line the loader skipped, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub text: String,
    pub reason: ParseFailure,
}

/// Output of loading: the resolved program plus every line that was skipped.
#[derive(Debug)]
pub struct LoadedProgram {
    pub program: Program,
    pub skipped: Vec<SkippedLine>,
}
