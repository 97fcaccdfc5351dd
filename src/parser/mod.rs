mod decode;
mod labels;
mod loader;
mod mnemonics;
mod types;

pub use decode::decode_line;
pub use labels::{build_label_map, resolve_addresses};
pub use loader::{load_file, load_program};
pub use mnemonics::{InstructionSet, Mnemonic};
pub use types::{LoadedProgram, ParseFailure, ParsedLine, SkippedLine};
