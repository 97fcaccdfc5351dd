mod binary_op;
mod instruction;
mod resolved;

pub use binary_op::BinaryOp;
pub use instruction::{DumpMode, Instruction, Jump};
pub use resolved::Program;
