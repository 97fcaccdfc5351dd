use super::BinaryOp;
use crate::error::VmError;
use crate::executor::State;
use serde::Serialize;
use std::fmt;

/// A jump operand. `target` is the index of the `LABEL` instruction named by
/// `label`; it is filled in once when the program is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Jump {
    pub label: String,
    pub target: usize,
}

impl Jump {
    pub fn unresolved(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: usize::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DumpMode {
    /// Print the stack once.
    Now,
    /// Print every following instruction and the stack after it.
    On,
    Off,
}

/// One decoded instruction. The debug-only variants (`Line`, `Function`,
/// `Formal`) are no-ops for the base machine; their effect lives in the
/// debugger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Instruction {
    Lit { value: i32, name: Option<String> },
    Load { offset: usize, name: Option<String> },
    Store { offset: usize, name: Option<String> },
    Args(usize),
    Bop(BinaryOp),
    Call(Jump),
    Return { label: Option<String> },
    Goto(Jump),
    FalseBranch(Jump),
    Label(String),
    Halt,
    Pop(usize),
    Read,
    Write,
    Dump(DumpMode),
    /// `None` is the "no source line" marker emitted for native code.
    Line(Option<usize>),
    Function {
        name: String,
        start: Option<usize>,
        end: Option<usize>,
    },
    Formal { name: String, offset: Option<usize> },
}

impl Instruction {
    pub fn jump(&self) -> Option<&Jump> {
        match self {
            Instruction::Call(jump) | Instruction::Goto(jump) | Instruction::FalseBranch(jump) => {
                Some(jump)
            }
            _ => None,
        }
    }

    pub(crate) fn jump_mut(&mut self) -> Option<&mut Jump> {
        match self {
            Instruction::Call(jump) | Instruction::Goto(jump) | Instruction::FalseBranch(jump) => {
                Some(jump)
            }
            _ => None,
        }
    }

    /// Apply the base effect of this instruction. Jumps set the program
    /// counter to the target label; the fetch loop advances past it.
    pub fn execute(&self, state: &mut State) -> Result<(), VmError> {
        match self {
            Instruction::Lit { value, .. } => state.stack.push(*value),
            Instruction::Load { offset, .. } => {
                let value = state.stack.load_at(*offset)?;
                state.stack.push(value);
            }
            Instruction::Store { offset, .. } => {
                let value = state.stack.pop()?;
                state.stack.store_at(*offset, value)?;
            }
            Instruction::Args(count) => state.stack.new_frame(*count)?,
            Instruction::Bop(op) => {
                let rhs = state.stack.pop()?;
                let lhs = state.stack.pop()?;
                state.stack.push(op.apply(lhs, rhs)?);
            }
            Instruction::Call(jump) => {
                state.return_addrs.push(state.pc);
                state.pc = jump.target;
            }
            Instruction::Return { .. } => {
                let return_to = state
                    .return_addrs
                    .last()
                    .copied()
                    .ok_or(VmError::ReturnWithoutCall)?;
                state.stack.pop_frame()?;
                state.return_addrs.pop();
                state.pc = return_to;
            }
            Instruction::Goto(jump) => state.pc = jump.target,
            Instruction::FalseBranch(jump) => {
                if state.stack.pop()? == 0 {
                    state.pc = jump.target;
                }
            }
            Instruction::Halt => state.halt(),
            Instruction::Pop(count) => {
                for _ in 0..*count {
                    state.stack.pop()?;
                }
            }
            Instruction::Read => {
                let value = state.console.read_int()?;
                state.stack.push(value);
            }
            Instruction::Write => {
                let value = state.stack.pop()?;
                state.console.write_value(value)?;
            }
            Instruction::Dump(DumpMode::Now) => state.dump_stack()?,
            Instruction::Dump(DumpMode::On) => state.dumping = true,
            Instruction::Dump(DumpMode::Off) => state.dumping = false,
            Instruction::Label(_)
            | Instruction::Line(_)
            | Instruction::Function { .. }
            | Instruction::Formal { .. } => {}
        }
        Ok(())
    }
}

fn signed(line: Option<usize>) -> i64 {
    line.map_or(-1, |n| n as i64)
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Lit { value, name } => {
                write!(f, "LIT {value}")?;
                if let Some(name) = name {
                    write!(f, " {name}")?;
                }
                Ok(())
            }
            Instruction::Load { offset, name } => {
                write!(f, "LOAD {offset}")?;
                if let Some(name) = name {
                    write!(f, " {name}")?;
                }
                Ok(())
            }
            Instruction::Store { offset, name } => {
                write!(f, "STORE {offset}")?;
                if let Some(name) = name {
                    write!(f, " {name}")?;
                }
                Ok(())
            }
            Instruction::Args(count) => write!(f, "ARGS {count}"),
            Instruction::Bop(op) => write!(f, "BOP {op}"),
            Instruction::Call(jump) => write!(f, "CALL {}", jump.label),
            Instruction::Return { label: Some(label) } => write!(f, "RETURN {label}"),
            Instruction::Return { label: None } => f.write_str("RETURN"),
            Instruction::Goto(jump) => write!(f, "GOTO {}", jump.label),
            Instruction::FalseBranch(jump) => write!(f, "FALSEBRANCH {}", jump.label),
            Instruction::Label(name) => write!(f, "LABEL {name}"),
            Instruction::Halt => f.write_str("HALT"),
            Instruction::Pop(count) => write!(f, "POP {count}"),
            Instruction::Read => f.write_str("READ"),
            Instruction::Write => f.write_str("WRITE"),
            Instruction::Dump(DumpMode::Now) => f.write_str("DUMP"),
            Instruction::Dump(DumpMode::On) => f.write_str("DUMP ON"),
            Instruction::Dump(DumpMode::Off) => f.write_str("DUMP OFF"),
            Instruction::Line(line) => write!(f, "LINE {}", signed(*line)),
            Instruction::Function { name, start, end } => {
                write!(f, "FUNCTION {name} {} {}", signed(*start), signed(*end))
            }
            Instruction::Formal { name, offset } => {
                write!(f, "FORMAL {name}")?;
                if let Some(offset) = offset {
                    write!(f, " {offset}")?;
                }
                Ok(())
            }
        }
    }
}
