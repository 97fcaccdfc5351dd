use super::mnemonics::{InstructionSet, Mnemonic};
use super::types::{ParseFailure, ParsedLine};
use crate::program::{BinaryOp, DumpMode, Instruction, Jump};
use std::str::FromStr;

struct Operands<'a> {
    mnemonic: &'a str,
    tokens: Vec<&'a str>,
}

impl<'a> Operands<'a> {
    fn optional(&self, position: usize) -> Option<&'a str> {
        self.tokens.get(position).copied()
    }

    fn required(&self, position: usize) -> Result<&'a str, ParseFailure> {
        self.optional(position)
            .ok_or_else(|| ParseFailure::MissingOperand {
                mnemonic: self.mnemonic.to_string(),
                position,
            })
    }

    fn number<T: FromStr>(&self, token: &str) -> Result<T, ParseFailure> {
        token.parse().map_err(|_| ParseFailure::BadInteger {
            mnemonic: self.mnemonic.to_string(),
            token: token.to_string(),
        })
    }

    fn required_number<T: FromStr>(&self, position: usize) -> Result<T, ParseFailure> {
        self.number(self.required(position)?)
    }

    fn optional_number<T: FromStr>(&self, position: usize) -> Result<Option<T>, ParseFailure> {
        self.optional(position).map(|t| self.number(t)).transpose()
    }

    /// Source line operands: negative values mark native code.
    fn line_number(&self, position: usize) -> Result<Option<usize>, ParseFailure> {
        let value: i64 = self.required_number(position)?;
        Ok(usize::try_from(value).ok())
    }

    fn name(&self, position: usize) -> Option<String> {
        self.optional(position).map(str::to_string)
    }
}

/// Decode one line of bytecode text. Tokens are separated by whitespace and
/// the first token is the mnemonic; extra trailing tokens are ignored.
pub fn decode_line(line: &str, set: InstructionSet) -> ParsedLine {
    let mut tokens = line.split_whitespace();
    let Some(head) = tokens.next() else {
        return ParsedLine::Blank;
    };
    let Some(mnemonic) = Mnemonic::lookup(head, set) else {
        return ParsedLine::Malformed(ParseFailure::UnknownMnemonic(head.to_string()));
    };
    let ops = Operands {
        mnemonic: head,
        tokens: tokens.collect(),
    };
    match decode_operands(mnemonic, &ops) {
        Ok(instr) => ParsedLine::Instruction(instr),
        Err(failure) => ParsedLine::Malformed(failure),
    }
}

fn decode_operands(mnemonic: Mnemonic, ops: &Operands<'_>) -> Result<Instruction, ParseFailure> {
    let instr = match mnemonic {
        Mnemonic::Lit => Instruction::Lit {
            value: ops.required_number(0)?,
            name: ops.name(1),
        },
        Mnemonic::Load => Instruction::Load {
            offset: ops.required_number(0)?,
            name: ops.name(1),
        },
        Mnemonic::Store => Instruction::Store {
            offset: ops.required_number(0)?,
            name: ops.name(1),
        },
        Mnemonic::Args => Instruction::Args(ops.required_number(0)?),
        Mnemonic::Bop => {
            let symbol = ops.required(0)?;
            let op = BinaryOp::from_symbol(symbol)
                .ok_or_else(|| ParseFailure::BadOperator(symbol.to_string()))?;
            Instruction::Bop(op)
        }
        Mnemonic::Call => Instruction::Call(Jump::unresolved(ops.required(0)?)),
        Mnemonic::Goto => Instruction::Goto(Jump::unresolved(ops.required(0)?)),
        Mnemonic::FalseBranch => Instruction::FalseBranch(Jump::unresolved(ops.required(0)?)),
        Mnemonic::Return => Instruction::Return { label: ops.name(0) },
        Mnemonic::Label => Instruction::Label(ops.required(0)?.to_string()),
        Mnemonic::Halt => Instruction::Halt,
        Mnemonic::Pop => Instruction::Pop(ops.optional_number(0)?.unwrap_or(1)),
        Mnemonic::Read => Instruction::Read,
        Mnemonic::Write => Instruction::Write,
        Mnemonic::Dump => match ops.optional(0) {
            None => Instruction::Dump(DumpMode::Now),
            Some("ON") => Instruction::Dump(DumpMode::On),
            Some("OFF") => Instruction::Dump(DumpMode::Off),
            Some(other) => return Err(ParseFailure::BadOperator(other.to_string())),
        },
        Mnemonic::Line => Instruction::Line(ops.line_number(0)?),
        Mnemonic::Function => Instruction::Function {
            name: ops.required(0)?.to_string(),
            start: ops.line_number(1)?,
            end: ops.line_number(2)?,
        },
        Mnemonic::Formal => Instruction::Formal {
            name: ops.required(0)?.to_string(),
            offset: ops.optional_number(1)?,
        },
    };
    Ok(instr)
}
