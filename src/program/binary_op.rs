use crate::error::VmError;
use serde::Serialize;
use std::fmt;

/// Operators accepted by `BOP`. Comparisons and logical operators yield 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "&" => BinaryOp::And,
            "|" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        }
    }

    /// `lhs` is the deeper operand, `rhs` the one that was on top.
    pub fn apply(self, lhs: i32, rhs: i32) -> Result<i32, VmError> {
        let value = match self {
            BinaryOp::Add => lhs.wrapping_add(rhs),
            BinaryOp::Sub => lhs.wrapping_sub(rhs),
            BinaryOp::Mul => lhs.wrapping_mul(rhs),
            BinaryOp::Div => {
                if rhs == 0 {
                    return Err(VmError::DivisionByZero);
                }
                lhs.wrapping_div(rhs)
            }
            BinaryOp::Eq => (lhs == rhs) as i32,
            BinaryOp::Ne => (lhs != rhs) as i32,
            BinaryOp::Lt => (lhs < rhs) as i32,
            BinaryOp::Le => (lhs <= rhs) as i32,
            BinaryOp::Gt => (lhs > rhs) as i32,
            BinaryOp::Ge => (lhs >= rhs) as i32,
            BinaryOp::And => (lhs != 0 && rhs != 0) as i32,
            BinaryOp::Or => (lhs != 0 || rhs != 0) as i32,
        };
        Ok(value)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
