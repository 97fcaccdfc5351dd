/// Which instructions the loader accepts. The debug set adds the source
/// annotation instructions on top of the base set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionSet {
    Base,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Args,
    Bop,
    Call,
    Dump,
    FalseBranch,
    Goto,
    Halt,
    Load,
    Label,
    Lit,
    Pop,
    Read,
    Return,
    Store,
    Write,
    Line,
    Function,
    Formal,
}

impl Mnemonic {
    pub fn lookup(name: &str, set: InstructionSet) -> Option<Self> {
        let mnemonic = match name {
            "ARGS" => Mnemonic::Args,
            "BOP" => Mnemonic::Bop,
            "CALL" => Mnemonic::Call,
            "DUMP" => Mnemonic::Dump,
            "FALSEBRANCH" => Mnemonic::FalseBranch,
            "GOTO" => Mnemonic::Goto,
            "HALT" => Mnemonic::Halt,
            "LOAD" => Mnemonic::Load,
            "LABEL" => Mnemonic::Label,
            "LIT" => Mnemonic::Lit,
            "POP" => Mnemonic::Pop,
            "READ" => Mnemonic::Read,
            "RETURN" => Mnemonic::Return,
            "STORE" => Mnemonic::Store,
            "WRITE" => Mnemonic::Write,
            "LINE" => Mnemonic::Line,
            "FUNCTION" => Mnemonic::Function,
            "FORMAL" => Mnemonic::Formal,
            _ => return None,
        };
        if mnemonic.is_debug_only() && set == InstructionSet::Base {
            return None;
        }
        Some(mnemonic)
    }

    pub fn is_debug_only(self) -> bool {
        matches!(self, Mnemonic::Line | Mnemonic::Function | Mnemonic::Formal)
    }
}
