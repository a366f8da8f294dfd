use crate::lang::value::Value;
use serde::{Deserialize, Serialize};

// =============================================================================
// OP - Bytecode instructions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    // literals
    /// Push an embedded value (number, boolean or identifier).
    Literal(Value),

    // arithmetic ( a b -- n )
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // comparison ( a b -- bool )
    Eq,
    Neq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // logic
    And,
    Or,

    // unary ( a -- a' )
    Neg,
    Not,

    /// Bind `n` identifiers to `n` values. ( id1..idn v1..vn -- )
    Assign(usize),

    /// Make the given indentation level the current scope.
    Scope(usize),

    End,
}

impl Op {
    /// Mnemonic used by the disassembler.
    pub fn name(&self) -> &'static str {
        match self {
            Op::Literal(_) => "LITERAL",
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::Mod => "MOD",
            Op::Pow => "POW",
            Op::Eq => "EQ",
            Op::Neq => "NEQ",
            Op::Lt => "LT",
            Op::Gt => "GT",
            Op::LtEq => "LT_EQ",
            Op::GtEq => "GT_EQ",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Neg => "NEG",
            Op::Not => "NOT",
            Op::Assign(_) => "ASSIGN",
            Op::Scope(_) => "SCOPE",
            Op::End => "END",
        }
    }
}
