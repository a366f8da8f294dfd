use crate::bytecode::Op;
use crate::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    None,
    Left,
    Right,
}

/// One row of the operator table.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub kind: TokenKind,
    pub precedence: u8,
    pub assoc: Assoc,
    pub unary: bool,
    /// Instruction emitted when the operator is applied. `None` for grouping
    /// brackets and for unary `+`, which is a no-op.
    pub op: Option<Op>,
}

const fn row(kind: TokenKind, precedence: u8, assoc: Assoc, unary: bool, op: Option<Op>) -> Operator {
    Operator {
        kind,
        precedence,
        assoc,
        unary,
        op,
    }
}

/// Every operator the expression parser knows. Higher precedence binds tighter.
///
/// `-` and `+` appear twice; the parser picks the unary row from context.
pub static OPERATORS: [Operator; 19] = [
    row(TokenKind::LParen, 0, Assoc::None, false, None),
    row(TokenKind::RParen, 0, Assoc::None, false, None),
    row(TokenKind::Or, 1, Assoc::Left, false, Some(Op::Or)),
    row(TokenKind::And, 2, Assoc::Left, false, Some(Op::And)),
    row(TokenKind::Not, 3, Assoc::Right, true, Some(Op::Not)),
    row(TokenKind::EqEq, 4, Assoc::Left, false, Some(Op::Eq)),
    row(TokenKind::NotEq, 4, Assoc::Left, false, Some(Op::Neq)),
    row(TokenKind::Lt, 4, Assoc::Left, false, Some(Op::Lt)),
    row(TokenKind::Gt, 4, Assoc::Left, false, Some(Op::Gt)),
    row(TokenKind::LtEq, 4, Assoc::Left, false, Some(Op::LtEq)),
    row(TokenKind::GtEq, 4, Assoc::Left, false, Some(Op::GtEq)),
    row(TokenKind::Plus, 5, Assoc::Left, false, Some(Op::Add)),
    row(TokenKind::Minus, 5, Assoc::Left, false, Some(Op::Sub)),
    row(TokenKind::Star, 6, Assoc::Left, false, Some(Op::Mul)),
    row(TokenKind::Slash, 6, Assoc::Left, false, Some(Op::Div)),
    row(TokenKind::Percent, 6, Assoc::Left, false, Some(Op::Mod)),
    row(TokenKind::Minus, 7, Assoc::Right, true, Some(Op::Neg)),
    row(TokenKind::Plus, 7, Assoc::Right, true, None),
    row(TokenKind::Caret, 8, Assoc::Right, false, Some(Op::Pow)),
];

/// First table row for `kind`. For `-`/`+` this is the binary row.
pub fn lookup(kind: TokenKind) -> Option<&'static Operator> {
    OPERATORS.iter().find(|o| o.kind == kind)
}

/// The unary row sharing `kind`, if there is one.
pub fn lookup_unary(kind: TokenKind) -> Option<&'static Operator> {
    OPERATORS.iter().find(|o| o.kind == kind && o.unary)
}

impl Operator {
    /// Whether `self`, sitting on the operator stack, must be applied before
    /// `incoming` is pushed.
    pub fn yields_to(&self, incoming: &Operator) -> bool {
        if self.kind == TokenKind::LParen {
            return false;
        }
        match incoming.assoc {
            Assoc::Right => self.precedence > incoming.precedence,
            Assoc::Left | Assoc::None => self.precedence >= incoming.precedence,
        }
    }
}
