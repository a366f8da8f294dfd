use crate::lexer::LexerError;
use crate::parser_error::ParserError;
use crate::runtime::runtime_error::RuntimeError;

/// Any failure of [`Vm::interpret`](crate::Vm::interpret), tagged by stage.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),
    #[error("Parse error: {0}")]
    Parser(#[from] ParserError),
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// Source line the error points at, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Lexer(e) => Some(e.line),
            Error::Parser(e) => Some(e.line),
            Error::Runtime(e) => e.line,
        }
    }
}
