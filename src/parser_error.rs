#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A `(` without `)` or the other way around.
    UnmatchedParen,
    OperatorStackOverflow,
    /// The line is not `identifier-list '=' expression-list`.
    IncorrectSyntax,
}

/// A parsing error with source location.
///
/// `line` is 1-based and comes from the span of the offending token. For
/// errors at end of input the line of the last token is used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParserError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
}
