use crate::lang::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Brackets
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Comparison
    Eq,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Punctuation
    At,
    Percent,
    Question,
    Bang,
    SingleQuote,
    DoubleQuote,
    Colon,
    ColonColon,
    Dot,
    DotDot,
    DotDotDot,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Backslash,

    // Keywords
    And,
    Break,
    Case,
    Class,
    Constructor,
    Continue,
    Do,
    Else,
    End,
    Extend,
    Extern,
    False,
    For,
    Function,
    Get,
    If,
    Intern,
    Namespace,
    Not,
    Null,
    Or,
    Property,
    Repeat,
    Return,
    Set,
    Super,
    True,
    Until,
    When,
    While,

    // Literals
    Identifier,
    Number,

    // Layout
    Newline,
    /// Leading whitespace of a line, measured in indent units.
    Indent(usize),

    Eof,
}

/// Reserved words, matched exactly against identifier runs.
pub static KEYWORDS: &[(&str, TokenKind)] = &[
    ("and", TokenKind::And),
    ("break", TokenKind::Break),
    ("case", TokenKind::Case),
    ("class", TokenKind::Class),
    ("constructor", TokenKind::Constructor),
    ("continue", TokenKind::Continue),
    ("do", TokenKind::Do),
    ("else", TokenKind::Else),
    ("end", TokenKind::End),
    ("extend", TokenKind::Extend),
    ("extern", TokenKind::Extern),
    ("false", TokenKind::False),
    ("for", TokenKind::For),
    ("function", TokenKind::Function),
    ("get", TokenKind::Get),
    ("if", TokenKind::If),
    ("intern", TokenKind::Intern),
    ("namespace", TokenKind::Namespace),
    ("not", TokenKind::Not),
    ("null", TokenKind::Null),
    ("or", TokenKind::Or),
    ("property", TokenKind::Property),
    ("repeat", TokenKind::Repeat),
    ("return", TokenKind::Return),
    ("set", TokenKind::Set),
    ("super", TokenKind::Super),
    ("true", TokenKind::True),
    ("until", TokenKind::Until),
    ("when", TokenKind::When),
    ("while", TokenKind::While),
];

impl TokenKind {
    pub fn keyword(word: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(kw, _)| kw.len() == word.len() && *kw == word)
            .map(|(_, kind)| *kind)
    }

    /// Returns true for tokens that carry a value into an expression.
    pub fn is_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Number | TokenKind::Identifier | TokenKind::True | TokenKind::False
        )
    }

    /// Returns true for tokens that end a statement line.
    pub fn is_line_end(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Eof)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some((word, _)) = KEYWORDS.iter().find(|(_, kind)| kind == self) {
            return write!(f, "{}", word);
        }

        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::EqEq => write!(f, "=="),
            TokenKind::NotEq => write!(f, "!="),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::LtEq => write!(f, "<="),
            TokenKind::GtEq => write!(f, ">="),
            TokenKind::At => write!(f, "@"),
            TokenKind::Percent => write!(f, "%"),
            TokenKind::Question => write!(f, "?"),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::SingleQuote => write!(f, "'"),
            TokenKind::DoubleQuote => write!(f, "\""),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::ColonColon => write!(f, "::"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::DotDot => write!(f, ".."),
            TokenKind::DotDotDot => write!(f, "..."),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::Backslash => write!(f, "\\"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Number => write!(f, "number"),
            TokenKind::Newline => write!(f, "\\n"),
            TokenKind::Indent(level) => write!(f, "indent({})", level),
            TokenKind::Eof => write!(f, "EOF"),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// Location of a token: byte range into the source plus its 1-based line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
    pub line: usize,
}

impl Span {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.offset..self.offset + self.len]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Numbers, booleans and identifiers carry their value here.
    pub literal: Option<Value>,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.literal {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "{}", self.kind),
        }
    }
}
