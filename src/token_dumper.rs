use crate::token::{KEYWORDS, Token, TokenKind};

/// Prints a token stream one token per line, `[line] CATEGORY token`.
pub struct TokenDumper {
    pub color: bool,
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self { color: true }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn dump(&self, tokens: &[Token]) {
        print!("{}", self.render(tokens));
    }

    pub fn render(&self, tokens: &[Token]) -> String {
        tokens.iter().map(|t| self.render_one(t)).collect()
    }

    fn render_one(&self, token: &Token) -> String {
        let (colr, reset) = if self.color {
            (Self::color(token.kind), Self::RESET)
        } else {
            ("", "")
        };

        format!(
            "[{:02}] {}{:<8} {}{}\n",
            token.span.line,
            colr,
            Self::category(token.kind),
            token,
            reset
        )
    }

    fn category(kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Newline => "NEWLINE",
            Indent(_) => "INDENT",
            Eof => "EOF",

            Number => "NUMBER",
            True | False => "BOOL",
            Identifier => "IDENT",

            LParen | RParen | LBrace | RBrace | LBracket | RBracket => "BRACKET",
            Plus | Minus | Star | Slash | Percent | Caret => "OP",
            EqEq | NotEq | Lt | LtEq | Gt | GtEq => "CMP",
            Eq | Comma | Colon | ColonColon | Dot | DotDot | DotDotDot | At | Question | Bang
            | SingleQuote | DoubleQuote | Backslash => "PUNCT",

            _ => "KEYWORD",
        }
    }

    fn color(kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Newline | Indent(_) | Eof => Self::DIM,
            Number | True | False => Self::YEL,
            Identifier => Self::CYN,
            _ if KEYWORDS.iter().any(|(_, k)| *k == kind) => Self::MAG,
            _ => "",
        }
    }
}
