use log::{debug, trace};

use crate::buffer::GrowBuffer;
use crate::lang::value::Value;
use crate::token::{Span, Token, TokenKind};

/// Lexer output. Always terminated by a single `Eof` token.
pub type TokenStream = GrowBuffer<Token>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnknownSymbol,
    UnterminatedComment,
    UnterminatedScientificNotation,
    NumberTooLarge,
    InconsistentIndentation,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct LexerError {
    pub kind: LexErrorKind,
    pub message: String,
    pub line: usize,
}

/// Unit every indented line is measured in, fixed by the first indented line.
#[derive(Debug, Clone, Copy)]
struct IndentUnit {
    ch: u8,
    len: usize,
}

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Byte offset where the token being scanned begins.
    start: usize,
    line: usize,
    indent: Option<IndentUnit>,
    tokens: TokenStream,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_capacity(source, 64)
    }

    pub fn with_capacity(source: &'a str, capacity: usize) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            start: 0,
            line: 1,
            indent: None,
            tokens: TokenStream::with_capacity(capacity),
        }
    }

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.current();
        self.pos += 1;
        ch
    }

    /// Consumes the current character if it is `expected`.
    fn eat(&mut self, expected: u8) -> bool {
        if self.current() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn either(&mut self, second: u8, single: TokenKind, double: TokenKind) -> TokenKind {
        if self.eat(second) { double } else { single }
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.bytes[self.pos - 1] == b'\n'
    }

    fn error(&self, kind: LexErrorKind, message: impl Into<String>) -> LexerError {
        LexerError {
            kind,
            message: message.into(),
            line: self.line,
        }
    }

    fn push(&mut self, kind: TokenKind, literal: Option<Value>) {
        let token = Token {
            kind,
            span: Span {
                offset: self.start,
                len: self.pos - self.start,
                line: self.line,
            },
            literal,
        };
        trace!("token {} at line {}", token, self.line);
        self.tokens.push(token);
    }

    pub fn tokenize(mut self) -> Result<TokenStream, LexerError> {
        loop {
            let line_start = self.at_line_start();
            self.start = self.pos;

            match self.current() {
                None => {
                    self.push(TokenKind::Eof, None);
                    break;
                }
                Some(ch @ (b' ' | b'\t')) if line_start => self.read_indent(ch)?,
                Some(b' ' | b'\t' | b'\r') => {
                    self.advance();
                }
                Some(b'\n') => {
                    self.advance();
                    self.push(TokenKind::Newline, None);
                    self.line += 1;
                }
                Some(b'#') => self.skip_comment()?,
                Some(ch) if ch.is_ascii_digit() => self.read_number()?,
                Some(ch) if ch.is_ascii_alphabetic() || ch == b'_' => self.read_identifier(),
                Some(_) => self.read_symbol()?,
            }
        }

        debug!(
            "lexed {} tokens over {} lines",
            self.tokens.len(),
            self.line
        );
        Ok(self.tokens)
    }

    fn read_indent(&mut self, ch: u8) -> Result<(), LexerError> {
        while self.current() == Some(ch) {
            self.advance();
        }
        let len = self.pos - self.start;

        // Blank lines carry no indentation.
        if self.skip_blank_rest()? {
            return Ok(());
        }

        if matches!(self.current(), Some(b' ' | b'\t')) {
            return Err(self.error(
                LexErrorKind::InconsistentIndentation,
                "inconsistent type of indentation (spaces and tabs are mixed)",
            ));
        }

        let level = match self.indent {
            None => {
                debug!(
                    "indent unit set to {} x {:?} at line {}",
                    len, ch as char, self.line
                );
                self.indent = Some(IndentUnit { ch, len });
                1
            }
            Some(unit) if unit.ch == ch && len % unit.len == 0 => len / unit.len,
            Some(unit) => {
                return Err(self.error(
                    LexErrorKind::InconsistentIndentation,
                    format!(
                        "inconsistent type of indentation (expected multiples of {} {})",
                        unit.len,
                        if unit.ch == b' ' { "spaces" } else { "tabs" }
                    ),
                ));
            }
        };

        self.push(TokenKind::Indent(level), None);
        Ok(())
    }

    /// Skips the rest of the line if it holds only whitespace and comments.
    ///
    /// Stops before the newline or a line comment. Leaves the cursor untouched
    /// and returns `false` when code follows.
    fn skip_blank_rest(&mut self) -> Result<bool, LexerError> {
        let (pos, line) = (self.pos, self.line);

        loop {
            while matches!(self.current(), Some(b' ' | b'\t' | b'\r')) {
                self.advance();
            }
            match (self.current(), self.peek()) {
                (None | Some(b'\n'), _) => return Ok(true),
                (Some(b'#'), Some(b':')) => self.skip_comment()?,
                (Some(b'#'), _) => return Ok(true),
                _ => {
                    self.pos = pos;
                    self.line = line;
                    return Ok(false);
                }
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), LexerError> {
        self.advance();

        if !self.eat(b':') {
            while let Some(ch) = self.current() {
                if ch == b'\n' {
                    break;
                }
                self.advance();
            }
            return Ok(());
        }

        let start_line = self.line;
        let mut depth = 1usize;

        while depth > 0 {
            match (self.current(), self.peek()) {
                (None, _) => {
                    return Err(LexerError {
                        kind: LexErrorKind::UnterminatedComment,
                        message: "unterminated block comment".to_string(),
                        line: start_line,
                    });
                }
                (Some(b'#'), Some(b':')) => {
                    self.pos += 2;
                    depth += 1;
                }
                (Some(b':'), Some(b'#')) => {
                    self.pos += 2;
                    depth -= 1;
                }
                (Some(b'\n'), _) => {
                    self.advance();
                    self.line += 1;
                }
                _ => {
                    self.advance();
                }
            }
        }

        Ok(())
    }

    fn skip_digits(&mut self) -> usize {
        let from = self.pos;
        while self.current().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }
        self.pos - from
    }

    fn read_number(&mut self) -> Result<(), LexerError> {
        self.skip_digits();

        if self.current() == Some(b'.') && self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
            self.skip_digits();
        }

        if matches!(self.current(), Some(b'e' | b'E')) {
            self.advance();
            if matches!(self.current(), Some(b'-' | b'+')) {
                self.advance();
            }
            if self.skip_digits() == 0 {
                return Err(self.error(
                    LexErrorKind::UnterminatedScientificNotation,
                    format!(
                        "unterminated scientific notation: '{}'",
                        &self.source[self.start..self.pos]
                    ),
                ));
            }
        }

        let text = &self.source[self.start..self.pos];
        let value: f64 = text.parse().map_err(|_| {
            self.error(
                LexErrorKind::NumberTooLarge,
                format!("invalid number literal: {}", text),
            )
        })?;

        if value.is_infinite() {
            return Err(self.error(
                LexErrorKind::NumberTooLarge,
                format!("number literal is too large: {}", text),
            ));
        }

        self.push(TokenKind::Number, Some(Value::Number(value)));
        Ok(())
    }

    fn read_identifier(&mut self) {
        while self
            .current()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == b'_')
        {
            self.advance();
        }

        let word = &self.source[self.start..self.pos];
        match TokenKind::keyword(word) {
            Some(TokenKind::True) => self.push(TokenKind::True, Some(Value::Boolean(true))),
            Some(TokenKind::False) => self.push(TokenKind::False, Some(Value::Boolean(false))),
            Some(kind) => self.push(kind, None),
            None => self.push(
                TokenKind::Identifier,
                Some(Value::Identifier(word.to_string())),
            ),
        }
    }

    fn read_symbol(&mut self) -> Result<(), LexerError> {
        use TokenKind as TK;

        let kind = match self.advance() {
            Some(b'(') => TK::LParen,
            Some(b')') => TK::RParen,
            Some(b'{') => TK::LBrace,
            Some(b'}') => TK::RBrace,
            Some(b'[') => TK::LBracket,
            Some(b']') => TK::RBracket,
            Some(b'=') => self.either(b'=', TK::Eq, TK::EqEq),
            Some(b'<') => self.either(b'=', TK::Lt, TK::LtEq),
            Some(b'>') => self.either(b'=', TK::Gt, TK::GtEq),
            Some(b'!') => self.either(b'=', TK::Bang, TK::NotEq),
            Some(b':') => self.either(b':', TK::Colon, TK::ColonColon),
            Some(b'.') => {
                if self.eat(b'.') {
                    self.either(b'.', TK::DotDot, TK::DotDotDot)
                } else {
                    TK::Dot
                }
            }
            Some(b'@') => TK::At,
            Some(b'%') => TK::Percent,
            Some(b'?') => TK::Question,
            Some(b'\'') => TK::SingleQuote,
            Some(b'"') => TK::DoubleQuote,
            Some(b',') => TK::Comma,
            Some(b'+') => TK::Plus,
            Some(b'-') => TK::Minus,
            Some(b'*') => TK::Star,
            Some(b'/') => TK::Slash,
            Some(b'^') => TK::Caret,
            Some(b'\\') => TK::Backslash,
            _ => {
                let symbol = self.source[self.start..].chars().next().unwrap_or('?');
                return Err(self.error(
                    LexErrorKind::UnknownSymbol,
                    format!("unknown symbol: '{}'", symbol),
                ));
            }
        };

        self.push(kind, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .iter()
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    fn literals(source: &str) -> Vec<Value> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .iter()
            .filter_map(|t| t.literal.clone())
            .collect()
    }

    fn lex_error(source: &str) -> LexerError {
        Lexer::new(source).tokenize().unwrap_err()
    }

    #[test]
    fn test_scientific_notation() {
        let tokens = Lexer::new("12345678e-4").tokenize().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.get(0).unwrap().kind, TokenKind::Number);
        assert_eq!(tokens.get(0).unwrap().literal, Some(Value::Number(1234.5678)));
        assert_eq!(tokens.get(1).unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            literals("42 3.25 1E3 2e+2"),
            vec![
                Value::Number(42.0),
                Value::Number(3.25),
                Value::Number(1000.0),
                Value::Number(200.0)
            ]
        );
    }

    #[test]
    fn test_dot_after_number_without_fraction() {
        assert_eq!(
            kinds("1..2"),
            vec![TokenKind::Number, TokenKind::DotDot, TokenKind::Number]
        );
    }

    #[test]
    fn test_unterminated_scientific_notation() {
        let err = lex_error("a = 3e");
        assert_eq!(err.kind, LexErrorKind::UnterminatedScientificNotation);

        let err = lex_error("a = 3e-x");
        assert_eq!(err.kind, LexErrorKind::UnterminatedScientificNotation);
    }

    #[test]
    fn test_number_too_large() {
        let err = lex_error("a = 1e400");
        assert_eq!(err.kind, LexErrorKind::NumberTooLarge);
        assert!(err.message.contains("too large"), "msg was: {}", err.message);
    }

    #[test]
    fn test_keyword_vs_ident() {
        assert_eq!(
            kinds("if iff while whiled not note"),
            vec![
                TokenKind::If,
                TokenKind::Identifier,
                TokenKind::While,
                TokenKind::Identifier,
                TokenKind::Not,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_identifier_literal_is_owned_copy() {
        assert_eq!(
            literals("foo_1 _bar true false"),
            vec![
                Value::Identifier("foo_1".to_string()),
                Value::Identifier("_bar".to_string()),
                Value::Boolean(true),
                Value::Boolean(false),
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("= == != ! < <= > >= : :: . .. ..."),
            vec![
                TokenKind::Eq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Bang,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Colon,
                TokenKind::ColonColon,
                TokenKind::Dot,
                TokenKind::DotDot,
                TokenKind::DotDotDot,
            ]
        );
    }

    #[test]
    fn test_single_char_punctuation() {
        assert_eq!(
            kinds("( ) { } [ ] , + - * / ^ % @ ? \\"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Comma,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Caret,
                TokenKind::Percent,
                TokenKind::At,
                TokenKind::Question,
                TokenKind::Backslash,
            ]
        );
    }

    #[test]
    fn test_unknown_symbol() {
        let err = lex_error("a = 1 $ 2");
        assert_eq!(err.kind, LexErrorKind::UnknownSymbol);
        assert!(err.message.contains('$'), "msg was: {}", err.message);

        let err = lex_error("a = é");
        assert_eq!(err.kind, LexErrorKind::UnknownSymbol);
    }

    #[test]
    fn test_line_comment() {
        assert_eq!(
            kinds("# a comment\na = 1 # trailing"),
            vec![
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_nested_block_comment() {
        assert_eq!(
            kinds("#: outer #: inner :# still outer\n:# a"),
            vec![TokenKind::Identifier]
        );
    }

    #[test]
    fn test_block_comment_counts_lines() {
        let tokens = Lexer::new("#:\n\n:#\nx").tokenize().unwrap();
        let x = tokens.iter().find(|t| t.kind == TokenKind::Identifier).unwrap();
        assert_eq!(x.span.line, 4);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = lex_error("a = 1\n#: never #: closed :#");
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_indent_levels_with_spaces() {
        assert_eq!(
            kinds("a = 1\n  b = 2\n    c = 3"),
            vec![
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Indent(1),
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Indent(2),
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_tab_after_space_indent_is_error() {
        let err = lex_error("a = 1\n  b = 2\n\tc = 3");
        assert_eq!(err.kind, LexErrorKind::InconsistentIndentation);
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_non_multiple_indent_is_error() {
        let err = lex_error("a = 1\n  b = 2\n   c = 3");
        assert_eq!(err.kind, LexErrorKind::InconsistentIndentation);
    }

    #[test]
    fn test_mixed_indent_run_is_error() {
        let err = lex_error("a = 1\n \tb = 2");
        assert_eq!(err.kind, LexErrorKind::InconsistentIndentation);
    }

    #[test]
    fn test_blank_lines_do_not_indent() {
        assert_eq!(
            kinds("a = 1\n   \n \t # note\nb = 2"),
            vec![
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Newline,
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_block_comment_lines_do_not_indent() {
        assert_eq!(
            kinds("a = 1\n   #: note :#\n  b = 2"),
            vec![
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Newline,
                TokenKind::Indent(1),
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_indented_block_comment_spanning_lines() {
        let src = "a = 1\n \t#: one\n two :# # tail\n\tb = 2";
        let tokens = Lexer::new(src).tokenize().unwrap();
        let b = tokens.iter().find(|t| t.span.text(src) == "b");
        assert_eq!(b.map(|t| t.span.line), Some(4));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Indent(1)));
    }

    #[test]
    fn test_code_after_block_comment_keeps_indent() {
        assert_eq!(
            kinds("a = 1\n  #: c :# b = 2"),
            vec![
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Indent(1),
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_indent_at_start_of_source() {
        assert_eq!(
            kinds("\tx"),
            vec![TokenKind::Indent(1), TokenKind::Identifier]
        );
    }

    #[test]
    fn test_spans_and_lines() {
        let src = "ab = 10\ncd = 2";
        let tokens = Lexer::new(src).tokenize().unwrap();

        let ab = tokens.get(0).unwrap();
        assert_eq!(ab.span.text(src), "ab");
        assert_eq!(ab.span.line, 1);

        let ten = tokens.get(2).unwrap();
        assert_eq!(ten.span.text(src), "10");

        let cd = tokens.get(4).unwrap();
        assert_eq!(cd.span.text(src), "cd");
        assert_eq!(cd.span.line, 2);

        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.span.line, 2);
    }

    #[test]
    fn test_token_buffer_grows_from_tiny_capacity() {
        let tokens = Lexer::with_capacity("a = 1 + 2 + 3 + 4", 1).tokenize().unwrap();
        assert_eq!(tokens.len(), 10);
        assert!(tokens.len() <= tokens.capacity());
    }
}
