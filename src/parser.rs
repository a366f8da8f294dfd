use log::{debug, trace};

use crate::bytecode::{CodeBuffer, Op};
use crate::config::Config;
use crate::lang::operator::{self, Operator};
use crate::lexer::TokenStream;
use crate::parser_error::{ParseErrorKind, ParserError};
use crate::token::{Token, TokenKind};

/// Single-pass parser and code emitter for Poly.
///
/// The parser consumes the token stream produced by the lexer and writes
/// bytecode straight into a [`CodeBuffer`]; no syntax tree is built.
///
/// Grammar, one statement per line:
///
/// ```text
/// statement := identifier (',' identifier)* '=' expression (',' expression)*
/// ```
///
/// Expressions are compiled with the shunting-yard algorithm, so operands are
/// emitted as soon as they are seen and operators follow in postfix order.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    code: CodeBuffer,
    /// Pending operators of the expression being parsed.
    operators: Vec<&'static Operator>,
    max_operators: usize,
    /// Scope level the emitted code currently runs in.
    scope: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t TokenStream) -> Self {
        Self::with_config(tokens, &Config::default())
    }

    pub fn with_config(tokens: &'t TokenStream, config: &Config) -> Self {
        Parser {
            tokens: tokens.as_slice(),
            pos: 0,
            code: CodeBuffer::with_capacity(config.initial_capacity),
            operators: Vec::with_capacity(config.max_operators),
            max_operators: config.max_operators,
            scope: 0,
        }
    }

    fn current(&self) -> Option<&'t Token> {
        let tokens = self.tokens;
        tokens.get(self.pos)
    }

    /// Kind of the current token. Running off the end reads as `Eof`.
    fn peek(&self) -> TokenKind {
        self.current().map_or(TokenKind::Eof, |t| t.kind)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Line of the current token, or of the last token once past the end.
    fn line(&self) -> usize {
        self.current()
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.span.line)
    }

    fn error(&self, kind: ParseErrorKind, message: impl Into<String>) -> ParserError {
        ParserError {
            kind,
            message: message.into(),
            line: self.line(),
        }
    }

    fn unexpected(&self, context: &str) -> ParserError {
        let found = match self.current() {
            Some(token) => format!("'{}'", token),
            None => "end of input".to_string(),
        };
        self.error(
            ParseErrorKind::IncorrectSyntax,
            format!("incorrect syntax: unexpected {} {}", found, context),
        )
    }

    /// Parses the whole token stream into bytecode terminated by `Op::End`.
    pub fn parse(mut self) -> Result<CodeBuffer, ParserError> {
        let mut level = 0;

        loop {
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    level = 0;
                    self.advance();
                }
                TokenKind::Indent(n) => {
                    level = n;
                    self.advance();
                }
                TokenKind::Identifier => {
                    self.enter_scope(level);
                    self.parse_statement()?;
                }
                _ => return Err(self.unexpected("at start of statement")),
            }
        }

        let line = self.line();
        self.code.emit(Op::End, line);

        debug!("emitted {} instructions", self.code.len());
        Ok(self.code)
    }

    fn enter_scope(&mut self, level: usize) {
        if level != self.scope {
            self.code.emit(Op::Scope(level), self.line());
            self.scope = level;
        }
    }

    fn parse_statement(&mut self) -> Result<(), ParserError> {
        let line = self.line();
        let mut targets = 0;

        loop {
            match self.current() {
                Some(token) if token.kind == TokenKind::Identifier => {
                    if let Some(name) = token.literal.clone() {
                        self.code.emit(Op::Literal(name), token.span.line);
                    }
                    targets += 1;
                    self.advance();
                }
                _ => return Err(self.unexpected("where an identifier was expected")),
            }

            if self.peek() != TokenKind::Comma {
                break;
            }
            self.advance();
        }

        if self.peek() != TokenKind::Eq {
            return Err(self.unexpected("where '=' was expected"));
        }
        self.advance();

        let mut values = 0;
        loop {
            self.parse_expression()?;
            values += 1;

            if self.peek() != TokenKind::Comma {
                break;
            }
            self.advance();
        }

        if !self.peek().is_line_end() {
            return Err(self.unexpected("after expression"));
        }

        if targets != values {
            return Err(ParserError {
                kind: ParseErrorKind::IncorrectSyntax,
                message: format!(
                    "incorrect syntax: {} variable(s) but {} value(s)",
                    targets, values
                ),
                line,
            });
        }

        trace!("statement at line {} assigns {} variable(s)", line, targets);
        self.code.emit(Op::Assign(targets), line);
        Ok(())
    }

    fn push_operator(&mut self, operator: &'static Operator) -> Result<(), ParserError> {
        if self.operators.len() >= self.max_operators {
            return Err(self.error(
                ParseErrorKind::OperatorStackOverflow,
                format!("operator stack overflow (limit {})", self.max_operators),
            ));
        }
        self.operators.push(operator);
        Ok(())
    }

    fn emit_operator(&mut self, operator: &Operator, line: usize) {
        if let Some(op) = &operator.op {
            self.code.emit(op.clone(), line);
        }
    }

    /// Compiles one expression, stopping before `,`, a newline or end of input.
    fn parse_expression(&mut self) -> Result<(), ParserError> {
        self.operators.clear();

        let mut prev: Option<TokenKind> = None;
        let mut expect_operand = true;

        while let Some(token) = self.current() {
            let kind = token.kind;
            let line = token.span.line;

            if kind.is_line_end() || kind == TokenKind::Comma {
                break;
            }

            if kind.is_operand() {
                if !expect_operand {
                    return Err(self.unexpected("after a complete operand"));
                }
                if let Some(value) = token.literal.clone() {
                    self.code.emit(Op::Literal(value), line);
                }
                expect_operand = false;
            } else if kind == TokenKind::LParen {
                if !expect_operand {
                    return Err(self.unexpected("after a complete operand"));
                }
                if let Some(paren) = operator::lookup(kind) {
                    self.push_operator(paren)?;
                }
            } else if kind == TokenKind::RParen {
                if expect_operand {
                    return Err(self.unexpected("where an operand was expected"));
                }
                loop {
                    match self.operators.pop() {
                        None => {
                            return Err(self.error(
                                ParseErrorKind::UnmatchedParen,
                                "no matching ')'",
                            ));
                        }
                        Some(top) if top.kind == TokenKind::LParen => break,
                        Some(top) => self.emit_operator(top, line),
                    }
                }
            } else if let Some(found) = operator::lookup(kind) {
                let unary_position = match prev {
                    None => true,
                    Some(p) => p != TokenKind::RParen && operator::lookup(p).is_some(),
                };

                let resolved = if unary_position
                    && matches!(kind, TokenKind::Minus | TokenKind::Plus)
                {
                    operator::lookup_unary(kind).unwrap_or(found)
                } else {
                    found
                };

                if resolved.unary {
                    if !expect_operand {
                        return Err(self.unexpected("after a complete operand"));
                    }
                    // Prefix operators have no left operand to reduce.
                    if resolved.op.is_some() {
                        self.push_operator(resolved)?;
                    }
                } else {
                    if expect_operand {
                        return Err(self.unexpected("where an operand was expected"));
                    }
                    while let Some(top) = self.operators.last().copied() {
                        if !top.yields_to(resolved) {
                            break;
                        }
                        self.operators.pop();
                        self.emit_operator(top, line);
                    }
                    self.push_operator(resolved)?;
                    expect_operand = true;
                }
            } else {
                return Err(self.unexpected("in expression"));
            }

            prev = Some(kind);
            self.advance();
        }

        if expect_operand {
            return Err(self.unexpected("where an expression was expected"));
        }

        let line = self.line();
        while let Some(top) = self.operators.pop() {
            if top.kind == TokenKind::LParen {
                return Err(self.error(ParseErrorKind::UnmatchedParen, "no matching ')'"));
            }
            self.emit_operator(top, line);
        }

        Ok(())
    }
}
