use crate::bytecode::Op;
use crate::lang::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// Operand kinds do not fit the operator.
    IllegalOperands,
    IdentifierExpected,
    UndefinedVariable,
    StackOverflow,
    StackEmpty,
    /// Indentation deeper than the configured number of scopes.
    ScopeOverflow,
    /// Every slot of a scope's variable table is taken.
    ScopeFull,
    /// Encoded bytecode could not be loaded.
    Decode,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}{}", line_prefix(.line), .message)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
    /// Source line of the failing instruction, when known.
    pub line: Option<usize>,
}

fn line_prefix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("line {}: ", line),
        None => String::new(),
    }
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
            line: None,
        }
    }

    /// Attaches a line unless one is already set.
    pub fn with_line(mut self, line: Option<usize>) -> Self {
        if self.line.is_none() {
            self.line = line;
        }
        self
    }
}

pub fn illegal_operands(op: &Op, operands: &[&Value]) -> RuntimeError {
    let kinds: Vec<&str> = operands.iter().map(|v| v.kind_name()).collect();
    RuntimeError::new(
        RuntimeErrorKind::IllegalOperands,
        format!("operands are illegal: {} on {}", op.name(), kinds.join(" and ")),
    )
}

pub fn identifier_expected(found: &Value) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::IdentifierExpected,
        format!("identifier expected, got {} {}", found.kind_name(), found),
    )
}

pub fn undefined_variable(name: &str) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::UndefinedVariable,
        format!("undefined variable '{}'", name),
    )
}

pub fn stack_overflow(limit: usize) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::StackOverflow,
        format!("stack overflow (limit {})", limit),
    )
}

pub fn stack_empty() -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::StackEmpty, "stack is empty")
}

pub fn scope_overflow(level: usize, limit: usize) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::ScopeOverflow,
        format!("indentation level {} exceeds the {} available scopes", level, limit),
    )
}

pub fn scope_full(name: &str, slots: usize) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::ScopeFull,
        format!("cannot store '{}': all {} scope slots are in use", name, slots),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_and_without_line() {
        let err = stack_empty();
        assert_eq!(err.to_string(), "stack is empty");

        let err = err.with_line(Some(4));
        assert_eq!(err.to_string(), "line 4: stack is empty");

        // The first line attached wins.
        assert_eq!(err.with_line(Some(9)).line, Some(4));
    }
}
