use serde::{Deserialize, Serialize};

/// Runtime value in the Poly language.
///
/// Values are the only data that can exist on the operand stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit floating-point number. Poly has no separate integer type.
    Number(f64),

    /// `true` or `false`.
    Boolean(bool),

    /// Name of a variable.
    ///
    /// Only ever used as a lookup key; the VM resolves it before a result
    /// becomes visible, so a variable never holds an identifier.
    Identifier(String),
}

impl Value {
    /// Name of the value's kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Identifier(_) => "identifier",
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Value::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    /// Format a value using Poly surface syntax.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Identifier(name) => write!(f, "{}", name),
        }
    }
}
