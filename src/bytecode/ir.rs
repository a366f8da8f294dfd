use serde::{Deserialize, Serialize};

use crate::buffer::GrowBuffer;
use crate::bytecode::Op;

/// A compiled instruction stream together with the source line of every op.
///
/// `ops` and `lines` always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBuffer {
    ops: GrowBuffer<Op>,
    lines: GrowBuffer<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("bytecode encoding failed: {0}")]
    Postcard(#[from] postcard::Error),
    #[error("bytecode is malformed: {0}")]
    Malformed(&'static str),
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: GrowBuffer::with_capacity(capacity),
            lines: GrowBuffer::with_capacity(capacity),
        }
    }

    pub fn emit(&mut self, op: Op, line: usize) {
        self.ops.push(op);
        self.lines.push(line);
    }

    pub fn ops(&self) -> &[Op] {
        self.ops.as_slice()
    }

    pub fn line(&self, ip: usize) -> Option<usize> {
        self.lines.get(ip).copied()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Serializes the buffer into its compact binary form.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(postcard::to_allocvec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EncodeError> {
        let code: CodeBuffer = postcard::from_bytes(bytes)?;

        if code.ops.len() != code.lines.len() {
            return Err(EncodeError::Malformed("line table does not match instructions"));
        }
        if code.ops.last() != Some(&Op::End) {
            return Err(EncodeError::Malformed("instruction stream is not terminated"));
        }

        Ok(code)
    }
}

impl Default for CodeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::value::Value;

    fn sample() -> CodeBuffer {
        let mut code = CodeBuffer::with_capacity(1);
        code.emit(Op::Literal(Value::Identifier("a".to_string())), 1);
        code.emit(Op::Literal(Value::Number(2.5)), 1);
        code.emit(Op::Literal(Value::Boolean(true)), 1);
        code.emit(Op::Neg, 1);
        code.emit(Op::Assign(1), 1);
        code.emit(Op::End, 2);
        code
    }

    #[test]
    fn test_encoded_bytes_decode_to_same_code() {
        let code = sample();
        let bytes = code.encode().unwrap();
        assert_eq!(CodeBuffer::decode(&bytes).unwrap(), code);
    }

    #[test]
    fn test_line_table_follows_ops() {
        let code = sample();
        assert_eq!(code.len(), 6);
        assert_eq!(code.line(0), Some(1));
        assert_eq!(code.line(5), Some(2));
        assert_eq!(code.line(6), None);
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        let bytes = sample().encode().unwrap();
        assert!(CodeBuffer::decode(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn test_decode_rejects_unterminated_stream() {
        let mut code = CodeBuffer::new();
        code.emit(Op::Literal(Value::Number(1.0)), 1);
        let bytes = code.encode().unwrap();
        assert!(matches!(
            CodeBuffer::decode(&bytes),
            Err(EncodeError::Malformed(_))
        ));
    }
}
