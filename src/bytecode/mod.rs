pub mod disasm;
pub mod ir;
pub mod op;

pub use ir::{CodeBuffer, EncodeError};
pub use op::Op;
