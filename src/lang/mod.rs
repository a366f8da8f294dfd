//! # Poly language model
//!
//! Runtime values and the operator table shared by the parser and the VM.

pub mod operator;
pub mod value;
