//! Poly: a small indentation-sensitive scripting language.
//!
//! Source text goes through three stages, all driven by [`Vm::interpret`]:
//! the [`lexer`] produces tokens, the [`parser`] emits bytecode into a
//! [`CodeBuffer`](bytecode::CodeBuffer), and the [`Vm`] runs it against a stack
//! of hashed scopes.
//!
//! ```
//! let mut vm = poly::Vm::new();
//! vm.interpret("a = 3 + 4 * 2\nb = a ^ 2").unwrap();
//! assert_eq!(vm.get("b"), Some(&poly::Value::Number(121.0)));
//! ```

pub mod buffer;
pub mod bytecode;
pub mod config;
pub mod error;
pub mod lang;
pub mod lexer;
pub mod parser;
pub mod parser_error;
pub mod runtime;
pub mod token;
pub mod token_dumper;

pub use config::Config;
pub use error::Error;
pub use lang::value::Value;
pub use runtime::vm::Vm;
