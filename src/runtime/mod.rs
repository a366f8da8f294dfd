pub mod runtime_error;
pub mod scope;
pub mod vm;
