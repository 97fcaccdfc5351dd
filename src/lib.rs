pub mod config;
pub mod console;
pub mod dap;
pub mod debugger;
pub mod error;
pub mod executor;
pub mod parser;
pub mod program;

pub use error::{LoadError, VmError};
