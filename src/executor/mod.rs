mod console;
mod machine;
mod runtime_stack;

pub use console::{Console, LineReader, SharedBuffer};
pub use machine::{Machine, State};
pub use runtime_stack::RuntimeStack;
