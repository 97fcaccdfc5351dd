mod breakpoints;
mod records;
mod stepping;
mod vm;

pub use breakpoints::Breakpoints;
pub use records::{FunctionEnvironmentRecord, RecordStack};
pub use stepping::{RunMode, Snapshot};
pub use vm::{DebuggerVm, StopReason};
