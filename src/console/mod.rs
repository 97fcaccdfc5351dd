mod commands;
mod ui;

pub use commands::{parse_command, Command, CommandError, HELP};
pub use ui::ConsoleUi;
