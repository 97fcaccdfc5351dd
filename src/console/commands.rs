use thiserror::Error;

/// A debugger console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Continue,
    SetBreakpoints(Vec<usize>),
    ClearBreakpoints(Vec<usize>),
    ListBreakpoints,
    PrintSource,
    DisplayFunction,
    PrintRecords,
    PrintVariables,
    StepOut,
    StepOver,
    StepInto,
    PrintCallStack,
    Trace,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no command entered")]
    Empty,
    #[error("unbalanced quotes in command")]
    Unbalanced,
    #[error("could not interpret command {0}, please enter a new command")]
    Unknown(String),
    #[error("'{0}' is not a line number")]
    BadLine(String),
    #[error("{0} needs at least one line number")]
    MissingLines(String),
}

/// (usage, description) pairs for the help menu.
pub const HELP: &[(&str, &str)] = &[
    ("c", "Continue execution of program until next break point."),
    ("sot", "Step out: continue execution until the current function returns."),
    ("sov", "Step over current line."),
    ("sin", "Step into the current line."),
    ("sb <lines>", "Set break points on the given lines."),
    ("cb <lines>", "Clear break points on the given lines."),
    ("b", "Print current break points."),
    ("p", "Print annotated source code."),
    ("dfn", "Display the current function indicating current point of execution."),
    ("stk", "Print the function call stack."),
    ("fest", "Print the function environment record stack."),
    ("tr", "Turn on function call tracing."),
    ("v", "Print all the current variables and their values."),
    ("help/?", "Print this help menu."),
    ("quit", "Halt execution of the current program."),
];

fn line_numbers(symbol: &str, args: &[String]) -> Result<Vec<usize>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::MissingLines(symbol.to_string()));
    }
    args.iter()
        .map(|arg| {
            arg.parse()
                .map_err(|_| CommandError::BadLine(arg.clone()))
        })
        .collect()
}

pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let tokens = shlex::split(input).ok_or(CommandError::Unbalanced)?;
    let Some((symbol, args)) = tokens.split_first() else {
        return Err(CommandError::Empty);
    };

    let command = match symbol.as_str() {
        "?" | "help" => Command::Help,
        "c" => Command::Continue,
        "sb" => Command::SetBreakpoints(line_numbers(symbol, args)?),
        "cb" => Command::ClearBreakpoints(line_numbers(symbol, args)?),
        "b" | "breaks" => Command::ListBreakpoints,
        "p" => Command::PrintSource,
        "dfn" => Command::DisplayFunction,
        "fest" => Command::PrintRecords,
        "v" => Command::PrintVariables,
        "sot" => Command::StepOut,
        "sov" => Command::StepOver,
        "sin" => Command::StepInto,
        "stk" => Command::PrintCallStack,
        "tr" => Command::Trace,
        "quit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}
