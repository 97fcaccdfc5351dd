use super::commands::{parse_command, Command, CommandError, HELP};
use crate::debugger::DebuggerVm;
use crate::error::VmError;
use crate::executor::LineReader;
use std::io::Write;
use tracing::debug;

const RULE: &str = " -------------------";

/// Interactive console driving a `DebuggerVm`. Reads commands from `input`
/// and writes everything it prints to `out`.
pub struct ConsoleUi<W> {
    vm: DebuggerVm,
    input: LineReader,
    out: W,
}

impl<W: Write> ConsoleUi<W> {
    pub fn new(vm: DebuggerVm, input: LineReader, out: W) -> Self {
        Self { vm, input, out }
    }

    pub fn vm(&self) -> &DebuggerVm {
        &self.vm
    }

    pub fn into_parts(self) -> (DebuggerVm, W) {
        (self.vm, self.out)
    }

    /// Run the session until the program halts or the user quits. End of
    /// input counts as `quit`.
    pub fn run(&mut self) -> Result<(), VmError> {
        self.vm.initialize();
        writeln!(self.out, "-----Running in Debugger Mode-----")?;
        self.print_source()?;

        while !self.vm.done_executing() {
            write!(self.out, "Type ? for help\n> ")?;
            self.out.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                self.vm.turn_off_vm();
                break;
            }
            match parse_command(&line) {
                Ok(command) => self.dispatch(command)?,
                Err(CommandError::Empty) => {}
                Err(err) => writeln!(self.out, "{err}")?,
            }
        }

        writeln!(self.out, "Execution Finished")?;
        Ok(())
    }

    pub fn dispatch(&mut self, command: Command) -> Result<(), VmError> {
        debug!(?command, "console command");
        match command {
            Command::Help => self.help_menu()?,
            Command::Continue => self.resume()?,
            Command::SetBreakpoints(lines) => {
                for line in lines {
                    if !self.vm.set_breakpoint(line) {
                        writeln!(self.out, "{line} is not a valid break point")?;
                    }
                }
                self.print_breakpoints()?;
                self.print_source()?;
            }
            Command::ClearBreakpoints(lines) => {
                for line in lines {
                    self.vm.clear_breakpoint(line);
                }
                self.print_breakpoints()?;
            }
            Command::ListBreakpoints => self.print_breakpoints()?,
            Command::PrintSource => self.print_source()?,
            Command::DisplayFunction => self.print_current_function()?,
            Command::PrintRecords => self.print_records()?,
            Command::PrintVariables => self.print_variables()?,
            Command::StepOut => {
                self.vm.set_step_out_flag();
                self.resume()?;
            }
            Command::StepOver => {
                self.vm.set_step_over_flag();
                self.resume()?;
            }
            Command::StepInto => {
                self.vm.set_step_into_flag();
                self.resume()?;
            }
            Command::PrintCallStack => self.print_call_stack()?,
            Command::Trace => {
                self.vm.turn_on_stack_trace();
                writeln!(self.out, "Stack Tracing is now ON.")?;
            }
            Command::Quit => self.vm.turn_off_vm(),
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<(), VmError> {
        self.vm.continue_running()?;
        if !self.vm.done_executing() {
            self.print_current_function()?;
        }
        Ok(())
    }

    fn help_menu(&mut self) -> Result<(), VmError> {
        writeln!(self.out, "The following are valid commands:")?;
        for (usage, description) in HELP {
            writeln!(self.out, "\t{usage:<10}\t{description}")?;
        }
        Ok(())
    }

    fn print_breakpoints(&mut self) -> Result<(), VmError> {
        let lines = self.vm.breakpoints();
        if lines.is_empty() {
            writeln!(self.out, "There are no breakpoints set.")?;
        } else {
            let listed: Vec<String> = lines.iter().map(usize::to_string).collect();
            writeln!(self.out, "Breakpoints currently set at lines: {}", listed.join(" "))?;
        }
        Ok(())
    }

    fn print_source(&mut self) -> Result<(), VmError> {
        writeln!(self.out, "Source Code:\n{RULE}")?;
        self.print_source_between(1, self.vm.source_code_size())?;
        writeln!(self.out, "{RULE}")?;
        Ok(())
    }

    /// Annotated listing: `**` marks a breakpoint, an arrow the current line.
    fn print_source_between(&mut self, start: usize, end: usize) -> Result<(), VmError> {
        let current = self.vm.current_line_number();
        for line_no in start.max(1)..=end.min(self.vm.source_code_size()) {
            let text = self.vm.source_code_line(line_no).unwrap_or_default();
            let mark = if self.vm.is_breakpoint_set(line_no) { "**" } else { " " };
            let here = if current == Some(line_no) {
                "\t <================"
            } else {
                ""
            };
            writeln!(self.out, "{mark:>2}{line_no:>2}: {text} {here}")?;
        }
        Ok(())
    }

    fn print_current_function(&mut self) -> Result<(), VmError> {
        if self.vm.is_current_record_empty() {
            writeln!(self.out, "Not currently in a function")?;
            return Ok(());
        }
        let name = self.vm.current_function_name().unwrap_or_default().to_string();
        writeln!(self.out, "--- Current Function:  {name}\n")?;
        let (Some(start), Some(end)) = (
            self.vm.current_function_start_line(),
            self.vm.current_function_end_line(),
        ) else {
            writeln!(self.out, "(native function)")?;
            return Ok(());
        };
        self.print_source_between(start, end)?;
        writeln!(self.out, "{RULE}")?;
        Ok(())
    }

    /// Innermost call first, each level indented one more space.
    fn print_call_stack(&mut self) -> Result<(), VmError> {
        for n in (0..self.vm.size_of_function_call_stack()).rev() {
            let name = self.vm.nth_function_name(n).unwrap_or("<native>").to_string();
            let start = self
                .vm
                .nth_function_start_line(n)
                .map_or_else(|| "-".to_string(), |l| l.to_string());
            writeln!(self.out, "{}{name}  line:{start}", " ".repeat(n))?;
        }
        Ok(())
    }

    fn print_records(&mut self) -> Result<(), VmError> {
        for n in (0..self.vm.size_of_function_call_stack()).rev() {
            if let Some(record) = self.vm.stringify_function_environment_record(n) {
                writeln!(self.out, "{record}")?;
            }
        }
        Ok(())
    }

    fn print_variables(&mut self) -> Result<(), VmError> {
        writeln!(self.out, "Current Variables:")?;
        let rows: Vec<(String, Option<i32>)> = self
            .vm
            .current_variables()
            .into_iter()
            .map(|name| (name.to_string(), self.vm.variable_value(name)))
            .collect();
        for (name, value) in rows {
            match value {
                Some(value) => writeln!(self.out, "{name:>10} : {value}")?,
                None => writeln!(self.out, "{name:>10} : <unavailable>")?,
            }
        }
        Ok(())
    }
}
