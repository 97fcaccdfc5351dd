use super::breakpoints::Breakpoints;
use super::records::{FunctionEnvironmentRecord, RecordStack};
use super::stepping::{RunMode, Snapshot};
use crate::error::VmError;
use crate::executor::{Console, Machine, RuntimeStack, State};
use crate::program::{Instruction, Program};
use tracing::{debug, trace};

/// Why `continue_running` handed control back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Breakpoint { line: usize },
    Step,
    Halted,
}

/// Debug-layer state that instructions mutate as they execute.
#[derive(Debug, Default)]
struct DebugState {
    records: RecordStack,
    breakpoints: Breakpoints,
    tracing: bool,
    breakpoint_hit: Option<usize>,
}

impl DebugState {
    /// Base effect plus the debug side effects of each instruction. Every
    /// CALL/RETURN moves the return-address stack, the frame stack and the
    /// record stack together.
    fn execute(&mut self, instr: &Instruction, state: &mut State) -> Result<(), VmError> {
        match instr {
            Instruction::Call(jump) => {
                instr.execute(state)?;
                self.records.begin_scope();
                debug!(label = %jump.label, depth = self.records.len(), "call");
            }
            Instruction::Return { .. } => {
                if self.tracing {
                    self.trace_exit(state)?;
                }
                instr.execute(state)?;
                self.records.pop();
                debug!(depth = self.records.len(), "return");
            }
            Instruction::Lit { name: Some(name), .. } => {
                instr.execute(state)?;
                let offset = state.stack.current_offset();
                self.records.current_mut().enter(name, offset);
            }
            Instruction::Load {
                offset,
                name: Some(name),
            }
            | Instruction::Store {
                offset,
                name: Some(name),
            } => {
                instr.execute(state)?;
                self.records.current_mut().enter(name, *offset);
            }
            Instruction::Pop(_) => {
                instr.execute(state)?;
                let frame_size = state.stack.current_frame_size();
                self.records.current_mut().forget_from(frame_size);
            }
            Instruction::Line(Some(line)) => {
                self.records.current_mut().set_current_line(*line);
                if self.breakpoints.contains(*line) {
                    debug!(line, "breakpoint hit");
                    state.running = false;
                    self.breakpoint_hit = Some(*line);
                }
            }
            Instruction::Function { name, start, end } => {
                self.records.current_mut().set_function(name, *start, *end);
                if self.tracing && self.records.len() > 1 {
                    self.trace_entry(name, state)?;
                }
            }
            Instruction::Formal { name, offset } => {
                let record = self.records.current_mut();
                let offset = offset.unwrap_or_else(|| record.variable_count());
                record.enter(name, offset);
            }
            _ => instr.execute(state)?,
        }
        Ok(())
    }

    /// One `-` per active call below the callee.
    fn indent(&self) -> String {
        "-".repeat(self.records.len().saturating_sub(1))
    }

    /// `-name(a,b)`: arguments are the callee's frame, comma separated. Only
    /// called for FUNCTION inside a call, so the outermost scope's own
    /// FUNCTION prints nothing.
    fn trace_entry(&self, name: &str, state: &mut State) -> Result<(), VmError> {
        let args: Vec<String> = state
            .stack
            .current_frame()
            .iter()
            .map(i32::to_string)
            .collect();
        let line = format!("{}{}({})", self.indent(), name, args.join(","));
        state.console.write_line(&line)
    }

    fn trace_exit(&self, state: &mut State) -> Result<(), VmError> {
        let name = self.records.current().name.as_deref().unwrap_or("<native>");
        let value = state.stack.peek()?;
        let line = format!("{}exit: {}: {}", self.indent(), name, value);
        state.console.write_line(&line)
    }
}

/// The machine run under the debugger: breakpoints, stepping, tracing and
/// introspection of the active calls.
pub struct DebuggerVm {
    machine: Machine,
    debug: DebugState,
    source: Vec<String>,
    mode: RunMode,
}

impl DebuggerVm {
    pub fn new(program: Program, source: Vec<String>, console: Console) -> Self {
        let breakpoints = Breakpoints::new(program.line_numbers());
        Self {
            machine: Machine::new(program, console),
            debug: DebugState {
                breakpoints,
                ..DebugState::default()
            },
            source,
            mode: RunMode::Continue,
        }
    }

    /// Reset execution state and open the outermost scope. Breakpoints and
    /// the tracing switch survive.
    pub fn initialize(&mut self) {
        self.machine.initialize();
        self.debug.records = RecordStack::new();
        self.debug.breakpoint_hit = None;
        self.mode = RunMode::Continue;
    }

    /// Run until a breakpoint line, an armed step condition, or the end of
    /// the program. A breakpoint stop also disarms any stepping mode.
    pub fn continue_running(&mut self) -> Result<StopReason, VmError> {
        if self.machine.state.halted {
            return Ok(StopReason::Halted);
        }
        self.machine.state.running = true;

        while self.machine.state.running {
            let pc = self.machine.state.pc;
            let Some(instr) = self.machine.program.get(pc) else {
                self.machine.state.halt();
                break;
            };
            trace!(pc, %instr, depth = self.debug.records.len(), "execute");

            let executed = self
                .debug
                .execute(instr, &mut self.machine.state)
                .and_then(|()| self.machine.state.dump_after(instr));
            if let Err(err) = executed {
                self.machine.state.halt();
                return Err(err);
            }
            self.machine.state.pc += 1;

            if self.machine.state.halted {
                break;
            }
            if let Some(line) = self.debug.breakpoint_hit.take() {
                self.mode = RunMode::Continue;
                return Ok(StopReason::Breakpoint { line });
            }
            let depth = self.size_of_function_call_stack();
            if self.mode.should_stop(depth, self.current_line_number()) {
                debug!(mode = ?self.mode, depth, "step complete");
                self.mode = RunMode::Continue;
                self.machine.state.running = false;
                return Ok(StopReason::Step);
            }
        }
        Ok(StopReason::Halted)
    }

    pub fn done_executing(&self) -> bool {
        self.machine.state.halted
    }

    /// Stop the program; `done_executing` becomes true.
    pub fn turn_off_vm(&mut self) {
        self.machine.state.halt();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            depth: self.size_of_function_call_stack(),
            line: self.current_line_number(),
        }
    }

    pub fn set_step_over_flag(&mut self) {
        self.mode = RunMode::StepOver(self.snapshot());
    }

    pub fn set_step_into_flag(&mut self) {
        self.mode = RunMode::StepInto(self.snapshot());
    }

    pub fn set_step_out_flag(&mut self) {
        self.mode = RunMode::StepOut(self.snapshot());
    }

    pub fn run_mode(&self) -> RunMode {
        self.mode
    }

    pub fn turn_on_stack_trace(&mut self) {
        self.debug.tracing = true;
    }

    pub fn is_tracing(&self) -> bool {
        self.debug.tracing
    }

    // Breakpoints and source

    pub fn set_breakpoint(&mut self, line: usize) -> bool {
        self.debug.breakpoints.add(line)
    }

    pub fn clear_breakpoint(&mut self, line: usize) {
        self.debug.breakpoints.remove(line);
    }

    pub fn clear_all_breakpoints(&mut self) {
        self.debug.breakpoints.clear();
    }

    pub fn is_breakpoint_set(&self, line: usize) -> bool {
        self.debug.breakpoints.contains(line)
    }

    pub fn breakpoints(&self) -> Vec<usize> {
        self.debug.breakpoints.lines()
    }

    /// 1-based.
    pub fn source_code_line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|i| self.source.get(i))
            .map(String::as_str)
    }

    pub fn source_code_size(&self) -> usize {
        self.source.len()
    }

    // Environment records

    fn current_record(&self) -> &FunctionEnvironmentRecord {
        self.debug.records.current()
    }

    pub fn size_of_function_call_stack(&self) -> usize {
        self.debug.records.len()
    }

    pub fn current_line_number(&self) -> Option<usize> {
        self.current_record().current_line
    }

    pub fn is_current_record_empty(&self) -> bool {
        self.current_record().is_empty()
    }

    pub fn current_function_name(&self) -> Option<&str> {
        self.current_record().name.as_deref()
    }

    pub fn current_function_start_line(&self) -> Option<usize> {
        self.current_record().start_line
    }

    pub fn current_function_end_line(&self) -> Option<usize> {
        self.current_record().end_line
    }

    pub fn current_variables(&self) -> Vec<&str> {
        self.current_record().variable_names()
    }

    pub fn variable_value(&self, name: &str) -> Option<i32> {
        let offset = self.current_record().offset_of(name)?;
        self.machine.state.stack.load_at(offset).ok()
    }

    pub fn nth_function_name(&self, n: usize) -> Option<&str> {
        self.debug.records.get(n)?.name.as_deref()
    }

    pub fn nth_function_start_line(&self, n: usize) -> Option<usize> {
        self.debug.records.get(n)?.start_line
    }

    pub fn stringify_function_environment_record(&self, n: usize) -> Option<String> {
        self.debug.records.get(n).map(ToString::to_string)
    }

    pub fn records(&self) -> &RecordStack {
        &self.debug.records
    }

    pub fn stack(&self) -> &RuntimeStack {
        &self.machine.state.stack
    }

    pub fn return_depth(&self) -> usize {
        self.machine.state.return_addrs.len()
    }
}
