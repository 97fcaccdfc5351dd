use super::console::Console;
use super::runtime_stack::RuntimeStack;
use crate::error::VmError;
use crate::program::{Instruction, Program};
use tracing::trace;

/// Everything an instruction may touch while it executes.
pub struct State {
    pub pc: usize,
    pub stack: RuntimeStack,
    pub return_addrs: Vec<usize>,
    pub running: bool,
    pub halted: bool,
    pub dumping: bool,
    pub console: Console,
}

impl State {
    pub fn new(console: Console) -> Self {
        Self {
            pc: 0,
            stack: RuntimeStack::new(),
            return_addrs: Vec::new(),
            running: false,
            halted: false,
            dumping: false,
            console,
        }
    }

    /// Clear all execution state, keeping the console.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.stack = RuntimeStack::new();
        self.return_addrs.clear();
        self.running = false;
        self.halted = false;
        self.dumping = false;
    }

    pub fn halt(&mut self) {
        self.running = false;
        self.halted = true;
    }

    pub fn dump_stack(&mut self) -> Result<(), VmError> {
        let rendered = self.stack.to_string();
        self.console.write_line(&rendered)
    }

    /// With dumping on, echo each executed instruction followed by the stack.
    pub fn dump_after(&mut self, instr: &Instruction) -> Result<(), VmError> {
        if self.dumping && !matches!(instr, Instruction::Dump(_)) {
            self.console.write_line(&instr.to_string())?;
            self.dump_stack()?;
        }
        Ok(())
    }
}

/// The plain fetch-execute machine.
pub struct Machine {
    pub program: Program,
    pub state: State,
}

impl Machine {
    pub fn new(program: Program, console: Console) -> Self {
        Self {
            program,
            state: State::new(console),
        }
    }

    pub fn initialize(&mut self) {
        self.state.reset();
    }

    /// Run until HALT, the end of the program, or an error. Errors leave the
    /// machine halted.
    pub fn continue_running(&mut self) -> Result<(), VmError> {
        self.state.running = !self.state.halted;
        while self.state.running {
            if let Err(err) = self.step() {
                self.state.halt();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Execute one instruction. Running off the end halts.
    pub fn step(&mut self) -> Result<(), VmError> {
        let Some(instr) = self.program.get(self.state.pc) else {
            self.state.halt();
            return Ok(());
        };
        trace!(pc = self.state.pc, %instr, "execute");
        instr.execute(&mut self.state)?;
        self.state.dump_after(instr)?;
        self.state.pc += 1;
        Ok(())
    }

    pub fn done_executing(&self) -> bool {
        self.state.halted
    }

    /// Convenience for non-interactive runs.
    pub fn run(&mut self) -> Result<(), VmError> {
        self.initialize();
        self.continue_running()
    }
}
