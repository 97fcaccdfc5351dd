use anyhow::{Context, Result};
use bytecode_debugger::config::Cli;
use bytecode_debugger::console::ConsoleUi;
use bytecode_debugger::dap;
use bytecode_debugger::debugger::DebuggerVm;
use bytecode_debugger::executor::{Console, LineReader, Machine};
use bytecode_debugger::parser::{self, InstructionSet};
use clap::Parser;
use std::io;
use tracing::{info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .init();

    if cli.dap {
        info!("starting in DAP mode");
        return dap::run_dap_mode().context("DAP session failed");
    }

    let Some(program_path) = cli.program.as_deref() else {
        anyhow::bail!("no bytecode program given");
    };
    let set = if cli.debug {
        InstructionSet::Debug
    } else {
        InstructionSet::Base
    };
    let loaded = parser::load_file(program_path, set)?;
    for skipped in &loaded.skipped {
        warn!(
            line = skipped.line_number,
            text = %skipped.text,
            reason = %skipped.reason,
            "skipped malformed bytecode line"
        );
    }

    if cli.debug {
        let source = cli
            .source_path()
            .map(|path| dap::read_source(&path))
            .unwrap_or_default();
        let vm = DebuggerVm::new(loaded.program, source, Console::stdio());
        let mut ui = ConsoleUi::new(vm, LineReader::Stdin, io::stdout());
        ui.run().context("program aborted")?;
    } else {
        let mut machine = Machine::new(loaded.program, Console::stdio());
        machine.run().context("program aborted")?;
        println!("Execution Finished");
    }
    Ok(())
}
