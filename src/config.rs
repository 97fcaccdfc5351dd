use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Run compiled bytecode, optionally under the source-level debugger.
#[derive(Debug, Parser)]
#[command(name = "bytecode-debugger", version)]
pub struct Cli {
    /// Bytecode file, e.g. `fib.x.cod`.
    #[arg(value_name = "PROGRAM", required_unless_present = "dap")]
    pub program: Option<PathBuf>,

    /// Run under the interactive console debugger.
    #[arg(short, long)]
    pub debug: bool,

    /// Serve the Debug Adapter Protocol on stdin/stdout.
    #[arg(long, conflicts_with = "debug")]
    pub dap: bool,

    /// Source listing shown by the debugger. Defaults to PROGRAM without its
    /// `.cod` extension.
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Log level for diagnostics on stderr.
    #[arg(long, default_value = "warn")]
    pub log_level: Level,
}

impl Cli {
    pub fn source_path(&self) -> Option<PathBuf> {
        self.source
            .clone()
            .or_else(|| self.program.as_deref().map(default_source_path))
    }
}

/// `fib.x.cod` -> `fib.x`. Paths without a `.cod` extension are returned as is.
pub fn default_source_path(program: &Path) -> PathBuf {
    match program.extension() {
        Some(ext) if ext == "cod" => program.with_extension(""),
        _ => program.to_path_buf(),
    }
}
