mod protocol;
mod server;

use std::io;

pub use protocol::{
    read_message, write_message, DapMessage, DapMessageContent, MAX_CONTENT_LENGTH,
};
pub use server::{read_source, DapServer};

/// Serve the Debug Adapter Protocol on stdin/stdout.
pub fn run_dap_mode() -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut server = DapServer::new(stdin.lock(), stdout.lock());
    server.run()
}
