use super::protocol::{read_message, write_message, DapMessage, DapMessageContent};
use crate::config::default_source_path;
use crate::debugger::{DebuggerVm, StopReason};
use crate::error::VmError;
use crate::executor::{Console, SharedBuffer};
use crate::parser::{self, InstructionSet};
use serde_json::{json, Value};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const THREAD_ID: u64 = 1;

/// Debug Adapter Protocol server. Requests are handled one at a time on the
/// calling thread; `continue_running` runs to its stop before the response
/// to the next request is read.
pub struct DapServer<R, W> {
    seq: u64,
    reader: R,
    writer: W,
    vm: Option<DebuggerVm>,
    output: SharedBuffer,
    source_path: Option<PathBuf>,
    pending_breakpoints: Vec<usize>,
    stop_on_entry: bool,
    launched: bool,
    configured: bool,
}

fn arg<'a>(args: &'a Option<Value>, key: &str) -> Option<&'a Value> {
    args.as_ref().and_then(|v| v.get(key))
}

impl<R: BufRead, W: Write> DapServer<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            seq: 0,
            reader,
            writer,
            vm: None,
            output: SharedBuffer::default(),
            source_path: None,
            pending_breakpoints: Vec::new(),
            stop_on_entry: true,
            launched: false,
            configured: false,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    pub fn vm(&self) -> Option<&DebuggerVm> {
        self.vm.as_ref()
    }

    /// Serve requests until `disconnect` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        while let Some(msg) = read_message(&mut self.reader)? {
            let DapMessageContent::Request { command, arguments } = msg.content else {
                debug!("ignoring non-request message");
                continue;
            };
            if !self.handle_request(msg.seq, command, arguments)? {
                break;
            }
        }
        Ok(())
    }

    /// Returns false once the client has disconnected.
    pub fn handle_request(
        &mut self,
        seq: u64,
        command: String,
        arguments: Option<Value>,
    ) -> io::Result<bool> {
        debug!(%command, seq, "DAP request");
        match command.as_str() {
            "initialize" => self.handle_initialize(seq, command)?,
            "launch" => self.handle_launch(seq, command, arguments)?,
            "setBreakpoints" => self.handle_set_breakpoints(seq, command, arguments)?,
            "configurationDone" => {
                self.configured = true;
                self.send_response(seq, command, true, None)?;
                if self.launched {
                    self.start()?;
                }
            }
            "threads" => self.handle_threads(seq, command)?,
            "stackTrace" => self.handle_stack_trace(seq, command)?,
            "scopes" => self.handle_scopes(seq, command)?,
            "variables" => self.handle_variables(seq, command)?,
            "continue" => {
                self.send_response(seq, command, true, Some(json!({"allThreadsContinued": true})))?;
                self.resume()?;
            }
            "next" => self.step(seq, command, DebuggerVm::set_step_over_flag)?,
            "stepIn" => self.step(seq, command, DebuggerVm::set_step_into_flag)?,
            "stepOut" => self.step(seq, command, DebuggerVm::set_step_out_flag)?,
            "disconnect" => {
                if let Some(vm) = self.vm.as_mut() {
                    vm.turn_off_vm();
                }
                self.send_response(seq, command, true, None)?;
                return Ok(false);
            }
            _ => {
                warn!(%command, "unhandled DAP command");
                self.send_response(seq, command, false, None)?;
            }
        }
        Ok(true)
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn send_response(
        &mut self,
        request_seq: u64,
        command: String,
        success: bool,
        body: Option<Value>,
    ) -> io::Result<()> {
        self.send_failure_or_response(request_seq, command, success, None, body)
    }

    fn send_failure_or_response(
        &mut self,
        request_seq: u64,
        command: String,
        success: bool,
        message: Option<String>,
        body: Option<Value>,
    ) -> io::Result<()> {
        let msg = DapMessage {
            seq: self.next_seq(),
            msg_type: "response".to_string(),
            content: DapMessageContent::Response {
                request_seq,
                success,
                command,
                message,
                body,
            },
        };
        write_message(&mut self.writer, &msg)
    }

    pub fn send_event(&mut self, event: &str, body: Option<Value>) -> io::Result<()> {
        let msg = DapMessage {
            seq: self.next_seq(),
            msg_type: "event".to_string(),
            content: DapMessageContent::Event {
                event: event.to_string(),
                body,
            },
        };
        write_message(&mut self.writer, &msg)
    }

    fn handle_initialize(&mut self, seq: u64, command: String) -> io::Result<()> {
        let body = json!({
            "supportsConfigurationDoneRequest": true,
            "supportsStepBack": false,
            "supportsFunctionBreakpoints": false,
            "supportsConditionalBreakpoints": false,
            "supportsSetVariable": false,
        });
        self.send_response(seq, command, true, Some(body))?;
        self.send_event("initialized", None)
    }

    fn handle_launch(&mut self, seq: u64, command: String, args: Option<Value>) -> io::Result<()> {
        let Some(program) = arg(&args, "program").and_then(Value::as_str) else {
            return self.send_failure_or_response(
                seq,
                command,
                false,
                Some("launch requires a 'program' path".to_string()),
                None,
            );
        };
        let program_path = PathBuf::from(program);
        let source_path = arg(&args, "source")
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_source_path(&program_path));
        self.stop_on_entry = arg(&args, "stopOnEntry")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let trace = arg(&args, "trace").and_then(Value::as_bool).unwrap_or(false);
        let input = arg(&args, "input").and_then(Value::as_str).unwrap_or_default();

        let loaded = match parser::load_file(&program_path, InstructionSet::Debug) {
            Ok(loaded) => loaded,
            Err(err) => {
                return self.send_failure_or_response(seq, command, false, Some(err.to_string()), None)
            }
        };
        let source = read_source(&source_path);

        let (console, output) = Console::captured(input);
        let mut vm = DebuggerVm::new(loaded.program, source, console);
        vm.initialize();
        if trace {
            vm.turn_on_stack_trace();
        }
        for line in self.pending_breakpoints.drain(..) {
            vm.set_breakpoint(line);
        }

        self.vm = Some(vm);
        self.output = output;
        self.source_path = Some(source_path);
        self.launched = true;
        self.send_response(seq, command, true, None)?;
        if self.configured {
            self.start()?;
        }
        Ok(())
    }

    fn handle_set_breakpoints(
        &mut self,
        seq: u64,
        command: String,
        args: Option<Value>,
    ) -> io::Result<()> {
        let requested: Vec<usize> = arg(&args, "breakpoints")
            .and_then(Value::as_array)
            .map(|bps| {
                bps.iter()
                    .filter_map(|bp| bp.get("line").and_then(Value::as_u64))
                    .map(|line| line as usize)
                    .collect()
            })
            .unwrap_or_default();

        let verified: Vec<Value> = match self.vm.as_mut() {
            Some(vm) => {
                vm.clear_all_breakpoints();
                requested
                    .iter()
                    .map(|&line| json!({"verified": vm.set_breakpoint(line), "line": line}))
                    .collect()
            }
            None => {
                self.pending_breakpoints = requested.clone();
                requested
                    .iter()
                    .map(|&line| json!({"verified": false, "line": line}))
                    .collect()
            }
        };

        self.send_response(seq, command, true, Some(json!({ "breakpoints": verified })))
    }

    fn handle_threads(&mut self, seq: u64, command: String) -> io::Result<()> {
        let body = json!({"threads": [{"id": THREAD_ID, "name": "main"}]});
        self.send_response(seq, command, true, Some(body))
    }

    /// One frame per environment record, innermost first.
    fn handle_stack_trace(&mut self, seq: u64, command: String) -> io::Result<()> {
        let path = self
            .source_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let frames: Vec<Value> = match &self.vm {
            Some(vm) => (0..vm.size_of_function_call_stack())
                .rev()
                .filter_map(|id| vm.records().get(id).map(|record| (id, record)))
                .map(|(id, record)| {
                    json!({
                        "id": id,
                        "name": record.name.as_deref().unwrap_or("<native>"),
                        "line": record.current_line.unwrap_or(0),
                        "column": 1,
                        "source": {"path": path},
                    })
                })
                .collect(),
            None => Vec::new(),
        };
        let body = json!({"stackFrames": frames, "totalFrames": frames.len()});
        self.send_response(seq, command, true, Some(body))
    }

    fn handle_scopes(&mut self, seq: u64, command: String) -> io::Result<()> {
        let body = json!({
            "scopes": [{"name": "Locals", "variablesReference": 1, "expensive": false}]
        });
        self.send_response(seq, command, true, Some(body))
    }

    fn handle_variables(&mut self, seq: u64, command: String) -> io::Result<()> {
        let variables: Vec<Value> = match &self.vm {
            Some(vm) => vm
                .current_variables()
                .into_iter()
                .map(|name| {
                    let value = vm
                        .variable_value(name)
                        .map_or_else(|| "<unavailable>".to_string(), |v| v.to_string());
                    json!({"name": name, "value": value, "variablesReference": 0})
                })
                .collect(),
            None => Vec::new(),
        };
        self.send_response(seq, command, true, Some(json!({ "variables": variables })))
    }

    fn step(&mut self, seq: u64, command: String, arm: fn(&mut DebuggerVm)) -> io::Result<()> {
        if let Some(vm) = self.vm.as_mut() {
            arm(vm);
        }
        self.send_response(seq, command, true, None)?;
        self.resume()
    }

    fn start(&mut self) -> io::Result<()> {
        if self.stop_on_entry {
            self.send_stopped("entry")
        } else {
            self.resume()
        }
    }

    fn resume(&mut self) -> io::Result<()> {
        let Some(vm) = self.vm.as_mut() else {
            return Ok(());
        };
        let outcome = vm.continue_running();
        self.flush_output()?;
        match outcome {
            Ok(StopReason::Breakpoint { .. }) => self.send_stopped("breakpoint"),
            Ok(StopReason::Step) => self.send_stopped("step"),
            Ok(StopReason::Halted) => self.finish(0),
            Err(err) => self.fail(err),
        }
    }

    fn send_stopped(&mut self, reason: &str) -> io::Result<()> {
        self.send_event(
            "stopped",
            Some(json!({"reason": reason, "threadId": THREAD_ID, "allThreadsStopped": true})),
        )
    }

    fn flush_output(&mut self) -> io::Result<()> {
        let text = self.output.take();
        if text.is_empty() {
            return Ok(());
        }
        self.send_event("output", Some(json!({"category": "stdout", "output": text})))
    }

    fn fail(&mut self, err: VmError) -> io::Result<()> {
        self.send_event(
            "output",
            Some(json!({"category": "stderr", "output": format!("{err}\n")})),
        )?;
        self.finish(1)
    }

    fn finish(&mut self, exit_code: i32) -> io::Result<()> {
        self.send_event("exited", Some(json!({"exitCode": exit_code})))?;
        self.send_event("terminated", None)
    }
}

/// Source text for the listing; a missing file gives an empty listing.
pub fn read_source(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(text) => text.lines().map(str::to_string).collect(),
        Err(err) => {
            warn!(path = %path.display(), %err, "source listing unavailable");
            Vec::new()
        }
    }
}
