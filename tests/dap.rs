mod common;

use bytecode_debugger::dap::{
    read_message, write_message, DapMessage, DapMessageContent, DapServer, MAX_CONTENT_LENGTH,
};
use serde_json::{json, Value};
use std::fs;
use std::io::{BufRead, Cursor, ErrorKind, Read};
use std::path::PathBuf;

fn write_program(name: &str) -> PathBuf {
    write_program_with(name, common::DOUBLE_CODE, common::DOUBLE_SOURCE)
}

/// Writes `double.x.cod` and its listing `double.x` into a fresh directory.
fn write_program_with(name: &str, code: &str, source: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bytecode-debugger-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let program = dir.join("double.x.cod");
    fs::write(&program, code).unwrap();
    fs::write(dir.join("double.x"), source).unwrap();
    program
}

fn requests(list: &[(&str, Option<Value>)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for (i, (command, args)) in list.iter().enumerate() {
        let msg = DapMessage::request(i as u64 + 1, command, args.clone());
        write_message(&mut bytes, &msg).unwrap();
    }
    bytes
}

/// Split framed output into JSON bodies.
fn frames(bytes: Vec<u8>) -> Vec<Value> {
    let mut reader = Cursor::new(bytes);
    let mut out = Vec::new();
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).unwrap() == 0 {
            return out;
        }
        let len: usize = header
            .trim()
            .strip_prefix("Content-Length:")
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        let mut blank = String::new();
        reader.read_line(&mut blank).unwrap();
        let mut body = vec![0u8; len];
        reader.read_exact(&mut body).unwrap();
        out.push(serde_json::from_slice(&body).unwrap());
    }
}

fn serve(input: Vec<u8>) -> Vec<Value> {
    let mut server = DapServer::new(Cursor::new(input), Vec::new());
    server.run().unwrap();
    frames(server.into_writer())
}

fn events<'a>(messages: &'a [Value], name: &str) -> Vec<&'a Value> {
    messages
        .iter()
        .filter(|m| m["type"] == "event" && m["event"] == name)
        .collect()
}

fn response<'a>(messages: &'a [Value], command: &str) -> &'a Value {
    messages
        .iter()
        .find(|m| m["type"] == "response" && m["command"] == command)
        .unwrap_or_else(|| panic!("no response to {command}"))
}

#[test]
fn test_read_message_skips_garbage_body() {
    let mut bytes = b"Content-Length: 5\r\n\r\nnope!".to_vec();
    write_message(&mut bytes, &DapMessage::request(9, "threads", None)).unwrap();

    let msg = read_message(&mut Cursor::new(bytes)).unwrap().unwrap();
    assert_eq!(msg.seq, 9);
    assert!(matches!(
        msg.content,
        DapMessageContent::Request { ref command, .. } if command == "threads"
    ));
}

#[test]
fn test_read_message_at_end_of_input() {
    assert!(read_message(&mut Cursor::new(Vec::new())).unwrap().is_none());
}

#[test]
fn test_breakpoint_session() {
    let program = write_program("breakpoint");
    let input = requests(&[
        ("initialize", None),
        ("setBreakpoints", Some(json!({"breakpoints": [{"line": 3}]}))),
        (
            "launch",
            Some(json!({"program": program.display().to_string(), "stopOnEntry": false})),
        ),
        ("configurationDone", None),
        ("stackTrace", None),
        ("variables", Some(json!({"variablesReference": 1}))),
        ("continue", None),
        ("disconnect", None),
    ]);
    let messages = serve(input);

    assert_eq!(events(&messages, "initialized").len(), 1);
    assert_eq!(response(&messages, "launch")["success"], true);

    let stopped = events(&messages, "stopped");
    assert_eq!(stopped.len(), 1);
    assert_eq!(stopped[0]["body"]["reason"], "breakpoint");

    let frames = &response(&messages, "stackTrace")["body"]["stackFrames"];
    assert_eq!(frames[0]["name"], "f");
    assert_eq!(frames[0]["line"], 3);
    let path = frames[0]["source"]["path"].as_str().unwrap();
    assert!(path.ends_with("double.x"), "frame source was {path}");
    assert_eq!(frames[1]["name"], "main");
    assert_eq!(frames[1]["line"], 6);

    let variables = &response(&messages, "variables")["body"]["variables"];
    assert_eq!(variables[0]["name"], "n");
    assert_eq!(variables[0]["value"], "4");

    let output = events(&messages, "output");
    assert_eq!(output[0]["body"]["output"], "8\n");
    assert_eq!(events(&messages, "exited")[0]["body"]["exitCode"], 0);
    assert_eq!(events(&messages, "terminated").len(), 1);
    assert_eq!(response(&messages, "disconnect")["success"], true);
}

#[test]
fn test_stop_on_entry_then_step() {
    let program = write_program("entry");
    let input = requests(&[
        ("initialize", None),
        ("launch", Some(json!({"program": program.display().to_string()}))),
        ("setBreakpoints", Some(json!({"breakpoints": [{"line": 4}, {"line": 5}]}))),
        ("configurationDone", None),
        ("next", None),
        ("stackTrace", None),
        ("disconnect", None),
    ]);
    let messages = serve(input);

    let verified = &response(&messages, "setBreakpoints")["body"]["breakpoints"];
    assert_eq!(verified[0]["verified"], false);
    assert_eq!(verified[1]["verified"], true);

    let reasons: Vec<&Value> = events(&messages, "stopped")
        .iter()
        .map(|e| &e["body"]["reason"])
        .collect();
    assert_eq!(reasons, vec!["entry", "step"]);

    let frames = &response(&messages, "stackTrace")["body"]["stackFrames"];
    assert_eq!(frames[0]["line"], 1);
    assert!(events(&messages, "exited").is_empty());
}

#[test]
fn test_launch_without_program_fails() {
    let input = requests(&[("launch", Some(json!({}))), ("bogus", None)]);
    let messages = serve(input);
    assert_eq!(response(&messages, "launch")["success"], false);
    assert_eq!(response(&messages, "bogus")["success"], false);
}

#[test]
fn test_read_message_rejects_oversized_length() {
    let header = format!("Content-Length: {}\r\n\r\n{{}}", MAX_CONTENT_LENGTH + 1);
    let err = read_message(&mut Cursor::new(header.into_bytes())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn test_read_message_rejects_bad_length() {
    let err = read_message(&mut Cursor::new(b"Content-Length: lots\r\n\r\n{}".to_vec())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);

    let err = read_message(&mut Cursor::new(b"X-Other: 1\r\n\r\n{}".to_vec())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

const READ_CODE: &str = "LINE 1
FUNCTION main 1 2
READ
LIT 1
BOP +
LINE 2
WRITE
HALT
";

#[test]
fn test_program_input_comes_from_launch() {
    let program = write_program_with("input", READ_CODE, "n = read()\nwrite(n + 1)");
    let input = requests(&[
        ("initialize", None),
        (
            "launch",
            Some(json!({
                "program": program.display().to_string(),
                "stopOnEntry": false,
                "input": "41\n",
            })),
        ),
        ("configurationDone", None),
        ("disconnect", None),
    ]);
    let messages = serve(input);

    let output = events(&messages, "output");
    assert_eq!(output[0]["body"]["output"], "Enter an integer: 42\n");
    assert_eq!(events(&messages, "exited")[0]["body"]["exitCode"], 0);
}

#[test]
fn test_read_without_launch_input_fails_program() {
    let program = write_program_with("no-input", READ_CODE, "n = read()\nwrite(n + 1)");
    let input = requests(&[
        (
            "launch",
            Some(json!({"program": program.display().to_string(), "stopOnEntry": false})),
        ),
        ("configurationDone", None),
    ]);
    let messages = serve(input);

    let output = events(&messages, "output");
    assert_eq!(output[0]["body"]["category"], "stdout");
    assert_eq!(output[1]["body"]["category"], "stderr");
    assert_eq!(events(&messages, "exited")[0]["body"]["exitCode"], 1);
}

#[test]
fn test_set_breakpoints_replaces_previous_set() {
    let program = write_program("replace");
    let input = requests(&[
        ("launch", Some(json!({"program": program.display().to_string()}))),
        ("setBreakpoints", Some(json!({"breakpoints": [{"line": 3}]}))),
        ("setBreakpoints", Some(json!({"breakpoints": [{"line": 6}]}))),
        ("configurationDone", None),
        ("continue", None),
        ("stackTrace", None),
    ]);
    let mut server = DapServer::new(Cursor::new(input), Vec::new());
    server.run().unwrap();
    assert_eq!(server.vm().unwrap().breakpoints(), vec![6]);

    let messages = frames(server.into_writer());
    let frames = &response(&messages, "stackTrace")["body"]["stackFrames"];
    assert_eq!(frames[0]["name"], "main");
    assert_eq!(frames[0]["line"], 6);
}
