mod common;

use bytecode_debugger::console::{parse_command, Command, CommandError, ConsoleUi};
use bytecode_debugger::executor::LineReader;
use common::{debugger, DOUBLE_CODE, DOUBLE_SOURCE};

fn session(script: &str) -> (String, String) {
    let (vm, program_output) = debugger(DOUBLE_CODE, DOUBLE_SOURCE);
    let mut ui = ConsoleUi::new(vm, LineReader::from_text(script), Vec::new());
    ui.run().unwrap();
    assert!(ui.vm().done_executing());
    let (_, out) = ui.into_parts();
    (String::from_utf8(out).unwrap(), program_output.contents())
}

#[test]
fn test_parse_commands() {
    assert_eq!(parse_command("c"), Ok(Command::Continue));
    assert_eq!(parse_command("?\n"), Ok(Command::Help));
    assert_eq!(parse_command("sb 3 4"), Ok(Command::SetBreakpoints(vec![3, 4])));
    assert_eq!(parse_command("  cb 7 "), Ok(Command::ClearBreakpoints(vec![7])));
    assert_eq!(parse_command("sin"), Ok(Command::StepInto));
    assert_eq!(parse_command("quit"), Ok(Command::Quit));
}

#[test]
fn test_parse_command_errors() {
    assert_eq!(parse_command(""), Err(CommandError::Empty));
    assert_eq!(parse_command("zz"), Err(CommandError::Unknown("zz".to_string())));
    assert_eq!(parse_command("sb"), Err(CommandError::MissingLines("sb".to_string())));
    assert_eq!(parse_command("sb 2 x"), Err(CommandError::BadLine("x".to_string())));
    assert_eq!(parse_command("sb 'x"), Err(CommandError::Unbalanced));
}

#[test]
fn test_session_stops_at_breakpoint_and_inspects() {
    let (out, program) = session("sb 4 6\nc\nv\nstk\nfest\nc\n");

    assert!(out.starts_with("-----Running in Debugger Mode-----\nSource Code:\n"));
    assert!(out.contains("4 is not a valid break point\n"));
    assert!(out.contains("Breakpoints currently set at lines: 6\n"));
    assert!(out.contains("--- Current Function:  main\n"));
    assert!(out.contains("** 6:   x = f(4) \t <================\n"));
    assert!(out.contains("Current Variables:\n         x : 0\n"));
    assert!(out.contains("main  line:1\n"));
    assert!(out.contains("main(1-8) @6 {x:0}\n"));
    assert!(out.ends_with("Execution Finished\n"));
    assert_eq!(program, "8\n");
}

#[test]
fn test_session_steps_into_function() {
    let (out, _) = session("sb 6\nc\nsin\nsov\nsov\nstk\nsot\nquit\n");

    assert!(out.contains("Not currently in a function\n"));
    assert!(out.contains("--- Current Function:  f\n"));
    assert!(out.contains("   2:   int f(int n) { \n"));
    assert!(out.contains("   3:     return n * 2 \t <================\n"));
    assert!(out.contains(" f  line:2\nmain  line:1\n"));
    assert!(out.ends_with("Execution Finished\n"));
}

#[test]
fn test_session_reports_bad_commands_and_trace() {
    let (out, program) = session("zz\nsb\ntr\nb\nc\n");

    assert!(out.contains("could not interpret command zz, please enter a new command\n"));
    assert!(out.contains("sb needs at least one line number\n"));
    assert!(out.contains("Stack Tracing is now ON.\n"));
    assert!(out.contains("There are no breakpoints set.\n"));
    assert_eq!(program, "-f(4)\n-exit: f: 8\n8\n");
}

#[test]
fn test_end_of_input_quits() {
    let (out, program) = session("");
    assert!(out.ends_with("Type ? for help\n> Execution Finished\n"));
    assert_eq!(program, "");
}
