mod common;

use bytecode_debugger::VmError;
use common::machine;

#[test]
fn test_add_and_write_leaves_stack_empty() {
    let (mut vm, output) = machine("LIT 3\nLIT 4\nBOP +\nWRITE\nHALT\n", "");
    vm.run().unwrap();

    assert_eq!(output.contents(), "7\n");
    assert!(vm.state.stack.is_empty());
    assert!(vm.done_executing());
}

#[test]
fn test_countdown_loop() {
    let code = "LIT 3
LABEL loop
LOAD 0
FALSEBRANCH done
LOAD 0
WRITE
LOAD 0
LIT 1
BOP -
STORE 0
GOTO loop
LABEL done
HALT
";
    let (mut vm, output) = machine(code, "");
    vm.run().unwrap();
    assert_eq!(output.contents(), "3\n2\n1\n");
    assert_eq!(vm.state.stack.values(), &[0]);
}

#[test]
fn test_nested_zero_argument_calls() {
    let code = "LIT 10
ARGS 0
CALL outer
WRITE
LOAD 0
WRITE
HALT
LABEL outer
ARGS 0
CALL inner
LIT 1
BOP +
RETURN
LABEL inner
LIT 0
LIT 41
STORE 0
LOAD 0
RETURN
";
    let (mut vm, output) = machine(code, "");
    vm.run().unwrap();

    assert_eq!(output.contents(), "42\n10\n");
    assert_eq!(vm.state.stack.values(), &[10]);
    assert_eq!(vm.state.stack.frame_count(), 1);
    assert!(vm.state.return_addrs.is_empty());
}

#[test]
fn test_read_prompts_until_integer() {
    let (mut vm, output) = machine("READ\nLIT 1\nBOP +\nWRITE\nHALT\n", "abc\n12\n");
    vm.run().unwrap();
    assert_eq!(
        output.contents(),
        "Enter an integer: 'abc' is not an integer\nEnter an integer: 13\n"
    );
}

#[test]
fn test_read_with_closed_input_halts_with_error() {
    let (mut vm, _) = machine("READ\nHALT\n", "");
    assert!(matches!(vm.run(), Err(VmError::InputClosed)));
    assert!(vm.done_executing());
}

#[test]
fn test_division_by_zero_is_fatal() {
    let (mut vm, _) = machine("LIT 1\nLIT 0\nBOP /\nHALT\n", "");
    assert!(matches!(vm.run(), Err(VmError::DivisionByZero)));
    assert!(vm.done_executing());
}

#[test]
fn test_arithmetic_wraps() {
    let (mut vm, output) = machine("LIT 2147483647\nLIT 1\nBOP +\nWRITE\nLIT 7\nLIT -2\nBOP /\nWRITE\n", "");
    vm.run().unwrap();
    assert_eq!(output.contents(), "-2147483648\n-3\n");
}

#[test]
fn test_return_without_call_is_fatal() {
    let (mut vm, _) = machine("LIT 1\nRETURN\n", "");
    assert!(matches!(vm.run(), Err(VmError::ReturnWithoutCall)));
}

#[test]
fn test_pop_below_frame_is_fatal() {
    let (mut vm, _) = machine("LIT 1\nPOP 2\nHALT\n", "");
    assert!(matches!(vm.run(), Err(VmError::StackUnderflow { .. })));
}

#[test]
fn test_running_off_the_end_halts() {
    let (mut vm, output) = machine("LIT 5\nWRITE\n", "");
    vm.run().unwrap();
    assert!(vm.done_executing());
    assert_eq!(output.contents(), "5\n");
}

#[test]
fn test_dump_prints_frames() {
    let (mut vm, output) = machine("LIT 1\nARGS 1\nLIT 2\nDUMP\nHALT\n", "");
    vm.run().unwrap();
    assert_eq!(output.contents(), "[] [1,2]\n");
}

#[test]
fn test_dump_on_echoes_each_instruction() {
    let (mut vm, output) = machine("DUMP ON\nLIT 5\nDUMP OFF\nLIT 6\nHALT\n", "");
    vm.run().unwrap();
    assert_eq!(output.contents(), "LIT 5\n[5]\n");
}

#[test]
fn test_run_twice_starts_fresh() {
    let (mut vm, output) = machine("LIT 2\nWRITE\nHALT\n", "");
    vm.run().unwrap();
    vm.run().unwrap();
    assert_eq!(output.take(), "2\n2\n");
    assert!(vm.state.stack.is_empty());
}
