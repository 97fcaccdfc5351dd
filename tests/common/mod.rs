#![allow(dead_code)]

use bytecode_debugger::debugger::DebuggerVm;
use bytecode_debugger::executor::{Console, Machine, SharedBuffer};
use bytecode_debugger::parser::{load_program, InstructionSet};

/// `f(n) = n * 2`, called once from the outermost scope with 4.
pub const DOUBLE_SOURCE: &str = "program {
  int f(int n) {
    return n * 2
  }
  int x
  x = f(4)
  write(x)
}";

pub const DOUBLE_CODE: &str = "GOTO start
LABEL f
LINE 2
FUNCTION f 2 4
FORMAL n 0
LINE 3
LOAD 0 n
LIT 2
BOP *
RETURN f
LABEL start
LINE 1
FUNCTION main 1 8
LINE 5
LIT 0 x
LINE 6
LIT 4
ARGS 1
CALL f
STORE 0 x
LINE 7
LOAD 0 x
WRITE
HALT
";

/// Recursive Fibonacci, reached through a `main` function so that fib(5)
/// runs at call depth 3.
pub const FIB_SOURCE: &str = "program {
  int fib(int n) {
    if (n < 2) then { return n }
    return fib(n-1) + fib(n-2)
  }
  int main() {
    return fib(5)
  }
  write(main())
}";

pub const FIB_CODE: &str = "GOTO start
LABEL fib
LINE 2
FUNCTION fib 2 5
FORMAL n 0
LINE 3
LOAD 0 n
LIT 2
BOP <
FALSEBRANCH recurse
LOAD 0 n
RETURN fib
LABEL recurse
LINE 4
LOAD 0 n
LIT 1
BOP -
ARGS 1
CALL fib
LOAD 0 n
LIT 2
BOP -
ARGS 1
CALL fib
BOP +
RETURN fib
LABEL main
LINE 6
FUNCTION main 6 8
LINE 7
LIT 5
ARGS 1
CALL fib
RETURN main
LABEL start
LINE 1
FUNCTION program 1 10
LINE 9
ARGS 0
CALL main
WRITE
HALT
";

pub fn source_lines(source: &str) -> Vec<String> {
    source.lines().map(str::to_string).collect()
}

pub fn machine(code: &str, input: &str) -> (Machine, SharedBuffer) {
    let loaded = load_program(code, InstructionSet::Base).expect("program should load");
    let (console, output) = Console::captured(input);
    (Machine::new(loaded.program, console), output)
}

pub fn debugger(code: &str, source: &str) -> (DebuggerVm, SharedBuffer) {
    let loaded = load_program(code, InstructionSet::Debug).expect("program should load");
    let (console, output) = Console::captured("");
    let mut vm = DebuggerVm::new(loaded.program, source_lines(source), console);
    vm.initialize();
    (vm, output)
}
