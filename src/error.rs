use std::io;
use thiserror::Error;

/// Fatal engine errors. Any of these leaves the machine halted.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("operand stack underflow (frame base {frame_base})")]
    StackUnderflow { frame_base: usize },
    #[error("offset {offset} is outside the current frame of size {frame_size}")]
    OffsetOutOfFrame { offset: usize, frame_size: usize },
    #[error("cannot reserve a frame of {requested} slots, only {available} available")]
    FrameTooLarge { requested: usize, available: usize },
    #[error("cannot pop the outermost frame")]
    OutermostFrame,
    #[error("RETURN executed with no pending call")]
    ReturnWithoutCall,
    #[error("division by zero")]
    DivisionByZero,
    #[error("program input closed while reading an integer")]
    InputClosed,
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("instruction {index} jumps to unknown label '{label}'")]
    UnresolvedLabel { label: String, index: usize },
    #[error("label '{label}' defined twice (instructions {first} and {second})")]
    DuplicateLabel {
        label: String,
        first: usize,
        second: usize,
    },
}
