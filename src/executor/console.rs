use crate::error::VmError;
use std::cell::RefCell;
use std::io::{self, BufRead, Cursor, Write};
use std::rc::Rc;

const READ_PROMPT: &str = "Enter an integer: ";

/// Output sink that can be read back, used to capture program output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Return everything written so far and clear the buffer.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Line-oriented input. The stdin variant takes the process-wide lock only
/// for each read, so the debugger console and the program's READ can share
/// the terminal.
pub enum LineReader {
    Stdin,
    Reader(Box<dyn BufRead>),
}

impl LineReader {
    pub fn from_text(text: &str) -> Self {
        LineReader::Reader(Box::new(Cursor::new(text.as_bytes().to_vec())))
    }

    /// Returns 0 at end of input.
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        match self {
            LineReader::Stdin => io::stdin().read_line(buf),
            LineReader::Reader(reader) => reader.read_line(buf),
        }
    }
}

/// The program's input and output streams.
pub struct Console {
    input: LineReader,
    output: Box<dyn Write>,
}

impl Console {
    pub fn new(input: LineReader, output: Box<dyn Write>) -> Self {
        Self { input, output }
    }

    pub fn stdio() -> Self {
        Self::new(LineReader::Stdin, Box::new(io::stdout()))
    }

    /// A console fed from `input` whose output is kept in the returned buffer.
    pub fn captured(input: &str) -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let console = Self::new(LineReader::from_text(input), Box::new(buffer.clone()));
        (console, buffer)
    }

    /// Prompt until a line parses as an integer. Blocks on the input source.
    pub fn read_int(&mut self) -> Result<i32, VmError> {
        loop {
            write!(self.output, "{READ_PROMPT}")?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(VmError::InputClosed);
            }
            match line.trim().parse() {
                Ok(value) => return Ok(value),
                Err(_) => writeln!(self.output, "'{}' is not an integer", line.trim())?,
            }
        }
    }

    pub fn write_value(&mut self, value: i32) -> Result<(), VmError> {
        writeln!(self.output, "{value}")?;
        Ok(())
    }

    pub fn write_line(&mut self, text: &str) -> Result<(), VmError> {
        writeln!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(())
    }
}
