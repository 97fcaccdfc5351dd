use crate::error::VmError;
use std::fmt;

/// Operand stack plus the base index of every active frame.
///
/// Frame bases are absolute indices into `values`, and the outermost frame
/// starts at 0. A frame of size zero has its base at the current length,
/// which stays a valid anchor: later pushes belong to that frame and nothing
/// may pop beneath it.
#[derive(Debug, Clone)]
pub struct RuntimeStack {
    values: Vec<i32>,
    frames: Vec<usize>,
}

impl Default for RuntimeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeStack {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            frames: vec![0],
        }
    }

    fn base(&self) -> usize {
        self.frames.last().copied().unwrap_or(0)
    }

    pub fn push(&mut self, value: i32) {
        self.values.push(value);
    }

    /// Pop the top value. Never reaches into the caller's frame.
    pub fn pop(&mut self) -> Result<i32, VmError> {
        let frame_base = self.base();
        if self.values.len() <= frame_base {
            return Err(VmError::StackUnderflow { frame_base });
        }
        self.values
            .pop()
            .ok_or(VmError::StackUnderflow { frame_base })
    }

    pub fn peek(&self) -> Result<i32, VmError> {
        let frame_base = self.base();
        if self.values.len() <= frame_base {
            return Err(VmError::StackUnderflow { frame_base });
        }
        self.values
            .last()
            .copied()
            .ok_or(VmError::StackUnderflow { frame_base })
    }

    /// Start a frame whose first slot is `offset_from_top` values below the
    /// top. Those values must already belong to the current frame.
    pub fn new_frame(&mut self, offset_from_top: usize) -> Result<(), VmError> {
        let available = self.current_frame_size();
        if offset_from_top > available {
            return Err(VmError::FrameTooLarge {
                requested: offset_from_top,
                available,
            });
        }
        self.frames.push(self.values.len() - offset_from_top);
        Ok(())
    }

    /// Discard the current frame, keeping its top value as the return value
    /// on top of the caller's frame.
    pub fn pop_frame(&mut self) -> Result<i32, VmError> {
        if self.frames.len() <= 1 {
            return Err(VmError::OutermostFrame);
        }
        let result = self.pop()?;
        let base = self.base();
        self.values.truncate(base);
        self.frames.pop();
        self.values.push(result);
        Ok(result)
    }

    pub fn load_at(&self, offset: usize) -> Result<i32, VmError> {
        let frame_size = self.current_frame_size();
        if offset >= frame_size {
            return Err(VmError::OffsetOutOfFrame { offset, frame_size });
        }
        Ok(self.values[self.base() + offset])
    }

    pub fn store_at(&mut self, offset: usize, value: i32) -> Result<(), VmError> {
        let frame_size = self.current_frame_size();
        if offset >= frame_size {
            return Err(VmError::OffsetOutOfFrame { offset, frame_size });
        }
        let base = self.base();
        self.values[base + offset] = value;
        Ok(())
    }

    pub fn current_frame_size(&self) -> usize {
        self.values.len() - self.base()
    }

    /// Offset of the top slot within the current frame.
    pub fn current_offset(&self) -> usize {
        self.current_frame_size().saturating_sub(1)
    }

    pub fn current_frame(&self) -> &[i32] {
        &self.values[self.base()..]
    }

    /// Number of frames, including the outermost one.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_bases(&self) -> &[usize] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }
}

/// One bracketed group per frame, outermost first: `[1,2] [3]`.
impl fmt::Display for RuntimeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &start) in self.frames.iter().enumerate() {
            let end = self.frames.get(i + 1).copied().unwrap_or(self.values.len());
            if i > 0 {
                f.write_str(" ")?;
            }
            let slots: Vec<String> = self.values[start..end].iter().map(i32::to_string).collect();
            write!(f, "[{}]", slots.join(","))?;
        }
        Ok(())
    }
}
