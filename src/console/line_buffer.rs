//! Line buffer for console input

use crate::config::CONSOLE_LINE_SIZE;

/// Fixed-capacity line input buffer.
///
/// Only printable ASCII is ever pushed, so the contents are always valid
/// UTF-8.
pub struct LineBuffer<const N: usize = CONSOLE_LINE_SIZE> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> LineBuffer<N> {
    /// Create empty buffer
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            len: 0,
        }
    }

    /// Append a character. Returns `false` (and drops it) when full.
    pub fn push(&mut self, c: u8) -> bool {
        if self.len >= N {
            return false;
        }
        self.buf[self.len] = c;
        self.len += 1;
        true
    }

    /// Remove last character. Returns `false` if there was none.
    pub fn backspace(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        self.len -= 1;
        true
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Get buffer as string slice
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= N
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
