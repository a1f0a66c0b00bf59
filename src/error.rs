//! Shell error types
//!
//! One error enum for every layer: serial transport, command registry,
//! dispatcher and argument parser.

/// Shell error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellError {
    /// E01: Bad or missing parameter, unparsable literal
    InvalidArgument,
    /// E02: Fixed-size table is full
    ResourceExhausted,
    /// E03: Operation not allowed in current state
    InvalidState,
    /// E04: Unknown client/command, too many or too few tokens
    BadCommand,
    /// E05: Transmit ring buffer full
    BufferOverrun,
    /// E06: Serial instance identifier out of range
    BadInstance,
    /// E07: No data available right now
    WouldBlock,
}

impl ShellError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "E01",
            Self::ResourceExhausted => "E02",
            Self::InvalidState => "E03",
            Self::BadCommand => "E04",
            Self::BufferOverrun => "E05",
            Self::BadInstance => "E06",
            Self::WouldBlock => "E07",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid argument",
            Self::ResourceExhausted => "resource exhausted",
            Self::InvalidState => "invalid state",
            Self::BadCommand => "bad command",
            Self::BufferOverrun => "buffer overrun",
            Self::BadInstance => "bad instance",
            Self::WouldBlock => "would block",
        }
    }

    /// Legacy negative status code, for callers that report plain integers.
    pub fn errno(&self) -> i32 {
        match self {
            Self::InvalidArgument => -1,
            Self::ResourceExhausted => -2,
            Self::InvalidState => -3,
            Self::BadCommand => -4,
            Self::BufferOverrun => -5,
            Self::BadInstance => -6,
            Self::WouldBlock => -11,
        }
    }
}

impl core::fmt::Display for ShellError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
