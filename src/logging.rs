//! Non-blocking logging for shell clients.
//!
//! # Architecture
//!
//! ```text
//! Client module           Logger              Console
//! ─────────────           ──────              ───────
//!
//! shell_info!() ───────▶ [L0][L1][L2] ──────▶ serial TX
//! level cell check        lock-free ring       drained in poll()
//! never blocks            drops when full
//! ```
//!
//! Every client owns a [`LogLevelCell`]. Registering it with the command
//! registry lets the console user read and change it (`<client> log debug`,
//! `* log off`). On top of the per-client levels, the [`Logger`] has one
//! global on/off switch toggled from the console with ctrl-L.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::serial::ring::RingBuffer;

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 120;

/// Log ring size (entries, one slot is never used).
pub const LOG_BUFFER_SIZE: usize = 16;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warning = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Level a client starts with.
    pub const DEFAULT: LogLevel = LogLevel::Info;

    /// All levels, lowest first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Off,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    /// Human-readable list of valid level names.
    pub const NAMES: &'static str = "off, error, warning, info, debug, trace";

    /// Name as typed on the console.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Fixed-width prefix for rendered entries.
    pub fn prefix(self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "ERR  ",
            LogLevel::Warning => "WARN ",
            LogLevel::Info => "INFO ",
            LogLevel::Debug => "DBG  ",
            LogLevel::Trace => "TRC  ",
        }
    }

    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Look up a level by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(name))
    }
}

/// A client's mutable log level.
///
/// Lives in a `static` next to the client's command table; the registry only
/// holds a reference to it.
pub struct LogLevelCell(AtomicU8);

impl LogLevelCell {
    pub const fn new(level: LogLevel) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    #[inline]
    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Relaxed)).unwrap_or(LogLevel::DEFAULT)
    }

    #[inline]
    pub fn set(&self, level: LogLevel) {
        self.0.store(level as u8, Ordering::Relaxed);
    }

    /// True if a message at `level` passes this cell.
    #[inline]
    pub fn admits(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level <= self.get()
    }
}

impl Default for LogLevelCell {
    fn default() -> Self {
        Self::new(LogLevel::DEFAULT)
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    pub const EMPTY: LogEntry = LogEntry {
        level: LogLevel::Off,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text. Truncation always falls on a character boundary.
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

/// Global log switch plus the pending-entry ring.
///
/// Entries are produced and drained from the foreground context. Pushing
/// never blocks; a full ring drops the entry and bumps a counter.
pub struct Logger<const N: usize = LOG_BUFFER_SIZE> {
    active: AtomicBool,
    entries: RingBuffer<LogEntry, N>,
    dropped: AtomicU32,
}

impl<const N: usize> Logger<N> {
    /// Create a logger with output enabled.
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            entries: RingBuffer::new(LogEntry::EMPTY),
            dropped: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    /// Flip the global switch and return the new state.
    #[inline]
    pub fn toggle(&self) -> bool {
        !self.active.fetch_xor(true, Ordering::Relaxed)
    }

    /// Queue a message if the switch is on and `cell` admits `level`.
    ///
    /// Returns `true` if the message was queued.
    pub fn log(&self, cell: &LogLevelCell, level: LogLevel, args: core::fmt::Arguments<'_>) -> bool {
        if !self.is_active() || !cell.admits(level) {
            return false;
        }

        let mut entry = LogEntry::EMPTY;
        entry.level = level;
        entry.len = format_to_buffer(&mut entry.msg, args) as u8;

        if self.entries.push(entry) {
            true
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Next pending entry, if any.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        self.entries.pop()
    }

    #[inline]
    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Read and reset the dropped counter.
    #[inline]
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}

impl<const N: usize> Default for Logger<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer, truncating at the last whole character
/// that fits. Nothing is appended after the first cut.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
        full: bool,
    }

    impl<'a> Write for BufWriter<'a> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            if self.full {
                return Ok(());
            }
            let remaining = self.buf.len() - self.pos;
            let mut to_write = s.len();
            if to_write > remaining {
                self.full = true;
                to_write = remaining;
                while !s.is_char_boundary(to_write) {
                    to_write -= 1;
                }
            }
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&s.as_bytes()[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter {
        buf,
        pos: 0,
        full: false,
    };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Render an entry as `<PREFIX><message>` followed by a newline unless the
/// message already ends with one.
pub fn write_entry(entry: &LogEntry, out: &mut dyn core::fmt::Write) -> core::fmt::Result {
    let text = entry.text();
    out.write_str(entry.level.prefix())?;
    out.write_str(text)?;
    if !text.ends_with('\n') {
        out.write_str("\n")?;
    }
    Ok(())
}

/// Log at an explicit level.
///
/// ```ignore
/// static LOG_LEVEL: LogLevelCell = LogLevelCell::new(LogLevel::DEFAULT);
/// shell_log!(LOGGER, LOG_LEVEL, LogLevel::Info, "pin {} = {}", name, value);
/// ```
#[macro_export]
macro_rules! shell_log {
    ($logger:expr, $cell:expr, $level:expr, $($arg:tt)*) => {
        $logger.log(&$cell, $level, format_args!($($arg)*))
    };
}

/// Error log.
#[macro_export]
macro_rules! shell_error {
    ($logger:expr, $cell:expr, $($arg:tt)*) => {
        $crate::shell_log!($logger, $cell, $crate::logging::LogLevel::Error, $($arg)*)
    };
}

/// Warning log.
#[macro_export]
macro_rules! shell_warn {
    ($logger:expr, $cell:expr, $($arg:tt)*) => {
        $crate::shell_log!($logger, $cell, $crate::logging::LogLevel::Warning, $($arg)*)
    };
}

/// Info log.
#[macro_export]
macro_rules! shell_info {
    ($logger:expr, $cell:expr, $($arg:tt)*) => {
        $crate::shell_log!($logger, $cell, $crate::logging::LogLevel::Info, $($arg)*)
    };
}

/// Debug log.
#[macro_export]
macro_rules! shell_debug {
    ($logger:expr, $cell:expr, $($arg:tt)*) => {
        $crate::shell_log!($logger, $cell, $crate::logging::LogLevel::Debug, $($arg)*)
    };
}

/// Trace log (maximum verbosity).
#[macro_export]
macro_rules! shell_trace {
    ($logger:expr, $cell:expr, $($arg:tt)*) => {
        $crate::shell_log!($logger, $cell, $crate::logging::LogLevel::Trace, $($arg)*)
    };
}
