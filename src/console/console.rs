//! Console line discipline
//!
//! Polled from the run loop, never blocks. Drains whatever the serial
//! transport has received, echoes it, handles backspace and the log toggle,
//! and hands each completed line to the dispatcher.

use core::fmt::Write;

use super::dispatch::execute;
use super::line_buffer::LineBuffer;
use super::registry::{ClientInfo, Registry};
use crate::config::{ConsoleConfig, LOG_TOGGLE_CHAR, PROMPT};
use crate::error::ShellError;
use crate::logging::{write_entry, LogLevel, LogLevelCell, Logger};
use crate::serial::{SerialBus, UartHw};
use crate::{shell_debug, shell_trace};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Console log level.
pub static LOG_LEVEL: LogLevelCell = LogLevelCell::new(LogLevel::DEFAULT);

/// Registry entry exposing the console's own log level (`console log`).
pub static CLIENT: ClientInfo<'static> = ClientInfo {
    name: "console",
    commands: &[],
    log_level: Some(&LOG_LEVEL),
};

/// Console state machine bound to one serial instance.
pub struct Console<'a, H: UartHw> {
    bus: &'a SerialBus<H>,
    registry: &'a Registry<'a>,
    logger: &'a Logger,
    config: ConsoleConfig,
    line: LineBuffer,
    start_of_line: bool,
}

impl<'a, H: UartHw> Console<'a, H> {
    /// Create a console on an already opened serial instance.
    ///
    /// `InvalidState` if the instance is not open or has no stream.
    pub fn new(
        bus: &'a SerialBus<H>,
        registry: &'a Registry<'a>,
        logger: &'a Logger,
        config: ConsoleConfig,
    ) -> Result<Self, ShellError> {
        bus.stream(config.instance)?;
        shell_debug!(logger, LOG_LEVEL, "Initializing console on {}", config.instance.name());

        Ok(Self {
            bus,
            registry,
            logger,
            config,
            line: LineBuffer::new(),
            start_of_line: true,
        })
    }

    /// Process all input received since the last call.
    pub fn poll(&mut self) -> Result<(), ShellError> {
        let mut out = self.bus.stream(self.config.instance)?;

        if self.start_of_line {
            self.begin_line(&mut out);
        }

        while let Some(byte) = self.bus.get(self.config.instance)? {
            if self.start_of_line {
                self.begin_line(&mut out);
            }
            let _ = self.process_byte(byte, &mut out);
        }

        Ok(())
    }

    /// Process a single input byte
    ///
    /// Returns Some(result) if a line was dispatched, None otherwise.
    pub fn process_byte(&mut self, byte: u8, out: &mut dyn Write) -> Option<Result<(), ShellError>> {
        match byte {
            // Enter
            b'\n' | b'\r' => {
                let _ = writeln!(out);
                let result = execute(self.registry, self.line.as_str(), out);
                if let Err(e) = result {
                    shell_debug!(self.logger, LOG_LEVEL, "'{}' failed: {}", self.line.as_str(), e);
                }
                self.line.clear();
                self.start_of_line = true;
                Some(result)
            }

            // Backspace / delete
            0x08 | 0x7F => {
                if self.line.backspace() {
                    let _ = write!(out, "\x08 \x08");
                }
                None
            }

            LOG_TOGGLE_CHAR => {
                let on = self.logger.toggle();
                let _ = write!(out, "\n<Logging {}>\n", if on { "on" } else { "off" });
                None
            }

            // Printable character
            0x20..=0x7E => {
                if self.line.push(byte) {
                    let _ = out.write_char(byte as char);
                } else {
                    // Line full: ring the bell, drop the character.
                    let _ = out.write_char('\x07');
                    shell_trace!(self.logger, LOG_LEVEL, "line full, dropped 0x{:02x}", byte);
                }
                None
            }

            _ => None,
        }
    }

    /// Flush pending log output, then print the prompt.
    fn begin_line(&mut self, out: &mut dyn Write) {
        self.drain_logs(out);
        self.print_prompt(out);
        self.start_of_line = false;
    }

    /// Write every queued log entry to `out`.
    pub fn drain_logs(&self, out: &mut dyn Write) {
        while let Some(entry) = self.logger.drain() {
            let _ = write_entry(&entry, out);
        }

        let dropped = self.logger.take_dropped();
        if dropped > 0 {
            let _ = writeln!(out, "<{} log entries dropped>", dropped);
        }
    }

    /// Current contents of the line buffer.
    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    pub fn is_start_of_line(&self) -> bool {
        self.start_of_line
    }

    /// Print the prompt
    pub fn print_prompt(&self, out: &mut dyn Write) {
        let _ = out.write_str(PROMPT);
    }

    /// Print welcome banner
    pub fn print_banner(&self, out: &mut dyn Write) {
        let _ = writeln!(out, "\n{}", VERSION);
        let _ = writeln!(out, "Type 'help' for commands.");
    }
}
