//! Module: config
//!
//! Purpose: Compile-time sizing constants and runtime configuration for the
//! serial transport, command registry and console.
//!
//! Every buffer in the shell is fixed-size; the sizes live here so a board
//! port can tune them in one place.

use crate::serial::InstanceId;

/// Receive ring buffer size (bytes, one slot is never used).
pub const SERIAL_RX_BUF_SIZE: usize = 80;

/// Transmit ring buffer size (bytes, one slot is never used).
pub const SERIAL_TX_BUF_SIZE: usize = 1024;

/// Number of physical serial instances on the board.
pub const NUM_SERIAL_INSTANCES: usize = 3;

/// Interrupt priority used when enabling a serial instance.
pub const SERIAL_IRQ_PRIORITY: u8 = 0;

/// Maximum number of registered command clients.
pub const CMD_MAX_CLIENTS: usize = 10;

/// Maximum number of tokens on one command line.
pub const CMD_MAX_TOKENS: usize = 10;

/// Maximum number of parsed arguments a handler can ask for.
pub const CMD_MAX_ARGS: usize = CMD_MAX_TOKENS;

/// Console line buffer size (characters).
pub const CONSOLE_LINE_SIZE: usize = 80;

/// Prompt printed at the start of each line.
pub const PROMPT: &str = "> ";

/// ctrl-L (form feed) toggles log output on and off.
pub const LOG_TOGGLE_CHAR: u8 = 0x0c;

/// Per-instance serial configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Allow formatted output through the instance's stream bridge.
    pub create_stream: bool,
    /// Send a carriage return after each line feed written to the stream.
    pub send_cr_after_nl: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            create_stream: true,
            send_cr_after_nl: true,
        }
    }
}

/// Console configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Serial instance the console reads from and writes to.
    pub instance: InstanceId,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            instance: InstanceId::UART1,
        }
    }
}
