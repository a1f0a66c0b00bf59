//! # SerialShell
//!
//! Interrupt-driven serial command shell for small microcontrollers.
//!
//! ## Architecture
//!
//! ```text
//! UART IRQ ─▶ SerialBus rings ─▶ Console ─▶ dispatcher ─▶ client handler
//!                    ▲                                        │
//!                    └──────────── formatted output ◀─────────┘
//! ```
//!
//! - The interrupt handler and the run loop only meet in SPSC rings
//! - Modules register a static command table, nothing is allocated
//! - Every operation returns immediately; nothing blocks

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod console;
pub mod error;
pub mod fault;
pub mod logging;
pub mod serial;

pub use config::{ConsoleConfig, SerialConfig};
pub use console::{ClientInfo, CommandInfo, Console, Registry};
pub use error::ShellError;
pub use fault::{FaultCode, FaultState};
pub use logging::{LogLevel, LogLevelCell, Logger};
pub use serial::{InstanceId, SerialBus, UartHw, UartStatus};

/// Bring up the shell: open the console's serial instance with the default
/// serial config and return a console ready to be polled.
///
/// Register [`console::console::CLIENT`] beforehand to expose `console log`.
pub fn init<'a, H: UartHw>(
    bus: &'a SerialBus<H>,
    registry: &'a Registry<'a>,
    logger: &'a Logger,
    config: ConsoleConfig,
) -> Result<Console<'a, H>, ShellError> {
    bus.open(config.instance, Some(&SerialConfig::default()))?;
    Console::new(bus, registry, logger, config)
}
