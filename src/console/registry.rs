//! Command registry
//!
//! Modules ("clients") register a named table of commands at startup. The
//! console user addresses them as `<client> <command> [args...]`.
//!
//! ```ignore
//! static LOG_LEVEL: LogLevelCell = LogLevelCell::new(LogLevel::DEFAULT);
//!
//! static COMMANDS: [CommandInfo<'static>; 1] = [CommandInfo {
//!     name: "status",
//!     help: "Get module status, usage: tmr status",
//!     handler: &cmd_status,
//! }];
//!
//! static CLIENT: ClientInfo<'static> = ClientInfo {
//!     name: "tmr",
//!     commands: &COMMANDS,
//!     log_level: Some(&LOG_LEVEL),
//! };
//!
//! registry.register(&CLIENT)?;
//! ```

use core::fmt::Write;

use crate::config::CMD_MAX_CLIENTS;
use crate::error::ShellError;
use crate::logging::LogLevelCell;

/// Something the console can run.
///
/// `argv` is the whole command line, client and command name included.
/// Plain functions with the matching signature implement this.
pub trait CommandHandler: Sync {
    fn run(&self, argv: &[&str], out: &mut dyn Write) -> Result<(), ShellError>;
}

impl<F> CommandHandler for F
where
    F: Fn(&[&str], &mut dyn Write) -> Result<(), ShellError> + Sync,
{
    fn run(&self, argv: &[&str], out: &mut dyn Write) -> Result<(), ShellError> {
        self(argv, out)
    }
}

/// One command of a client.
pub struct CommandInfo<'a> {
    pub name: &'a str,
    pub help: &'a str,
    pub handler: &'a dyn CommandHandler,
}

/// What a client registers: its name, its commands and optionally its log
/// level, which the console then exposes as `<client> log [level]`.
pub struct ClientInfo<'a> {
    pub name: &'a str,
    pub commands: &'a [CommandInfo<'a>],
    pub log_level: Option<&'a LogLevelCell>,
}

impl<'a> ClientInfo<'a> {
    /// Find a command by name, ignoring case.
    pub fn find_command(&self, name: &str) -> Option<&'a CommandInfo<'a>> {
        self.commands
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Fixed-size table of registered clients, in registration order.
pub struct Registry<'a> {
    slots: [Option<&'a ClientInfo<'a>>; CMD_MAX_CLIENTS],
}

impl<'a> Registry<'a> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            slots: [None; CMD_MAX_CLIENTS],
        }
    }

    /// Register a client.
    ///
    /// A client whose name matches an existing one (ignoring case) replaces
    /// it in place. Fails with `ResourceExhausted` when every slot is taken
    /// by another client; the table is then unchanged.
    pub fn register(&mut self, client: &'a ClientInfo<'a>) -> Result<(), ShellError> {
        if client.name.is_empty() {
            return Err(ShellError::InvalidArgument);
        }

        let slot = self
            .slots
            .iter_mut()
            .find(|slot| match **slot {
                None => true,
                Some(existing) => existing.name.eq_ignore_ascii_case(client.name),
            })
            .ok_or(ShellError::ResourceExhausted)?;

        *slot = Some(client);
        Ok(())
    }

    /// Registered clients, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &'a ClientInfo<'a>> + '_ {
        self.slots.iter().map_while(|slot| *slot)
    }

    /// Find a client by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&'a ClientInfo<'a>> {
        self.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }
}

impl Default for Registry<'_> {
    fn default() -> Self {
        Self::new()
    }
}
