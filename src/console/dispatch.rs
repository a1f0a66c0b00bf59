//! Command dispatcher
//!
//! Resolution order for a line `t0 t1 t2 ...`:
//!
//! 1. `*` as `t0`: wildcard, applied to every client (`* log [level]`).
//! 2. `help` / `?` as `t0`: list every client that has commands.
//! 3. Otherwise `t0` names a client, and `t1` is `help`/`?`, `log`, or one
//!    of the client's commands.
//!
//! Because 1 and 2 are checked first, a client named `*`, `help` or `?`
//! can never be reached.
//!
//! Every rejection writes exactly one line to `out` before returning.

use core::fmt::Write;

use super::parser::{is_help, tokenize};
use super::registry::{ClientInfo, Registry};
use crate::error::ShellError;
use crate::logging::LogLevel;

/// Run one command line against the registry.
///
/// A matched handler's result is handed back as-is.
pub fn execute(registry: &Registry<'_>, line: &str, out: &mut dyn Write) -> Result<(), ShellError> {
    let tokens = match tokenize(line) {
        Ok(tokens) => tokens,
        Err(e) => {
            let _ = writeln!(out, "Too many arguments");
            return Err(e);
        }
    };

    let Some(&first) = tokens.first() else {
        return Ok(()); // Empty line, do nothing
    };

    if first == "*" {
        return execute_wildcard(registry, &tokens, out);
    }

    if is_help(first) {
        print_global_help(registry, out);
        return Ok(());
    }

    let Some(client) = registry.find(first) else {
        let _ = writeln!(out, "No such command ({})", first);
        return Err(ShellError::BadCommand);
    };

    let sub = tokens.get(1).copied().unwrap_or("");

    if is_help(sub) {
        print_client_help(client, out);
        return Ok(());
    }

    if sub.eq_ignore_ascii_case("log") {
        return execute_client_log(client, &tokens, out);
    }

    match client.find_command(sub) {
        Some(cmd) => cmd.handler.run(&tokens, out),
        None => {
            let _ = writeln!(out, "No such command ({} {})", first, sub);
            Err(ShellError::BadCommand)
        }
    }
}

fn execute_wildcard(registry: &Registry<'_>, tokens: &[&str], out: &mut dyn Write) -> Result<(), ShellError> {
    let Some(&cmd) = tokens.get(1) else {
        let _ = writeln!(out, "Wildcard missing command");
        return Err(ShellError::BadCommand);
    };

    // `log` is the only wildcard command; anything else is a no-op.
    if !cmd.eq_ignore_ascii_case("log") {
        return Ok(());
    }

    let level = match tokens {
        [_, _] => None,
        [_, _, name] => Some(parse_level(name, out)?),
        _ => {
            let _ = writeln!(out, "Invalid arguments");
            return Err(ShellError::InvalidArgument);
        }
    };

    // Clients without a log level are skipped, as in the help listing.
    for client in registry.iter() {
        let Some(cell) = client.log_level else {
            continue;
        };
        match level {
            Some(level) => cell.set(level),
            None => {
                let _ = writeln!(out, "Log level for {} = {}", client.name, cell.get().as_str());
            }
        }
    }

    Ok(())
}

fn execute_client_log(client: &ClientInfo<'_>, tokens: &[&str], out: &mut dyn Write) -> Result<(), ShellError> {
    let Some(cell) = client.log_level else {
        return Ok(());
    };

    match tokens.get(2) {
        None => {
            let _ = writeln!(out, "Log level for {} = {}", client.name, cell.get().as_str());
        }
        Some(name) => cell.set(parse_level(name, out)?),
    }

    Ok(())
}

fn parse_level(name: &str, out: &mut dyn Write) -> Result<LogLevel, ShellError> {
    LogLevel::from_name(name).ok_or_else(|| {
        let _ = writeln!(out, "Invalid log level: {}", name);
        ShellError::InvalidArgument
    })
}

fn print_global_help(registry: &Registry<'_>, out: &mut dyn Write) {
    for client in registry.iter() {
        if client.commands.is_empty() {
            continue;
        }

        let _ = write!(out, "{} (", client.name);
        for (idx, cmd) in client.commands.iter().enumerate() {
            let _ = write!(out, "{}{}", if idx == 0 { "" } else { ", " }, cmd.name);
        }
        if client.log_level.is_some() {
            let _ = write!(out, ", log");
        }
        let _ = writeln!(out, ")");
    }

    let _ = writeln!(out, "\nLog levels are: {}", LogLevel::NAMES);
}

fn print_client_help(client: &ClientInfo<'_>, out: &mut dyn Write) {
    for cmd in client.commands {
        let _ = writeln!(out, "{} {}: {}", client.name, cmd.name, cmd.help);
    }

    if client.log_level.is_some() {
        let _ = writeln!(out, "{} log: set or get log level, args: [level]", client.name);
        let _ = writeln!(out, "\nLog levels are: {}", LogLevel::NAMES);
    }
}
