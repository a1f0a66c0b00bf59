//! Typed argument parsing for command handlers.
//!
//! The format string has one marker per argument:
//!
//! | marker | value                                         |
//! |--------|-----------------------------------------------|
//! | `i`    | signed integer (`0x` hex, leading `0` octal)  |
//! | `u`    | unsigned integer (same prefixes)              |
//! | `p`    | address, hex with optional `0x`               |
//! | `s`    | the token itself                              |
//!
//! A `[` makes the next argument optional: if the tokens run out there,
//! parsing stops successfully. Once an optional argument is present, the
//! next one is required again unless preceded by another `[`, so `u[u[u]]`
//! accepts one, two or three values. `]` is cosmetic.

use core::fmt::Write;

use heapless::Vec;

use crate::config::CMD_MAX_ARGS;
use crate::error::ShellError;

/// One parsed argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgValue<'a> {
    Int(i32),
    Uint(u32),
    Ptr(usize),
    Str(&'a str),
}

impl<'a> ArgValue<'a> {
    /// Format marker that produces this kind of value.
    pub fn marker(&self) -> char {
        match self {
            ArgValue::Int(_) => 'i',
            ArgValue::Uint(_) => 'u',
            ArgValue::Ptr(_) => 'p',
            ArgValue::Str(_) => 's',
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self {
            ArgValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u32> {
        match *self {
            ArgValue::Uint(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ptr(&self) -> Option<usize> {
        match *self {
            ArgValue::Ptr(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            ArgValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// Parsed arguments, in format order.
pub type ArgValues<'a> = Vec<ArgValue<'a>, CMD_MAX_ARGS>;

/// Parse `args` according to `format`.
///
/// `args` are the handler arguments only (without client and command name).
/// Diagnostics are written to `out`; on success the values are returned,
/// possibly fewer than the format has markers when optional ones are absent.
pub fn parse_args<'a>(
    args: &[&'a str],
    format: &str,
    out: &mut dyn Write,
) -> Result<ArgValues<'a>, ShellError> {
    let mut values = ArgValues::new();
    let mut remaining = args.iter();
    let mut optional = false;

    for marker in format.chars() {
        match marker {
            '[' => {
                optional = true;
                continue;
            }
            ']' => continue,
            _ => {}
        }

        let Some(&token) = remaining.next() else {
            if optional {
                return Ok(values);
            }
            let _ = writeln!(out, "Insufficient arguments");
            return Err(ShellError::BadCommand);
        };

        if token.is_empty() {
            let _ = writeln!(out, "Invalid empty arguments");
            return Err(ShellError::BadCommand);
        }

        let value = match marker {
            'i' => parse_int(token).map(ArgValue::Int).ok_or("integer"),
            'u' => parse_uint(token).map(ArgValue::Uint).ok_or("unsigned integer"),
            'p' => parse_ptr(token).map(ArgValue::Ptr).ok_or("pointer"),
            's' => Ok(ArgValue::Str(token)),
            _ => {
                let _ = writeln!(out, "Bad argument format '{}'", marker);
                return Err(ShellError::InvalidArgument);
            }
        };

        match value {
            Ok(v) => {
                if values.push(v).is_err() {
                    let _ = writeln!(out, "Too many arguments");
                    return Err(ShellError::BadCommand);
                }
            }
            Err(kind) => {
                let _ = writeln!(out, "Argument '{}' not a valid {}", token, kind);
                return Err(ShellError::InvalidArgument);
            }
        }

        optional = false;
    }

    if remaining.next().is_some() {
        let _ = writeln!(out, "Too many arguments");
        return Err(ShellError::BadCommand);
    }

    Ok(values)
}

/// Digits with C-style base prefix: `0x`/`0X` hex, leading `0` octal,
/// otherwise decimal. The whole string must be consumed.
fn parse_magnitude(digits: &str) -> Option<u64> {
    let (body, radix) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (hex, 16)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (&digits[1..], 8)
    } else {
        (digits, 10)
    };

    parse_radix(body, radix)
}

/// Strict radix parse: non-empty, digits only (no sign), no overflow.
fn parse_radix(body: &str, radix: u32) -> Option<u64> {
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(body, radix).ok()
}

fn split_sign(token: &str) -> (bool, &str) {
    if let Some(rest) = token.strip_prefix('-') {
        (true, rest)
    } else {
        (false, token.strip_prefix('+').unwrap_or(token))
    }
}

/// Signed 32-bit integer with base prefix.
pub fn parse_int(token: &str) -> Option<i32> {
    let (negative, digits) = split_sign(token);
    let magnitude = parse_magnitude(digits)?;

    if negative {
        if magnitude > i32::MAX as u64 + 1 {
            return None;
        }
        Some((-(magnitude as i64)) as i32)
    } else {
        i32::try_from(magnitude).ok()
    }
}

/// Unsigned 32-bit integer with base prefix. A minus sign is rejected.
pub fn parse_uint(token: &str) -> Option<u32> {
    let (negative, digits) = split_sign(token);
    if negative {
        return None;
    }
    u32::try_from(parse_magnitude(digits)?).ok()
}

/// Address in hex, `0x` prefix optional.
pub fn parse_ptr(token: &str) -> Option<usize> {
    let body = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    usize::try_from(parse_radix(body, 16)?).ok()
}
