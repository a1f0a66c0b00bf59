//! Command line tokenizer
//!
//! Splits on runs of whitespace into borrowed slices of the line. The line
//! itself is never modified.

use heapless::Vec;

use crate::config::CMD_MAX_TOKENS;
use crate::error::ShellError;

/// Tokens of one command line, borrowed from the line.
pub type Tokens<'a> = Vec<&'a str, CMD_MAX_TOKENS>;

/// Split a command line into tokens.
///
/// Fails with `BadCommand` if the line has more than `CMD_MAX_TOKENS` tokens.
pub fn tokenize(line: &str) -> Result<Tokens<'_>, ShellError> {
    let mut tokens = Tokens::new();

    for token in line.split_ascii_whitespace() {
        tokens.push(token).map_err(|_| ShellError::BadCommand)?;
    }

    Ok(tokens)
}

/// True for the tokens that ask for help.
#[inline]
pub fn is_help(token: &str) -> bool {
    token.eq_ignore_ascii_case("help") || token == "?"
}
