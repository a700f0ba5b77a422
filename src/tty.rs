//! Terminal I/O utilities for CLI.
//!
//! Provides TTY detection and the confirmation prompt used before applying.

use std::io::{self, BufRead, IsTerminal, Write};

pub fn is_stdin_tty() -> bool {
    io::stdin().is_terminal()
}

pub fn is_stderr_tty() -> bool {
    io::stderr().is_terminal()
}

/// Prompts go to stderr, so stdout may be piped while still asking.
pub fn can_prompt() -> bool {
    is_stdin_tty() && is_stderr_tty()
}

pub fn prompt(message: &str) -> pkgwiz::Result<String> {
    eprint!("{}", message);
    io::stderr().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line).map_err(|e| {
        pkgwiz::Error::internal_io(e.to_string(), Some("read confirmation".to_string()))
    })?;

    Ok(line.trim().to_string())
}

/// Ask a yes/no question; anything but `y`/`yes` is a no.
///
/// Non-interactive runs answer yes: `--write` was already explicit.
pub fn confirm(message: &str) -> pkgwiz::Result<bool> {
    if !can_prompt() {
        return Ok(true);
    }

    let answer = prompt(&format!("{} [y/N] ", message))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

/// Print status message to stderr if running in a terminal.
pub fn status(message: &str) {
    if is_stderr_tty() {
        eprintln!("{}", message);
    }
}

// log_status! macro is defined in lib.rs (#[macro_export]) and available crate-wide.
