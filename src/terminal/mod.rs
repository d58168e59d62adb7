//! Terminal helpers - raw mode and cursor guards, ANSI-aware text measurement.

mod ansi_text;
mod raw_mode;

use std::io::IsTerminal;

pub use ansi_text::{pad_ansi, strip_ansi, truncate_ansi, visible_width};
pub use raw_mode::{HiddenCursor, RawModeGuard};

/// Width of the terminal attached to stdout, if any.
pub fn terminal_width() -> Option<usize> {
    if !std::io::stdout().is_terminal() {
        return None;
    }
    match crossterm::terminal::size() {
        Ok((cols, _)) if cols > 0 => Some(cols as usize),
        Ok(_) => None,
        Err(e) => {
            log::debug!("Could not query terminal size: {}", e);
            None
        }
    }
}

/// Whether stdout is connected to a terminal.
pub fn stdout_is_tty() -> bool {
    std::io::stdout().is_terminal()
}
