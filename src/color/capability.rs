//! Color capability negotiation from terminal environment signals.

use std::io::IsTerminal;

use super::ColorMode;

/// The terminal did not declare anything we recognize.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("terminal color capability unknown: {reason}")]
pub struct CapabilityUnknown {
    pub reason: String,
}

/// Environment signals consulted by [`negotiate_color_mode`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermSignals {
    /// `NO_COLOR` is set (any value)
    pub no_color: bool,
    /// Value of `COLORTERM`
    pub colorterm: Option<String>,
    /// Value of `TERM`
    pub term: Option<String>,
    /// Whether stdout is attached to a terminal
    pub is_tty: bool,
}

impl TermSignals {
    /// Read signals from the process environment.
    pub fn from_env() -> Self {
        Self {
            no_color: std::env::var_os("NO_COLOR").is_some(),
            colorterm: std::env::var("COLORTERM").ok(),
            term: std::env::var("TERM").ok(),
            is_tty: std::io::stdout().is_terminal(),
        }
    }
}

/// Terminals that support 24-bit color without advertising `COLORTERM`.
const TRUECOLOR_TERMS: &[&str] = &["xterm-kitty", "xterm-ghostty", "wezterm", "alacritty", "foot"];

/// Terminal families known to declare only the basic 8/16 colors.
const BASIC_TERMS: &[&str] = &["dumb", "linux", "vt100", "vt220", "xterm", "screen", "tmux", "rxvt", "ansi", "cons25"];

/// Negotiate the richest color mode the terminal declares.
///
/// `NO_COLOR` and non-terminal output always yield [`ColorMode::None`].
/// Terminals that only declare the basic palette also get `None`, since
/// there is no 16-color tier.
///
/// # Errors
/// Returns [`CapabilityUnknown`] when `TERM` is missing or unrecognized.
pub fn negotiate_color_mode(signals: &TermSignals) -> Result<ColorMode, CapabilityUnknown> {
    if signals.no_color || !signals.is_tty {
        return Ok(ColorMode::None);
    }

    if let Some(colorterm) = signals.colorterm.as_deref() {
        let colorterm = colorterm.to_ascii_lowercase();
        if colorterm.contains("truecolor") || colorterm.contains("24bit") {
            return Ok(ColorMode::TrueColor);
        }
    }

    let term = match signals.term.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_ascii_lowercase(),
        _ => {
            return Err(CapabilityUnknown {
                reason: "TERM is not set".to_string(),
            })
        }
    };

    if term.contains("truecolor") || term.contains("direct") || TRUECOLOR_TERMS.contains(&term.as_str()) {
        return Ok(ColorMode::TrueColor);
    }
    if term.contains("256color") {
        return Ok(ColorMode::Ansi256);
    }

    let family = term.split('-').next().unwrap_or_default();
    if BASIC_TERMS.contains(&family) {
        return Ok(ColorMode::None);
    }

    Err(CapabilityUnknown {
        reason: format!("unrecognized TERM '{term}'"),
    })
}

/// Negotiate a color mode, falling back to [`ColorMode::None`] when the
/// capability is unknown.
pub fn resolve_color_mode(signals: &TermSignals) -> ColorMode {
    match negotiate_color_mode(signals) {
        Ok(mode) => {
            log::debug!("Negotiated color mode: {}", mode.name());
            mode
        }
        Err(e) => {
            log::info!("{e}; using no color");
            ColorMode::None
        }
    }
}
