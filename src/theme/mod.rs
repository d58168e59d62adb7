//! Terminal background (dark/light) detection.
//!
//! Signals are consulted in order and the first conclusive one wins:
//!
//! 1. `GIFZITTO_THEME` override (`dark` / `light`)
//! 2. `COLORFGBG` background palette index
//! 3. OSC 11 query on the controlling terminal, bounded by a timeout
//! 4. Background color in the terminal emulator's configuration
//! 5. [`Theme::Dark`]

mod config_files;
mod probe;

use std::cell::OnceCell;
use std::path::PathBuf;
use std::time::Duration;

use crate::color::Theme;

pub use config_files::{ConfigBackground, TerminalConfigs, TerminalKind};
pub use probe::{parse_background_response, BackgroundProbe, ProbeError, TtyProbe};

/// Environment variable that forces a theme.
pub const THEME_ENV: &str = "GIFZITTO_THEME";

/// Default bound on the terminal query.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(300);

/// Which signal decided the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeSource {
    Override,
    ColorFgBg,
    Terminal,
    ConfigFile,
    Default,
}

/// Classify a background by BT.601 luminance (`< 0.5` is dark).
///
/// Components are in `0.0..=1.0`.
pub(crate) fn classify_background(r: f64, g: f64, b: f64) -> Theme {
    let luminance = 0.299 * r + 0.587 * g + 0.114 * b;
    if luminance < 0.5 {
        Theme::Dark
    } else {
        Theme::Light
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Resolves the terminal theme once and caches the answer.
pub struct ThemeDetector {
    env: EnvLookup,
    probe: Option<Box<dyn BackgroundProbe>>,
    timeout: Duration,
    config_files: bool,
    config_home: Option<PathBuf>,
    resolved: OnceCell<(Theme, ThemeSource)>,
}

impl Default for ThemeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ThemeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeDetector")
            .field("probe", &self.probe.is_some())
            .field("timeout", &self.timeout)
            .field("config_files", &self.config_files)
            .field("config_home", &self.config_home)
            .field("resolved", &self.resolved.get())
            .finish()
    }
}

impl ThemeDetector {
    /// Detector over the process environment and the controlling terminal.
    pub fn new() -> Self {
        Self {
            env: Box::new(|key| std::env::var(key).ok()),
            probe: Some(Box::new(TtyProbe)),
            timeout: DEFAULT_PROBE_TIMEOUT,
            config_files: true,
            config_home: None,
            resolved: OnceCell::new(),
        }
    }

    /// Replace the environment lookup.
    pub fn with_env(mut self, env: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Replace the terminal query.
    pub fn with_probe(mut self, probe: impl BackgroundProbe + 'static) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    /// Never query the terminal.
    pub fn without_probe(mut self) -> Self {
        self.probe = None;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read terminal configuration below `home` instead of `$HOME`.
    pub fn with_config_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.config_home = Some(home.into());
        self
    }

    /// Never read terminal configuration files.
    pub fn without_config_files(mut self) -> Self {
        self.config_files = false;
        self
    }

    /// Resolved theme. Signals are read on the first call only.
    pub fn detect(&self) -> Theme {
        self.detect_with_source().0
    }

    /// Resolved theme and the signal that decided it.
    pub fn detect_with_source(&self) -> (Theme, ThemeSource) {
        *self.resolved.get_or_init(|| {
            let resolved = self.resolve();
            log::debug!("Theme resolved to {} via {:?}", resolved.0.name(), resolved.1);
            resolved
        })
    }

    fn resolve(&self) -> (Theme, ThemeSource) {
        if let Some(value) = (self.env)(THEME_ENV) {
            match Theme::parse(&value) {
                Some(theme) => return (theme, ThemeSource::Override),
                None => log::warn!("Ignoring {}={:?}; expected 'dark' or 'light'", THEME_ENV, value),
            }
        }

        if let Some(theme) = (self.env)("COLORFGBG").as_deref().and_then(parse_colorfgbg) {
            return (theme, ThemeSource::ColorFgBg);
        }

        if let Some(probe) = &self.probe {
            match probe.query_background(self.timeout) {
                Ok(theme) => return (theme, ThemeSource::Terminal),
                Err(e @ ProbeError::Timeout(_)) => log::info!("Theme detection timed out: {}", e),
                Err(e) => log::debug!("Theme query unavailable: {}", e),
            }
        }

        if let Some(found) = self.config_background() {
            return (found.theme(), ThemeSource::ConfigFile);
        }

        (Theme::Dark, ThemeSource::Default)
    }

    fn config_background(&self) -> Option<ConfigBackground> {
        if !self.config_files {
            return None;
        }
        let home = self
            .config_home
            .clone()
            .or_else(|| (self.env)("HOME").map(PathBuf::from))?;
        let running = TerminalKind::detect(&*self.env);
        let found = TerminalConfigs::new(home).background(running)?;
        log::debug!("Background {:?} configured in {}", found.rgb, found.source);
        Some(found)
    }
}

/// Classify `COLORFGBG` (`fg;bg` or `fg;default;bg`) by its last field.
///
/// Palette indices 0-6 and 8 are dark backgrounds; 7 and 9-15 are light.
pub fn parse_colorfgbg(value: &str) -> Option<Theme> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match bg {
        0..=6 | 8 => Some(Theme::Dark),
        7 | 9..=15 => Some(Theme::Light),
        _ => None,
    }
}
