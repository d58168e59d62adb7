//! Configuration file handling for gifzitto.
//!
//! Loads configuration from `<config dir>/gifzitto/config.toml` or a custom
//! path. Every field is optional; command-line flags override the file and
//! the file overrides built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color::{ColorMode, Theme};
use crate::compositor::InfoAlign;

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub animation: AnimationConfig,
    pub display: DisplayConfig,
    pub generate: GenerateConfig,
}

/// `[animation]`: where frames live and how they play.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub dir: Option<PathBuf>,
    pub fps: Option<f32>,
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
    pub loops: Option<u32>,
    pub width: Option<u16>,
    pub height: Option<u16>,
}

/// `[display]`: colors and layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub theme: Option<ThemeChoice>,
    pub color_mode: Option<ColorChoice>,
    pub info_align: Option<InfoAlign>,
    pub no_ascii: Option<bool>,
    pub separator: Option<String>,
}

/// `[generate]`: defaults for `gen-frames`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub input: Option<PathBuf>,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub color_mode: Option<ColorMode>,
    pub invert: Option<bool>,
    pub char_aspect: Option<f32>,
}

/// Theme setting: detect automatically or force one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Auto,
    Dark,
    Light,
}

impl ThemeChoice {
    /// The forced theme, `None` for auto.
    pub fn fixed(self) -> Option<Theme> {
        match self {
            ThemeChoice::Auto => None,
            ThemeChoice::Dark => Some(Theme::Dark),
            ThemeChoice::Light => Some(Theme::Light),
        }
    }
}

/// Color mode setting: negotiate automatically or force one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    None,
    Ansi256,
    Truecolor,
}

impl ColorChoice {
    /// The forced mode, `None` for auto.
    pub fn fixed(self) -> Option<ColorMode> {
        match self {
            ColorChoice::Auto => None,
            ColorChoice::None => Some(ColorMode::None),
            ColorChoice::Ansi256 => Some(ColorMode::Ansi256),
            ColorChoice::Truecolor => Some(ColorMode::TrueColor),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the default
    /// path is used if present; a broken default file is reported as a
    /// warning and defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load_file(path);
        }

        match default_path() {
            Some(path) if path.exists() => Ok(Self::load_file(&path).unwrap_or_else(|e| {
                log::warn!("{}; using defaults", e);
                Config::default()
            })),
            _ => Ok(Config::default()),
        }
    }

    /// Load and parse a specific file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Get the default config file path.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gifzitto").join("config.toml"))
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Commented default configuration written by `config init`.
pub const DEFAULT_CONFIG: &str = r#"# gifzitto configuration

[animation]
# Frame directory (default: <data dir>/gifzitto/anim)
# dir = "~/.local/share/gifzitto/anim"
# Playback rate when looping
fps = 12.0
# Animate until Ctrl+C instead of printing one frame
loop = false
# Stop after this many passes through the animation
# loops = 3
# Bounding box of the animation in characters
width = 40
height = 20

[display]
# Theme: auto, dark, light
theme = "auto"
# Color mode: auto, none, ansi256, truecolor
color_mode = "auto"
# Info placement beside the animation: top, center
info_align = "top"
# Show only system information
no_ascii = false

[generate]
# Default source image for gen-frames
# input = "~/Pictures/anim.gif"
width = 40
height = 20
# Color recorded in frames: none, ansi256, truecolor
color_mode = "truecolor"
# Dense glyphs for dark pixels
invert = false
# Terminal character height / width
char_aspect = 2.0
"#;
