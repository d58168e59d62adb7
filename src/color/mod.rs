//! Color modes, themes, and the RGB → color token mapping.
//!
//! [`map_color`] is the single entry point used by both the frame
//! generator and playback. It is a pure function of its inputs: the theme
//! adjustment never depends on previously mapped samples.

mod capability;
mod palette;

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub use capability::{negotiate_color_mode, resolve_color_mode, CapabilityUnknown, TermSignals};
pub use palette::{ansi256_to_rgb, rgb_to_256};

/// 24-bit RGB sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Terminal color capability tier used for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// No color escapes at all
    #[default]
    None,
    /// xterm 256-color palette
    Ansi256,
    /// 24-bit color
    TrueColor,
}

impl ColorMode {
    pub fn name(&self) -> &'static str {
        match self {
            ColorMode::None => "none",
            ColorMode::Ansi256 => "ansi256",
            ColorMode::TrueColor => "truecolor",
        }
    }
}

/// Background classification of the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Parse `dark` / `light` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

/// Foreground color of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorToken {
    /// No color escape is emitted for this cell.
    #[default]
    None,
    Ansi256(u8),
    TrueColor(Rgb),
}

impl ColorToken {
    pub fn is_none(&self) -> bool {
        matches!(self, ColorToken::None)
    }

    /// Append the SGR foreground parameters (`38;5;N` or `38;2;R;G;B`).
    ///
    /// Writes nothing for [`ColorToken::None`].
    pub fn write_sgr_params(&self, out: &mut String) {
        // Writing into a String cannot fail.
        let _ = match self {
            ColorToken::None => Ok(()),
            ColorToken::Ansi256(idx) => write!(out, "38;5;{idx}"),
            ColorToken::TrueColor(Rgb { r, g, b }) => write!(out, "38;2;{r};{g};{b}"),
        };
    }

    /// Append the complete escape sequence that selects this color.
    ///
    /// [`ColorToken::None`] resets attributes instead.
    pub fn write_escape(&self, out: &mut String) {
        out.push_str("\x1b[");
        if self.is_none() {
            out.push('0');
        } else {
            self.write_sgr_params(out);
        }
        out.push('m');
    }

    /// RGB value the token represents, if any.
    pub fn to_rgb(&self) -> Option<Rgb> {
        match self {
            ColorToken::None => None,
            ColorToken::Ansi256(idx) => Some(ansi256_to_rgb(*idx)),
            ColorToken::TrueColor(rgb) => Some(*rgb),
        }
    }

    /// Re-map a stored token for the current run's mode and theme.
    pub fn remap(&self, mode: ColorMode, theme: Theme) -> ColorToken {
        match self.to_rgb() {
            Some(rgb) => map_color(rgb, mode, theme),
            None => ColorToken::None,
        }
    }
}

/// Channel scale applied on light backgrounds.
const LIGHT_SCALE: f32 = 0.6;

/// Contrast stretch around mid-grey applied on light backgrounds.
const LIGHT_CONTRAST: f32 = 1.3;

/// Theme-dependent adjustment applied before quantization.
///
/// Dark backgrounds use colors as-is. Light backgrounds darken and stretch
/// each channel so pale glyphs stay readable.
pub fn adjust_for_theme(rgb: Rgb, theme: Theme) -> Rgb {
    match theme {
        Theme::Dark => rgb,
        Theme::Light => {
            let adjust = |v: u8| -> u8 {
                let scaled = v as f32 * LIGHT_SCALE;
                ((scaled - 128.0) * LIGHT_CONTRAST + 128.0).round().clamp(0.0, 255.0) as u8
            };
            Rgb::new(adjust(rgb.r), adjust(rgb.g), adjust(rgb.b))
        }
    }
}

/// Map an RGB sample to the color token for `mode` and `theme`.
pub fn map_color(rgb: Rgb, mode: ColorMode, theme: Theme) -> ColorToken {
    match mode {
        ColorMode::None => ColorToken::None,
        ColorMode::Ansi256 => ColorToken::Ansi256(rgb_to_256(adjust_for_theme(rgb, theme))),
        ColorMode::TrueColor => ColorToken::TrueColor(adjust_for_theme(rgb, theme)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [ColorMode; 3] = [ColorMode::None, ColorMode::Ansi256, ColorMode::TrueColor];
    const THEMES: [Theme; 2] = [Theme::Dark, Theme::Light];

    #[test]
    fn test_none_mode_always_sentinel() {
        for theme in THEMES {
            for v in [0u8, 17, 128, 255] {
                assert_eq!(map_color(Rgb::new(v, 255 - v, v / 2), ColorMode::None, theme), ColorToken::None);
            }
        }
    }

    #[test]
    fn test_map_color_deterministic() {
        let samples = [Rgb::new(12, 200, 99), Rgb::new(255, 255, 255), Rgb::new(90, 10, 240)];
        for mode in MODES {
            for theme in THEMES {
                for rgb in samples {
                    assert_eq!(map_color(rgb, mode, theme), map_color(rgb, mode, theme));
                }
            }
        }
    }

    #[test]
    fn test_truecolor_dark_passes_through() {
        let rgb = Rgb::new(1, 2, 3);
        assert_eq!(map_color(rgb, ColorMode::TrueColor, Theme::Dark), ColorToken::TrueColor(rgb));
    }

    #[test]
    fn test_ansi256_dark_quantizes() {
        assert_eq!(
            map_color(Rgb::new(255, 0, 0), ColorMode::Ansi256, Theme::Dark),
            ColorToken::Ansi256(196)
        );
    }

    #[test]
    fn test_light_theme_darkens_pale_colors() {
        let white = adjust_for_theme(Rgb::new(255, 255, 255), Theme::Light);
        assert!(white.r < 200);
        assert_eq!(adjust_for_theme(Rgb::new(0, 0, 0), Theme::Light), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_light_adjustment_preserves_order() {
        let mut prev = 0u8;
        for v in 0..=255u8 {
            let adjusted = adjust_for_theme(Rgb::new(v, v, v), Theme::Light).r;
            assert!(adjusted >= prev);
            prev = adjusted;
        }
    }

    #[test]
    fn test_escape_rendering() {
        let mut s = String::new();
        ColorToken::TrueColor(Rgb::new(1, 2, 3)).write_escape(&mut s);
        ColorToken::Ansi256(42).write_escape(&mut s);
        ColorToken::None.write_escape(&mut s);
        assert_eq!(s, "\x1b[38;2;1;2;3m\x1b[38;5;42m\x1b[0m");
    }

    #[test]
    fn test_remap_to_none_drops_color() {
        let token = ColorToken::TrueColor(Rgb::new(50, 60, 70));
        assert_eq!(token.remap(ColorMode::None, Theme::Dark), ColorToken::None);
        assert_eq!(token.remap(ColorMode::TrueColor, Theme::Dark), token);
        assert_eq!(ColorToken::None.remap(ColorMode::TrueColor, Theme::Light), ColorToken::None);
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!(Theme::parse("Light"), Some(Theme::Light));
        assert_eq!(Theme::parse(" dark "), Some(Theme::Dark));
        assert_eq!(Theme::parse("solarized"), None);
    }
}
