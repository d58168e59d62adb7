//! CLI enum types for theme, color mode, and layout options.

use clap::ValueEnum;

use crate::color::ColorMode;
use crate::compositor::InfoAlign;
use crate::config::{ColorChoice, ThemeChoice};

/// Terminal theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ThemeArg {
    #[default]
    Auto,
    Dark,
    Light,
}

impl From<ThemeArg> for ThemeChoice {
    fn from(t: ThemeArg) -> Self {
        match t {
            ThemeArg::Auto => ThemeChoice::Auto,
            ThemeArg::Dark => ThemeChoice::Dark,
            ThemeArg::Light => ThemeChoice::Light,
        }
    }
}

/// Output color mode for playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorModeArg {
    #[default]
    Auto,
    None,
    Ansi256,
    Truecolor,
}

impl From<ColorModeArg> for ColorChoice {
    fn from(c: ColorModeArg) -> Self {
        match c {
            ColorModeArg::Auto => ColorChoice::Auto,
            ColorModeArg::None => ColorChoice::None,
            ColorModeArg::Ansi256 => ColorChoice::Ansi256,
            ColorModeArg::Truecolor => ColorChoice::Truecolor,
        }
    }
}

/// Color recorded in generated frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GenColorMode {
    #[default]
    None,
    Ansi256,
    Truecolor,
}

impl From<GenColorMode> for ColorMode {
    fn from(c: GenColorMode) -> Self {
        match c {
            GenColorMode::None => ColorMode::None,
            GenColorMode::Ansi256 => ColorMode::Ansi256,
            GenColorMode::Truecolor => ColorMode::TrueColor,
        }
    }
}

/// Info block placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InfoAlignArg {
    #[default]
    Top,
    Center,
}

impl From<InfoAlignArg> for InfoAlign {
    fn from(a: InfoAlignArg) -> Self {
        match a {
            InfoAlignArg::Top => InfoAlign::Top,
            InfoAlignArg::Center => InfoAlign::Center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_arg_to_choice() {
        assert_eq!(ThemeChoice::from(ThemeArg::Auto), ThemeChoice::Auto);
        assert_eq!(ThemeChoice::from(ThemeArg::Dark), ThemeChoice::Dark);
        assert_eq!(ThemeChoice::from(ThemeArg::Light), ThemeChoice::Light);
    }

    #[test]
    fn test_color_mode_arg_to_choice() {
        assert_eq!(ColorChoice::from(ColorModeArg::Auto), ColorChoice::Auto);
        assert_eq!(ColorChoice::from(ColorModeArg::None), ColorChoice::None);
        assert_eq!(ColorChoice::from(ColorModeArg::Ansi256), ColorChoice::Ansi256);
        assert_eq!(ColorChoice::from(ColorModeArg::Truecolor), ColorChoice::Truecolor);
    }

    #[test]
    fn test_gen_color_mode_to_color_mode() {
        assert_eq!(ColorMode::from(GenColorMode::None), ColorMode::None);
        assert_eq!(ColorMode::from(GenColorMode::Ansi256), ColorMode::Ansi256);
        assert_eq!(ColorMode::from(GenColorMode::Truecolor), ColorMode::TrueColor);
    }

    #[test]
    fn test_info_align_arg() {
        assert_eq!(InfoAlign::from(InfoAlignArg::Top), InfoAlign::Top);
        assert_eq!(InfoAlign::from(InfoAlignArg::Center), InfoAlign::Center);
    }
}
