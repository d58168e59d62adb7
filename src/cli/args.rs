//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::ops::RangeInclusive;
use std::path::PathBuf;

use super::enums::{ColorModeArg, GenColorMode, InfoAlignArg, ThemeArg};

/// Accepted frame width and height, in characters.
pub(crate) const DIMENSION_RANGE: RangeInclusive<u16> = 1..=500;
/// Accepted playback rate, in frames per second.
pub(crate) const FPS_RANGE: RangeInclusive<f32> = 0.1..=120.0;
/// Accepted character cell height-to-width ratio.
pub(crate) const CHAR_ASPECT_RANGE: RangeInclusive<f32> = 0.5..=4.0;

/// Parse and validate a frame dimension (1-500 characters)
fn parse_dimension(s: &str) -> Result<u16, String> {
    let n: u16 = s.parse().map_err(|_| format!("'{}' is not a valid size", s))?;
    if !DIMENSION_RANGE.contains(&n) {
        return Err(format!("Size must be between 1 and 500, got {}", n));
    }
    Ok(n)
}

/// Parse and validate playback rate (0.1-120 fps)
fn parse_fps(s: &str) -> Result<f32, String> {
    let fps: f32 = s.parse().map_err(|_| format!("'{}' is not a valid framerate", s))?;
    if !FPS_RANGE.contains(&fps) {
        return Err(format!("Framerate must be between 0.1 and 120 fps, got {}", fps));
    }
    Ok(fps)
}

/// Parse and validate character aspect ratio (0.5-4.0)
fn parse_char_aspect(s: &str) -> Result<f32, String> {
    let aspect: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !CHAR_ASPECT_RANGE.contains(&aspect) {
        return Err(format!("Character aspect must be between 0.5 and 4.0, got {}", aspect));
    }
    Ok(aspect)
}

/// Animated ASCII art beside system information
#[derive(Parser, Debug)]
#[command(name = "gifzittofetch")]
#[command(version, about = "Animated ASCII art beside system information", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Terminal theme (auto detects the background)
    #[arg(long)]
    pub theme: Option<ThemeArg>,

    /// Show only system information
    #[arg(long)]
    pub no_ascii: bool,

    /// Animation width in characters (default: 40)
    #[arg(long, value_parser = parse_dimension)]
    pub ascii_width: Option<u16>,

    /// Animation height in characters (default: 20)
    #[arg(long, value_parser = parse_dimension)]
    pub ascii_height: Option<u16>,

    /// Output color mode (auto negotiates with the terminal)
    #[arg(long)]
    pub color_mode: Option<ColorModeArg>,

    /// Directory holding generated frames
    #[arg(long)]
    pub anim_dir: Option<PathBuf>,

    /// Playback rate when looping (default: 12)
    #[arg(long, value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Animate until Ctrl+C
    #[arg(long = "loop")]
    pub looping: bool,

    /// Animate this many times, then stop
    #[arg(long)]
    pub loops: Option<u32>,

    /// Info placement beside the animation
    #[arg(long)]
    pub info_align: Option<InfoAlignArg>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate ASCII frames from an image
    GenFrames(FramesArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,
    /// Create default config file
    Init,
}

/// Options of the frame generator.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FramesArgs {
    /// Source image (GIF, PNG or JPEG)
    #[arg(long = "in", short = 'i', visible_alias = "input")]
    pub input: Option<PathBuf>,

    /// Output directory (default: <data dir>/gifzitto/anim)
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Frame width in characters (default: 40)
    #[arg(long, value_parser = parse_dimension)]
    pub width: Option<u16>,

    /// Frame height in characters (default: 20)
    #[arg(long, value_parser = parse_dimension)]
    pub height: Option<u16>,

    /// Record truecolor frames
    #[arg(long)]
    pub color: bool,

    /// Color recorded in frames (overrides --color)
    #[arg(long)]
    pub color_mode: Option<GenColorMode>,

    /// Dense glyphs for dark pixels
    #[arg(long)]
    pub invert: bool,

    /// Terminal character height / width (default: 2.0)
    #[arg(long, value_parser = parse_char_aspect)]
    pub char_aspect: Option<f32>,

    /// Regenerate even if the frames are up to date
    #[arg(long)]
    pub force: bool,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

/// Standalone frame generator
#[derive(Parser, Debug)]
#[command(name = "gifzitto-frames")]
#[command(version, about = "Convert an animated image into ASCII frames", long_about = None)]
pub struct FramesCli {
    #[command(flatten)]
    pub frames: FramesArgs,
}
