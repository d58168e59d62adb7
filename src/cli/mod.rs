//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction, FramesArgs, FramesCli};
pub use commands::{
    handle_config_action, init_config, resolve_appearance, resolve_generator_options, run_fetch, run_gen_frames,
    CliError, FetchSettings, DEFAULT_FPS,
};
pub use enums::{ColorModeArg, GenColorMode, InfoAlignArg, ThemeArg};
