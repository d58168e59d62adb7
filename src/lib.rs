//! gifzitto library crate.
//!
//! Converts animated images into ASCII frame sequences and plays them back
//! beside system information in the terminal.

pub mod ascii;
pub mod cli;
pub mod color;
pub mod compositor;
pub mod config;
pub mod frames;
pub mod signals;
pub mod sysinfo;
pub mod terminal;
pub mod theme;
