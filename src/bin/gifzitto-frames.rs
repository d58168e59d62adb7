use clap::Parser;

use gifzitto::cli::{run_gen_frames, CliError, FramesCli};
use gifzitto::config::Config;
use gifzitto::signals::init_logging;

fn main() {
    init_logging();

    let cli = FramesCli::parse();

    let result = Config::load(cli.frames.config.as_deref())
        .map_err(CliError::from)
        .and_then(|config| run_gen_frames(&cli.frames, &config));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
