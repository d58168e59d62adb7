use clap::Parser;

use gifzitto::cli::{handle_config_action, run_fetch, run_gen_frames, Args, Command};
use gifzitto::config::Config;
use gifzitto::signals::{cancel_flag, init_logging, setup_ctrlc_handler};

fn main() {
    init_logging();

    let args = Args::parse();

    // If --config is specified, require the file to exist and parse.
    // Otherwise a broken default file falls back to defaults.
    let config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match &args.command {
        Some(Command::GenFrames(frames)) => {
            let config = match frames.config.as_deref() {
                Some(path) => match Config::load(Some(path)) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                },
                None => config,
            };
            run_gen_frames(frames, &config).map(|_| ())
        }
        Some(Command::Config { action }) => handle_config_action(*action, &args, &config),
        None => {
            if let Err(e) = setup_ctrlc_handler() {
                log::warn!("Failed to install Ctrl+C handler: {}", e);
            }
            run_fetch(&args, &config, cancel_flag())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
