//! Subcommand handlers: fetch display, frame generation, and config actions.

use std::fmt::Display;
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use super::args::{Args, ConfigAction, FramesArgs, CHAR_ASPECT_RANGE, DIMENSION_RANGE, FPS_RANGE};
use crate::color::{resolve_color_mode, ColorMode, TermSignals, Theme};
use crate::compositor::{load_sequence, BoundingBox, Compositor, CompositorConfig, InfoAlign, Layout, Playback};
use crate::config::{
    default_path as get_config_path, expand_home, AnimationConfig, ColorChoice, Config, ConfigError, DisplayConfig,
    GenerateConfig, ThemeChoice, DEFAULT_CONFIG,
};
use crate::frames::{
    generate_into_store, FrameError, FrameGenerator, FrameSequence, FrameStore, GenerateOutcome, GeneratorOptions,
    DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use crate::sysinfo::SystemInfo;
use crate::terminal::{stdout_is_tty, terminal_width};
use crate::theme::ThemeDetector;

/// Default playback rate.
pub const DEFAULT_FPS: f32 = 12.0;

/// Errors reported by the command handlers.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Frames(#[from] FrameError),

    #[error("no input image; pass --in <path> or set [generate] input in the config file")]
    MissingInput,

    #[error("cannot determine a data directory; pass an explicit directory")]
    NoDataDir,

    #[error("Config file already exists: {}", .0.display())]
    ConfigExists(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CliError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Drop a config file value outside the range the matching flag accepts.
///
/// NaN never passes.
fn checked<T: PartialOrd + Display + Copy>(value: Option<T>, range: &RangeInclusive<T>, key: &str) -> Option<T> {
    let value = value?;
    if range.contains(&value) {
        Some(value)
    } else {
        log::warn!(
            "Ignoring {} = {} from the config file (expected {} to {})",
            key,
            value,
            range.start(),
            range.end()
        );
        None
    }
}

// ==================== gen-frames ====================

/// Merge generator flags with the `[generate]` table. CLI wins.
pub fn resolve_generator_options(args: &FramesArgs, config: &GenerateConfig) -> GeneratorOptions {
    let defaults = GeneratorOptions::default();
    let color_mode = match (args.color_mode, args.color) {
        (Some(mode), _) => mode.into(),
        (None, true) => ColorMode::TrueColor,
        (None, false) => config.color_mode.unwrap_or(defaults.color_mode),
    };

    GeneratorOptions {
        width: args
            .width
            .or_else(|| checked(config.width, &DIMENSION_RANGE, "generate.width"))
            .unwrap_or(DEFAULT_WIDTH),
        height: args
            .height
            .or_else(|| checked(config.height, &DIMENSION_RANGE, "generate.height"))
            .unwrap_or(DEFAULT_HEIGHT),
        color_mode,
        invert: args.invert || config.invert.unwrap_or(false),
        char_aspect: args
            .char_aspect
            .or_else(|| checked(config.char_aspect, &CHAR_ASPECT_RANGE, "generate.char_aspect"))
            .unwrap_or(defaults.char_aspect),
    }
}

/// Frame directory: explicit, then `[animation] dir`, then the default.
fn resolve_anim_dir(explicit: Option<&Path>, config: &AnimationConfig) -> Result<PathBuf, CliError> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| config.dir.clone())
        .map(|p| expand_home(&p))
        .or_else(FrameStore::default_dir)
        .ok_or(CliError::NoDataDir)
}

/// Generate frames into the store.
pub fn run_gen_frames(args: &FramesArgs, config: &Config) -> Result<GenerateOutcome, CliError> {
    let input = args
        .input
        .clone()
        .or_else(|| config.generate.input.clone())
        .map(|p| expand_home(&p))
        .ok_or(CliError::MissingInput)?;
    let store = FrameStore::new(resolve_anim_dir(args.out.as_deref(), &config.animation)?);

    let options = resolve_generator_options(args, &config.generate);
    log::debug!("Generating frames with {:?}", options);
    let generator = FrameGenerator::new(options);

    let outcome = generate_into_store(&input, &store, &generator, args.force)?;
    match outcome {
        GenerateOutcome::Generated { frames, .. } => {
            println!("Wrote {} frame(s) to {}", frames, store.dir().display())
        }
        GenerateOutcome::UpToDate { frames } => println!(
            "{} frame(s) in {} are up to date (use --force to regenerate)",
            frames,
            store.dir().display()
        ),
    }
    Ok(outcome)
}

// ==================== fetch ====================

/// Display settings after merging CLI flags, the config file, and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub bounding_box: BoundingBox,
    pub anim_dir: PathBuf,
    pub fps: f32,
    pub looping: bool,
    pub loops: Option<u32>,
    pub theme: ThemeChoice,
    pub color: ColorChoice,
    pub info_align: InfoAlign,
    pub no_ascii: bool,
    pub separator: Option<String>,
}

impl FetchSettings {
    pub fn resolve(args: &Args, config: &Config) -> Result<Self, CliError> {
        let anim = &config.animation;
        let display = &config.display;

        Ok(Self {
            bounding_box: BoundingBox::new(
                args.ascii_width
                    .or_else(|| checked(anim.width, &DIMENSION_RANGE, "animation.width"))
                    .unwrap_or(DEFAULT_WIDTH),
                args.ascii_height
                    .or_else(|| checked(anim.height, &DIMENSION_RANGE, "animation.height"))
                    .unwrap_or(DEFAULT_HEIGHT),
            ),
            anim_dir: resolve_anim_dir(args.anim_dir.as_deref(), anim)?,
            fps: args
                .fps
                .or_else(|| checked(anim.fps, &FPS_RANGE, "animation.fps"))
                .unwrap_or(DEFAULT_FPS),
            looping: args.looping || anim.looping.unwrap_or(false),
            loops: args.loops.or(anim.loops),
            theme: args.theme.map(Into::into).or(display.theme).unwrap_or_default(),
            color: args.color_mode.map(Into::into).or(display.color_mode).unwrap_or_default(),
            info_align: args.info_align.map(Into::into).or(display.info_align).unwrap_or_default(),
            no_ascii: args.no_ascii || display.no_ascii.unwrap_or(false),
            separator: display.separator.clone(),
        })
    }

    /// Settings written back as a config file.
    pub fn to_config(&self, generate: GenerateConfig) -> Config {
        Config {
            animation: AnimationConfig {
                dir: Some(self.anim_dir.clone()),
                fps: Some(self.fps),
                looping: Some(self.looping),
                loops: self.loops,
                width: Some(self.bounding_box.width),
                height: Some(self.bounding_box.height),
            },
            display: DisplayConfig {
                theme: Some(self.theme),
                color_mode: Some(self.color),
                info_align: Some(self.info_align),
                no_ascii: Some(self.no_ascii),
                separator: self.separator.clone(),
            },
            generate,
        }
    }

    /// Time between redraws. Falls back to the default rate when `fps`
    /// does not give a representable interval.
    pub fn frame_interval(&self) -> Duration {
        Duration::try_from_secs_f32(1.0 / self.fps).unwrap_or_else(|_| {
            log::warn!("Unusable frame rate {}; playing at {} fps", self.fps, DEFAULT_FPS);
            Duration::from_secs_f32(1.0 / DEFAULT_FPS)
        })
    }

    fn playback(&self) -> Playback {
        if !(self.looping || self.loops.is_some()) {
            return Playback::Static;
        }
        if !stdout_is_tty() {
            log::warn!("stdout is not a terminal; rendering a single frame instead of looping");
            return Playback::Static;
        }
        Playback::Loop { loops: self.loops }
    }
}

/// Resolve color mode and theme for this run.
///
/// The terminal background is only queried when colors will be emitted.
pub fn resolve_appearance(color: ColorChoice, theme: ThemeChoice) -> (ColorMode, Theme) {
    let mode = color.fixed().unwrap_or_else(|| resolve_color_mode(&TermSignals::from_env()));
    let theme = match theme.fixed() {
        Some(theme) => theme,
        None if mode == ColorMode::None => Theme::Dark,
        None => ThemeDetector::new().detect(),
    };
    log::debug!("Using color mode {} on {} theme", mode.name(), theme.name());
    (mode, theme)
}

/// Render the animation beside system information.
pub fn run_fetch(args: &Args, config: &Config, cancel: &AtomicBool) -> Result<(), CliError> {
    let settings = FetchSettings::resolve(args, config)?;
    let (color_mode, theme) = resolve_appearance(settings.color, settings.theme);

    let sequence = if settings.no_ascii {
        FrameSequence::default()
    } else {
        load_sequence(&FrameStore::new(&settings.anim_dir), settings.bounding_box)
    };

    let mut layout = Layout {
        show_ascii: !settings.no_ascii,
        info_align: settings.info_align,
        term_width: terminal_width(),
        ..Layout::default()
    };
    if let Some(separator) = &settings.separator {
        layout.separator = separator.clone();
    }

    let compositor = Compositor::new(CompositorConfig {
        bounding_box: settings.bounding_box,
        color_mode,
        theme,
        layout,
        frame_interval: settings.frame_interval(),
        playback: settings.playback(),
        ..CompositorConfig::default()
    });

    let provider = SystemInfo::new().styled(color_mode != ColorMode::None);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    compositor
        .run(&mut out, &sequence, &provider, cancel)
        .map_err(|e| CliError::io("Failed to write to terminal", e))?;
    Ok(())
}

// ==================== config ====================

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, args: &Args, config: &Config) -> Result<(), CliError> {
    let config_path = args.config.clone().or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            let settings = FetchSettings::resolve(args, config)?;
            let effective = settings.to_config(config.generate.clone());
            let text = toml::to_string_pretty(&effective).map_err(|e| {
                CliError::io("Failed to format configuration", std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })?;

            println!("# Effective configuration");
            match &config_path {
                Some(path) if path.exists() => println!("# Config file: {} (exists)", path.display()),
                Some(path) => println!("# Config file: {} (not found)", path.display()),
                None => println!("# Config file: (no config directory)"),
            }
            println!();
            print!("{}", text);
            std::io::stdout()
                .flush()
                .map_err(|e| CliError::io("Failed to write to terminal", e))?;
        }
        ConfigAction::Init => {
            let config_path = config_path.ok_or(CliError::NoDataDir)?;
            init_config(&config_path)?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}

/// Write the default config file, refusing to overwrite an existing one.
pub fn init_config(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        return Err(CliError::ConfigExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CliError::io("Error creating config directory", e))?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(|e| CliError::io("Error writing config file", e))
}
