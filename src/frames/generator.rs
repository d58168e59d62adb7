//! Image → frame sequence conversion.

use std::path::Path;

use super::decode::{decode, decode_bytes, SourceFrame, SourceImage};
use super::error::FrameError;
use super::frame::{Cell, Frame, FrameSequence};
use super::manifest::Manifest;
use super::store::FrameStore;
use crate::ascii::{self, DEFAULT_CHAR_ASPECT_RATIO};
use crate::color::{map_color, ColorMode, Theme};

/// Default frame width in characters.
pub const DEFAULT_WIDTH: u16 = 40;

/// Default frame height in characters.
pub const DEFAULT_HEIGHT: u16 = 20;

/// Options that control how source frames are sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorOptions {
    /// Grid width in characters
    pub width: u16,
    /// Grid height in characters
    pub height: u16,
    /// Color tier recorded in the cells
    pub color_mode: ColorMode,
    /// Dense glyphs for dark pixels instead of bright ones.
    /// Only glyph selection is inverted; colors keep the source RGB.
    pub invert: bool,
    /// Terminal character aspect ratio (height / width)
    pub char_aspect: f32,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            color_mode: ColorMode::None,
            invert: false,
            char_aspect: DEFAULT_CHAR_ASPECT_RATIO,
        }
    }
}

/// Converts decoded images into fixed-size frame sequences.
#[derive(Debug, Clone, Default)]
pub struct FrameGenerator {
    options: GeneratorOptions,
}

impl FrameGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn grid(&self) -> (u16, u16) {
        (self.options.width.max(1), self.options.height.max(1))
    }

    /// Sample one source frame into a grid.
    ///
    /// Colors are recorded for a dark background; playback re-maps them
    /// for the detected theme.
    pub fn frame(&self, source: &SourceFrame) -> Frame {
        let (width, height) = self.grid();
        let crop = ascii::crop_to_grid(source.width, source.height, width, height, self.options.char_aspect);

        let gray = ascii::to_grayscale(&source.rgb);
        let luminance = ascii::downsample(&gray, source.width, crop, width, height);
        if luminance.is_empty() {
            return Frame::blank(width, height);
        }

        let colors = match self.options.color_mode {
            ColorMode::None => Vec::new(),
            _ => ascii::downsample_colors(&source.rgb, source.width, crop, width, height),
        };

        let cells = luminance
            .iter()
            .enumerate()
            .map(|(i, &lum)| {
                let glyph = ascii::sample_u8(lum, self.options.invert);
                let color = colors
                    .get(i)
                    .map(|&rgb| map_color(rgb, self.options.color_mode, Theme::Dark))
                    .unwrap_or_default();
                Cell::new(glyph, color)
            })
            .collect();

        Frame::from_cells(cells, width, height).unwrap_or_else(|| Frame::blank(width, height))
    }

    /// Sample every frame of a source image, preserving temporal order.
    ///
    /// A source without frames yields a single blank frame.
    pub fn generate(&self, source: &SourceImage) -> FrameSequence {
        if source.is_empty() {
            log::warn!("Source image has no frames; producing a single blank frame");
            let (width, height) = self.grid();
            return FrameSequence::new(vec![Frame::blank(width, height)]);
        }

        let frames = source.frames.iter().map(|f| self.frame(f)).collect();
        let delays = source.frames.iter().map(|f| f.delay).collect();
        FrameSequence::with_delays(frames, delays)
    }

    /// Decode an image file and sample it.
    pub fn generate_from_path(&self, path: &Path) -> Result<FrameSequence, FrameError> {
        let source = decode(path)?;
        Ok(self.generate(&source))
    }
}

/// Sample a decoded image with explicit grid, color mode, and inversion.
pub fn generate(source: &SourceImage, width: u16, height: u16, color_mode: ColorMode, invert: bool) -> FrameSequence {
    FrameGenerator::new(GeneratorOptions {
        width,
        height,
        color_mode,
        invert,
        ..GeneratorOptions::default()
    })
    .generate(source)
}

/// Result of [`generate_into_store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// New frames were written, replacing `removed` old frame files
    Generated { frames: usize, removed: usize },
    /// The store already holds frames for this source and these options
    UpToDate { frames: usize },
}

/// Generate frames from `input` and publish them into `store`.
///
/// The store is checked for writability before decoding, and frames are
/// only published after the whole sequence was generated, so a decode
/// failure never leaves partial output. Unless `force` is set, generation
/// is skipped when the store's manifest fingerprint matches.
///
/// # Errors
/// [`FrameError::ImageDecode`] or [`FrameError::OutputWrite`].
pub fn generate_into_store(
    input: &Path,
    store: &FrameStore,
    generator: &FrameGenerator,
    force: bool,
) -> Result<GenerateOutcome, FrameError> {
    let bytes = std::fs::read(input).map_err(|e| FrameError::ImageDecode {
        path: input.to_path_buf(),
        source: image::ImageError::IoError(e),
    })?;

    store.ensure_writable()?;

    let fingerprint = Manifest::fingerprint(&bytes, generator.options());
    if !force {
        if let Some(existing) = store.manifest() {
            let present = store.frame_files().map(|f| f.len()).unwrap_or(0);
            if existing.fingerprint == fingerprint && present == existing.frame_count && present > 0 {
                log::info!("Frames in {} are up to date", store.dir().display());
                return Ok(GenerateOutcome::UpToDate { frames: present });
            }
        }
    }

    let source = decode_bytes(&bytes).map_err(|source| FrameError::ImageDecode {
        path: input.to_path_buf(),
        source,
    })?;
    let sequence = generator.generate(&source);

    let options = generator.options();
    let (width, height) = sequence.dimensions();
    let manifest = Manifest {
        width,
        height,
        color_mode: options.color_mode,
        invert: options.invert,
        char_aspect: options.char_aspect,
        frame_count: sequence.len(),
        delays_ms: sequence.delays().iter().map(|d| d.as_millis() as u64).collect(),
        fingerprint,
    };

    let removed = store.publish(&sequence, &manifest)?;
    log::info!(
        "Generated {} frame(s) into {} ({} old file(s) removed)",
        sequence.len(),
        store.dir().display(),
        removed
    );

    Ok(GenerateOutcome::Generated {
        frames: sequence.len(),
        removed,
    })
}
