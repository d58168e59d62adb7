//! Character grid types produced by the generator and consumed by playback.

use std::time::Duration;

use crate::ascii::SPARSEST;
use crate::color::{ColorMode, ColorToken, Theme};

/// One styled character of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub glyph: char,
    pub color: ColorToken,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        glyph: SPARSEST,
        color: ColorToken::None,
    };

    pub const fn new(glyph: char, color: ColorToken) -> Self {
        Self { glyph, color }
    }

    pub const fn plain(glyph: char) -> Self {
        Self {
            glyph,
            color: ColorToken::None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

/// Fixed-size grid of cells, stored row-major.
///
/// Frames are immutable once built; transformations return new frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
}

impl Default for Frame {
    fn default() -> Self {
        Self::blank(0, 0)
    }
}

impl Frame {
    /// Create a frame filled with blank cells.
    pub fn blank(width: u16, height: u16) -> Self {
        Self {
            cells: vec![Cell::BLANK; (width as usize) * (height as usize)],
            width,
            height,
        }
    }

    /// Create a frame from row-major cells.
    ///
    /// Returns `None` if `cells.len() != width * height`.
    pub fn from_cells(cells: Vec<Cell>, width: u16, height: u16) -> Option<Self> {
        if cells.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { cells, width, height })
    }

    /// Build a frame from rows of possibly different lengths.
    ///
    /// The width is the longest row; shorter rows are padded with blanks.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0).min(u16::MAX as usize);
        let height = rows.len().min(u16::MAX as usize);
        let mut cells = Vec::with_capacity(width * height);
        for mut row in rows.into_iter().take(height) {
            row.resize(width, Cell::BLANK);
            cells.extend(row);
        }
        Self {
            cells,
            width: width as u16,
            height: height as u16,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get((y as usize) * (self.width as usize) + x as usize)
    }

    /// Iterate rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        // chunks() panics on 0, and a zero-width frame has no cells anyway.
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Glyphs only, rows joined by newlines.
    pub fn to_string_display(&self) -> String {
        self.rows()
            .map(|row| row.iter().map(|c| c.glyph).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Nearest-cell resample to new dimensions.
    ///
    /// Used when a stored sequence does not match the configured bounding
    /// box. Equal dimensions return an identical copy.
    pub fn resample(&self, width: u16, height: u16) -> Frame {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if self.is_empty() {
            return Frame::blank(width, height);
        }

        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height as usize {
            let sy = y * self.height as usize / height as usize;
            for x in 0..width as usize {
                let sx = x * self.width as usize / width as usize;
                cells.push(self.cells[sy * self.width as usize + sx]);
            }
        }
        Frame { cells, width, height }
    }

    /// Re-map every cell color for the given mode and theme.
    pub fn recolor(&self, mode: ColorMode, theme: Theme) -> Frame {
        Frame {
            cells: self
                .cells
                .iter()
                .map(|c| Cell::new(c.glyph, c.color.remap(mode, theme)))
                .collect(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Ordered frames of one animation, all with identical dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    delays: Vec<Duration>,
}

impl FrameSequence {
    /// Build a sequence, resampling every frame to the first frame's size.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self::with_delays(frames, Vec::new())
    }

    /// Build a sequence with per-frame source delays.
    ///
    /// `delays` may be shorter than `frames`; missing entries read as zero.
    pub fn with_delays(frames: Vec<Frame>, delays: Vec<Duration>) -> Self {
        let (w, h) = frames.first().map(|f| (f.width(), f.height())).unwrap_or((0, 0));
        let frames = frames
            .into_iter()
            .map(|f| if f.width() == w && f.height() == h { f } else { f.resample(w, h) })
            .collect();
        Self { frames, delays }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Frame shown on a playback tick (`tick mod len`).
    pub fn frame_for_tick(&self, tick: u64) -> Option<&Frame> {
        if self.frames.is_empty() {
            return None;
        }
        self.frames.get((tick % self.frames.len() as u64) as usize)
    }

    /// Source delay of a frame, zero when unknown.
    pub fn delay(&self, index: usize) -> Duration {
        self.delays.get(index).copied().unwrap_or_default()
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// `(width, height)` shared by every frame, `(0, 0)` when empty.
    pub fn dimensions(&self) -> (u16, u16) {
        self.frames
            .first()
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0))
    }
}
