//! Side-by-side rendering of the animation box and the info block.
//!
//! Every composite row is `art │ info`: the art part is exactly the
//! bounding box width, and there are exactly bounding box height rows.
//! Loop playback redraws the whole block in place by moving the cursor
//! back to its first row.

mod loader;
mod placeholder;

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::terminal::{Clear, ClearType};
use serde::{Deserialize, Serialize};

use crate::ascii::single_column;
use crate::color::{ColorMode, Theme};
use crate::frames::{encode_row, Cell, Frame, FrameSequence};
use crate::sysinfo::{InfoBlock, InfoProvider};
use crate::terminal::{pad_ansi, strip_ansi, truncate_ansi, visible_width, HiddenCursor};

pub use loader::load_sequence;
pub use placeholder::placeholder;

/// Separator between the art and the info block.
pub const DEFAULT_SEPARATOR: &str = " │ ";

/// Longest single sleep while waiting for the next tick.
const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// Fixed character rectangle of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub width: u16,
    pub height: u16,
}

impl BoundingBox {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Vertical placement of the info block next to the art.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoAlign {
    #[default]
    Top,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Draw the animation box. When false, info is rendered flush left.
    pub show_ascii: bool,
    pub info_align: InfoAlign,
    pub separator: String,
    /// Terminal width used to clip info lines; unknown means no clipping
    pub term_width: Option<usize>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            show_ascii: true,
            info_align: InfoAlign::Top,
            separator: DEFAULT_SEPARATOR.to_string(),
            term_width: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playback {
    /// Render the first frame once
    #[default]
    Static,
    /// Animate; `None` loops until cancelled
    Loop { loops: Option<u32> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositorConfig {
    pub bounding_box: BoundingBox,
    pub color_mode: ColorMode,
    pub theme: Theme,
    pub layout: Layout,
    pub frame_interval: Duration,
    pub playback: Playback,
    /// How often loop playback asks the provider for fresh info
    pub info_refresh: Duration,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            bounding_box: BoundingBox::new(40, 20),
            color_mode: ColorMode::None,
            theme: Theme::Dark,
            layout: Layout::default(),
            frame_interval: Duration::from_secs(1) / 12,
            playback: Playback::Static,
            info_refresh: Duration::from_secs(1),
        }
    }
}

/// Renders frames beside an info block.
#[derive(Debug, Clone)]
pub struct Compositor {
    config: CompositorConfig,
}

impl Compositor {
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    fn colored(&self) -> bool {
        self.config.color_mode != ColorMode::None
    }

    /// Frame rows fitted to the box, colored for this run.
    ///
    /// Every row is exactly `bounding_box.width` terminal columns wide.
    pub fn art_rows(&self, frame: &Frame) -> Vec<String> {
        let bbox = self.config.bounding_box;
        let width = bbox.width as usize;
        let frame = frame
            .resample(bbox.width, bbox.height)
            .recolor(self.config.color_mode, self.config.theme);

        let mut rows: Vec<String> = frame
            .rows()
            .map(|row| {
                let cells: Vec<Cell> = row.iter().map(|c| Cell::new(single_column(c.glyph), c.color)).collect();
                let mut line = String::with_capacity(cells.len());
                encode_row(&cells, &mut line);
                pad_ansi(&line, width)
            })
            .collect();
        // A zero-width frame has no cells, so rows() yields nothing.
        rows.resize(bbox.height as usize, " ".repeat(width));
        rows
    }

    /// Info lines as displayed: stripped of SGR when uncolored and clipped
    /// to `max_width` columns.
    fn info_lines<'a>(&self, info: &'a InfoBlock, max_width: Option<usize>) -> impl Iterator<Item = String> + 'a {
        let colored = self.colored();
        info.lines().iter().map(move |line| {
            let line = if colored { line.clone() } else { strip_ansi(line) };
            match max_width {
                Some(max) if visible_width(&line) > max => truncate_ansi(&line, max),
                _ => line,
            }
        })
    }

    /// Compose one frame and the info block into display rows.
    ///
    /// With the art shown, exactly `bounding_box.height` rows are returned
    /// and each starts with exactly `bounding_box.width` visible columns.
    /// Info longer than the box is truncated, shorter info is padded with
    /// empty lines according to the alignment.
    pub fn compose(&self, frame: &Frame, info: &InfoBlock) -> Vec<String> {
        let layout = &self.config.layout;

        if !layout.show_ascii {
            return self.info_lines(info, layout.term_width).collect();
        }

        let bbox = self.config.bounding_box;
        let height = bbox.height as usize;
        let prefix_width = bbox.width as usize + visible_width(&layout.separator);
        let info_width = layout.term_width.map(|w| w.saturating_sub(prefix_width));

        let shown = info.len().min(height);
        let offset = match layout.info_align {
            InfoAlign::Top => 0,
            InfoAlign::Center => (height - shown) / 2,
        };
        let mut right = vec![String::new(); height];
        for (slot, line) in right[offset..].iter_mut().zip(self.info_lines(info, info_width).take(shown)) {
            *slot = line;
        }

        let separator = if self.colored() {
            layout.separator.clone()
        } else {
            strip_ansi(&layout.separator)
        };

        self.art_rows(frame)
            .into_iter()
            .zip(right)
            .map(|(art, info)| {
                let mut row = art;
                if info_width == Some(0) {
                    return row;
                }
                row.push_str(&separator);
                row.push_str(&info);
                row
            })
            .collect()
    }

    /// Frame shown on `tick`, or `fallback` for an empty sequence.
    fn frame_at<'a>(&self, sequence: &'a FrameSequence, tick: u64, fallback: &'a Frame) -> &'a Frame {
        sequence.frame_for_tick(tick).unwrap_or(fallback)
    }

    /// Write one static composite of the first frame.
    pub fn render_once<W: Write>(&self, out: &mut W, sequence: &FrameSequence, info: &InfoBlock) -> io::Result<()> {
        let fallback = placeholder(self.config.bounding_box);
        let frame = self.frame_at(sequence, 0, &fallback);

        for row in self.compose(frame, info) {
            out.write_all(row.as_bytes())?;
            out.write_all(b"\n")?;
        }
        if self.colored() {
            out.write_all(b"\x1b[0m")?;
        }
        out.flush()
    }

    /// Play the sequence according to the configured playback.
    ///
    /// Static playback renders once. Loop playback redraws the block every
    /// `frame_interval` until the loop bound is reached or `cancel` is set,
    /// and returns the number of ticks drawn. On return the cursor is
    /// below the block, visible, with attributes reset.
    pub fn run<W: Write>(
        &self,
        out: &mut W,
        sequence: &FrameSequence,
        provider: &dyn InfoProvider,
        cancel: &AtomicBool,
    ) -> io::Result<u64> {
        let loops = match self.config.playback {
            Playback::Static => {
                self.render_once(out, sequence, &provider.collect())?;
                return Ok(1);
            }
            Playback::Loop { loops } => loops,
        };

        let fallback = placeholder(self.config.bounding_box);
        let frame_count = sequence.len().max(1) as u64;
        let max_ticks = loops.map(|n| u64::from(n.max(1)) * frame_count);

        let mut cursor = HiddenCursor::hide(out)?;
        let out = cursor.writer();

        let mut info = provider.collect();
        let mut last_refresh = Instant::now();
        let mut drawn_rows = 0usize;
        let mut tick = 0u64;

        while max_ticks.map_or(true, |max| tick < max) && !cancel.load(Ordering::SeqCst) {
            let tick_start = Instant::now();

            if last_refresh.elapsed() >= self.config.info_refresh {
                info = provider.collect();
                last_refresh = Instant::now();
            }

            if drawn_rows > 0 {
                crossterm::queue!(out, MoveUp(drawn_rows as u16), MoveToColumn(0))?;
            }

            let rows = self.compose(self.frame_at(sequence, tick, &fallback), &info);
            let total = rows.len().max(drawn_rows);
            let mut written = 0;
            for row in &rows {
                if cancel.load(Ordering::SeqCst) {
                    break;
                }
                out.write_all(row.as_bytes())?;
                crossterm::queue!(out, Clear(ClearType::UntilNewLine))?;
                out.write_all(b"\n")?;
                written += 1;
            }

            if written < rows.len() {
                // Cancelled mid-pass: step past the rows left from the previous pass.
                for _ in written..total {
                    out.write_all(b"\n")?;
                }
                out.flush()?;
                break;
            }

            // A shorter block leaves stale rows of the previous pass below it.
            if rows.len() < drawn_rows {
                crossterm::queue!(out, Clear(ClearType::FromCursorDown))?;
            }
            out.flush()?;
            drawn_rows = rows.len();
            tick += 1;

            sleep_until(tick_start + self.config.frame_interval, cancel);
        }

        if self.colored() {
            out.write_all(b"\x1b[0m")?;
        }
        out.flush()?;
        log::debug!("Playback stopped after {} tick(s)", tick);
        Ok(tick)
    }
}

/// Sleep until `deadline` in short slices, returning early on cancel.
fn sleep_until(deadline: Instant, cancel: &AtomicBool) {
    loop {
        if cancel.load(Ordering::SeqCst) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep((deadline - now).min(SLEEP_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorToken, Rgb};
    use crate::sysinfo::StaticInfo;

    fn compositor(width: u16, height: u16, color_mode: ColorMode) -> Compositor {
        Compositor::new(CompositorConfig {
            bounding_box: BoundingBox::new(width, height),
            color_mode,
            ..CompositorConfig::default()
        })
    }

    fn info(n: usize) -> InfoBlock {
        (0..n).map(|i| format!("\x1b[1mLine{i}:\x1b[0m value")).collect()
    }

    fn red_frame(width: u16, height: u16) -> Frame {
        let cell = Cell::new('#', ColorToken::TrueColor(Rgb::new(255, 0, 0)));
        Frame::from_cells(vec![cell; width as usize * height as usize], width, height).unwrap()
    }

    fn art_part(row: &str, width: usize) -> String {
        strip_ansi(row).chars().take(width).collect()
    }

    // ==================== Compose Tests ====================

    #[test]
    fn test_compose_shape_for_info_lengths() {
        let c = compositor(6, 4, ColorMode::TrueColor);
        let frame = red_frame(6, 4);
        for n in [0, 4, 9] {
            let rows = c.compose(&frame, &info(n));
            assert_eq!(rows.len(), 4, "info length {n}");
            for row in &rows {
                assert_eq!(art_part(row, 6), "######");
                assert!(strip_ansi(row)[6..].starts_with(" │ "));
            }
        }
    }

    #[test]
    fn test_compose_resamples_frame_to_box() {
        let c = compositor(4, 2, ColorMode::None);
        let rows = c.compose(&Frame::blank(9, 7), &InfoBlock::default());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r == "     │ "));
    }

    #[test]
    fn test_art_rows_hold_box_width_for_wide_glyphs() {
        let c = compositor(4, 2, ColorMode::TrueColor);
        let wide = Cell::new('日', ColorToken::TrueColor(Rgb::new(0, 255, 0)));
        let frame = Frame::from_rows(vec![vec![wide; 4], "\t\tab".chars().map(Cell::plain).collect()]);
        let rows = c.art_rows(&frame);
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(visible_width(row), 4);
            assert!(!row.contains('\t'));
        }
        assert_eq!(strip_ansi(&rows[1]), "  ab");
    }

    #[test]
    fn test_compose_top_and_center_alignment() {
        let mut c = compositor(2, 5, ColorMode::None);
        let block: InfoBlock = vec!["a".to_string(), "b".to_string()].into();
        let rows = c.compose(&Frame::blank(2, 5), &block);
        assert_eq!(rows[0], "   │ a");
        assert_eq!(rows[1], "   │ b");
        assert_eq!(rows[2], "   │ ");

        c.config.layout.info_align = InfoAlign::Center;
        let rows = c.compose(&Frame::blank(2, 5), &block);
        assert_eq!(rows[0], "   │ ");
        assert_eq!(rows[1], "   │ a");
        assert_eq!(rows[2], "   │ b");
    }

    #[test]
    fn test_compose_truncates_info_to_box_height() {
        let c = compositor(1, 2, ColorMode::None);
        let block: InfoBlock = vec!["a".to_string(), "b".to_string(), "c".to_string()].into();
        let rows = c.compose(&Frame::blank(1, 2), &block);
        assert_eq!(rows, vec!["  │ a".to_string(), "  │ b".to_string()]);
    }

    #[test]
    fn test_compose_clips_info_to_terminal_width() {
        let mut c = compositor(4, 1, ColorMode::TrueColor);
        c.config.layout.term_width = Some(10);
        let rows = c.compose(&red_frame(4, 1), &info(1));
        assert_eq!(visible_width(&rows[0]), 10);
        assert!(rows[0].ends_with("\x1b[0m"));
    }

    #[test]
    fn test_compose_colored_rows_reset() {
        let c = compositor(3, 2, ColorMode::Ansi256);
        for row in c.compose(&red_frame(3, 2), &InfoBlock::default()) {
            assert!(row.starts_with("\x1b[38;5;196m###\x1b[0m"));
        }
    }

    #[test]
    fn test_none_mode_emits_no_escapes() {
        let c = compositor(3, 2, ColorMode::None);
        let rows = c.compose(&red_frame(3, 2), &info(3));
        assert!(rows.iter().all(|r| !r.contains('\x1b')));
        assert_eq!(rows[0], "### │ Line0: value");
    }

    #[test]
    fn test_light_theme_recolors() {
        let mut c = compositor(1, 1, ColorMode::TrueColor);
        c.config.theme = Theme::Light;
        let rows = c.compose(&red_frame(1, 1), &InfoBlock::default());
        assert!(!rows[0].contains("38;2;255;0;0"));
    }

    #[test]
    fn test_no_ascii_renders_info_only() {
        let mut c = compositor(10, 3, ColorMode::None);
        c.config.layout.show_ascii = false;
        let rows = c.compose(&Frame::blank(10, 3), &info(5));
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], "Line0: value");
    }

    // ==================== Render Tests ====================

    #[test]
    fn test_render_once_empty_sequence_uses_placeholder() {
        let c = compositor(12, 4, ColorMode::None);
        let mut out = Vec::new();
        c.render_once(&mut out, &FrameSequence::default(), &InfoBlock::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with('┌'));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_render_once_colored_ends_with_reset() {
        let c = compositor(2, 1, ColorMode::TrueColor);
        let seq = FrameSequence::new(vec![red_frame(2, 1)]);
        let mut out = Vec::new();
        c.render_once(&mut out, &seq, &InfoBlock::default()).unwrap();
        assert!(out.ends_with(b"\x1b[0m"));
    }

    #[test]
    fn test_run_bounded_loop_cycles_frames() {
        let mut c = compositor(1, 1, ColorMode::None);
        c.config.playback = Playback::Loop { loops: Some(2) };
        c.config.frame_interval = Duration::ZERO;
        let frames = ['a', 'b', 'c'].map(|g| Frame::from_cells(vec![Cell::plain(g)], 1, 1).unwrap());
        let seq = FrameSequence::new(frames.to_vec());

        let mut out = Vec::new();
        let ticks = c
            .run(&mut out, &seq, &StaticInfo(InfoBlock::default()), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(ticks, 6);

        let text = String::from_utf8(out).unwrap();
        let glyphs: String = text.chars().filter(|c| "abc".contains(*c)).collect();
        assert_eq!(glyphs, "abcabc");
        assert!(text.ends_with("\x1b[?25h"));
    }

    /// Writer that sets the cancel flag once `limit` newlines went through.
    struct CancelAfterNewlines<'a> {
        out: Vec<u8>,
        newlines: usize,
        limit: usize,
        cancel: &'a AtomicBool,
    }

    impl Write for CancelAfterNewlines<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.out.extend_from_slice(buf);
            self.newlines += buf.iter().filter(|&&b| b == b'\n').count();
            if self.newlines >= self.limit {
                self.cancel.store(true, Ordering::SeqCst);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_run_cancelled_mid_pass_leaves_whole_rows() {
        let mut c = compositor(3, 4, ColorMode::TrueColor);
        c.config.playback = Playback::Loop { loops: None };
        c.config.frame_interval = Duration::ZERO;
        let seq = FrameSequence::new(vec![red_frame(3, 4)]);

        let cancel = AtomicBool::new(false);
        let mut out = CancelAfterNewlines {
            out: Vec::new(),
            newlines: 0,
            limit: 6,
            cancel: &cancel,
        };
        let ticks = c
            .run(&mut out, &seq, &StaticInfo(InfoBlock::default()), &cancel)
            .unwrap();
        assert_eq!(ticks, 1);

        let text = String::from_utf8(out.out).unwrap();
        let second_pass = &text[text.rfind("\x1b[4A").unwrap()..];
        let segments: Vec<&str> = second_pass.split('\n').collect();
        // Two complete rows, two empty steps past the old block, then the restore.
        assert_eq!(segments.len(), 5);
        assert_eq!(strip_ansi(segments[0]), "### │ ");
        assert_eq!(strip_ansi(segments[1]), "### │ ");
        assert_eq!(segments[2], "");
        assert_eq!(segments[3], "");
        assert_eq!(segments[4], "\x1b[0m\x1b[?25h");
    }

    #[test]
    fn test_run_cancelled_before_start_draws_nothing() {
        let mut c = compositor(2, 2, ColorMode::None);
        c.config.playback = Playback::Loop { loops: None };
        let mut out = Vec::new();
        let ticks = c
            .run(&mut out, &FrameSequence::default(), &StaticInfo::default(), &AtomicBool::new(true))
            .unwrap();
        assert_eq!(ticks, 0);
        assert!(!String::from_utf8(out).unwrap().contains('┌'));
    }

    #[test]
    fn test_run_static_renders_once() {
        let c = compositor(2, 1, ColorMode::None);
        let mut out = Vec::new();
        let ticks = c
            .run(&mut out, &FrameSequence::default(), &StaticInfo::default(), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(ticks, 1);
        // A 2x1 box is too small for a border, so the placeholder is blank.
        assert_eq!(String::from_utf8(out).unwrap(), "   │ \n");
    }

    #[test]
    fn test_sleep_until_returns_on_cancel() {
        let start = Instant::now();
        sleep_until(start + Duration::from_secs(5), &AtomicBool::new(true));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
