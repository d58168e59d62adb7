//! Integration tests for playback: frame store → loader → compositor.

use std::fs;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use gifzitto::color::{ColorMode, ColorToken, Rgb, Theme};
use gifzitto::compositor::{
    load_sequence, placeholder, BoundingBox, Compositor, CompositorConfig, InfoAlign, Layout, Playback,
};
use gifzitto::frames::{Cell, Frame, FrameSequence, FrameStore, GeneratorOptions, Manifest};
use gifzitto::sysinfo::{InfoBlock, InfoModule, StaticInfo, SystemInfo};
use gifzitto::terminal::{strip_ansi, visible_width};
use gifzitto::theme::{ThemeDetector, ThemeSource};

fn publish(store: &FrameStore, frames: Vec<Frame>) {
    let seq = FrameSequence::new(frames);
    let (width, height) = seq.dimensions();
    let manifest = Manifest {
        width,
        height,
        color_mode: ColorMode::TrueColor,
        invert: false,
        char_aspect: 2.0,
        frame_count: seq.len(),
        delays_ms: vec![0; seq.len()],
        fingerprint: Manifest::fingerprint(b"test", &GeneratorOptions::default()),
    };
    store.publish(&seq, &manifest).unwrap();
}

fn filled(glyph: char, color: ColorToken, width: u16, height: u16) -> Frame {
    Frame::from_cells(vec![Cell::new(glyph, color); width as usize * height as usize], width, height).unwrap()
}

fn compositor(bbox: BoundingBox, color_mode: ColorMode) -> Compositor {
    Compositor::new(CompositorConfig {
        bounding_box: bbox,
        color_mode,
        ..CompositorConfig::default()
    })
}

fn lines(n: usize) -> InfoBlock {
    (0..n).map(|i| format!("\x1b[1mKey{i}:\x1b[0m v{i}")).collect()
}

// ==================== Loader Tests ====================

#[test]
fn test_empty_store_renders_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let bbox = BoundingBox::new(20, 6);
    let seq = load_sequence(&FrameStore::new(dir.path()), bbox);
    assert!(seq.is_empty());

    let c = compositor(bbox, ColorMode::None);
    let mut out = Vec::new();
    c.render_once(&mut out, &seq, &lines(2)).unwrap();
    let text = String::from_utf8(out).unwrap();

    let expected_art = placeholder(bbox).to_string_display();
    for (row, art) in text.lines().zip(expected_art.lines()) {
        assert!(row.starts_with(art));
    }
    assert!(text.contains("no frames"));
}

#[test]
fn test_loaded_frames_fit_the_box() {
    let dir = tempfile::tempdir().unwrap();
    let store = FrameStore::new(dir.path());
    publish(&store, vec![filled('#', ColorToken::None, 40, 20); 3]);

    let seq = load_sequence(&store, BoundingBox::new(10, 5));
    assert_eq!(seq.len(), 3);
    assert_eq!(seq.dimensions(), (10, 5));
}

#[test]
fn test_malformed_slot_becomes_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let store = FrameStore::new(dir.path());
    publish(&store, vec![filled('#', ColorToken::None, 8, 4); 2]);
    fs::write(store.frame_path(0), "\x1b]broken").unwrap();

    let bbox = BoundingBox::new(8, 4);
    let seq = load_sequence(&store, bbox);
    assert_eq!(seq.len(), 2);
    assert_eq!(seq.frames()[0], placeholder(bbox));
    assert_eq!(seq.frames()[1], filled('#', ColorToken::None, 8, 4));
}

#[test]
fn test_wide_and_control_glyphs_stay_inside_box() {
    let dir = tempfile::tempdir().unwrap();
    let store = FrameStore::new(dir.path());
    fs::write(store.frame_path(0), "日本語日\n\t\tab").unwrap();

    let bbox = BoundingBox::new(4, 2);
    let seq = load_sequence(&store, bbox);
    let rows = compositor(bbox, ColorMode::None).compose(&seq.frames()[0], &InfoBlock::default());

    assert_eq!(rows, vec!["     │ ".to_string(), "  ab │ ".to_string()]);
    assert!(rows.iter().all(|r| visible_width(r) == 4 + 3));
}

// ==================== Layout Tests ====================

#[test]
fn test_row_count_and_art_width_for_any_info_length() {
    let bbox = BoundingBox::new(12, 6);
    let frame = filled('@', ColorToken::TrueColor(Rgb::new(0, 200, 0)), 12, 6);
    let c = compositor(bbox, ColorMode::TrueColor);

    for n in [0, 6, 11] {
        let rows = c.compose(&frame, &lines(n));
        assert_eq!(rows.len(), 6, "info length {}", n);
        for row in &rows {
            let plain = strip_ansi(row);
            let art: String = plain.chars().take(12).collect();
            assert_eq!(art, "@".repeat(12));
            assert!(visible_width(row) >= 12 + 3);
        }
    }
}

#[test]
fn test_info_past_box_height_is_dropped() {
    let c = compositor(BoundingBox::new(4, 3), ColorMode::None);
    let rows = c.compose(&Frame::blank(4, 3), &lines(8));
    let text = rows.join("\n");
    assert!(text.contains("Key2: v2"));
    assert!(!text.contains("Key3"));
}

#[test]
fn test_centered_info() {
    let c = Compositor::new(CompositorConfig {
        bounding_box: BoundingBox::new(2, 7),
        layout: Layout {
            info_align: InfoAlign::Center,
            ..Layout::default()
        },
        ..CompositorConfig::default()
    });
    let rows = c.compose(&Frame::blank(2, 7), &lines(3));
    assert_eq!(rows[1], "   │ ");
    assert_eq!(rows[2], "   │ Key0: v0");
    assert_eq!(rows[4], "   │ Key2: v2");
    assert_eq!(rows[5], "   │ ");
}

#[test]
fn test_no_ascii_prints_info_only() {
    let c = Compositor::new(CompositorConfig {
        bounding_box: BoundingBox::new(30, 10),
        layout: Layout {
            show_ascii: false,
            ..Layout::default()
        },
        ..CompositorConfig::default()
    });
    let mut out = Vec::new();
    c.render_once(&mut out, &FrameSequence::default(), &lines(2)).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "Key0: v0\nKey1: v1\n");
}

// ==================== Color Tests ====================

#[test]
fn test_none_mode_output_has_no_escapes_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = FrameStore::new(dir.path());
    publish(&store, vec![filled('#', ColorToken::TrueColor(Rgb::new(250, 10, 10)), 6, 3)]);

    let bbox = BoundingBox::new(6, 3);
    let c = compositor(bbox, ColorMode::None);
    let root = tempfile::tempdir().unwrap();
    let info = SystemInfo::new()
        .with_root(root.path())
        .with_env(|key| (key == "SHELL").then(|| "/bin/sh".to_string()))
        .styled(false)
        .with_modules(vec![InfoModule::Shell, InfoModule::Colors]);

    let mut out = Vec::new();
    c.run(&mut out, &load_sequence(&store, bbox), &info, &AtomicBool::new(false))
        .unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(!text.contains('\x1b'));
    assert_eq!(text.lines().next(), Some("###### │ Shell: /bin/sh"));
}

#[test]
fn test_ansi256_mode_downgrades_stored_truecolor() {
    let c = compositor(BoundingBox::new(2, 1), ColorMode::Ansi256);
    let frame = filled('#', ColorToken::TrueColor(Rgb::new(255, 0, 0)), 2, 1);
    let rows = c.compose(&frame, &InfoBlock::default());
    assert!(rows[0].contains("\x1b[38;5;"));
    assert!(!rows[0].contains("38;2;"));
}

#[test]
fn test_theme_from_override_reaches_compositor() {
    let detector = ThemeDetector::new()
        .without_probe()
        .with_env(|key| (key == "GIFZITTO_THEME").then(|| "light".to_string()));
    assert_eq!(detector.detect_with_source(), (Theme::Light, ThemeSource::Override));

    let dark = compositor(BoundingBox::new(1, 1), ColorMode::TrueColor);
    let light = Compositor::new(CompositorConfig {
        bounding_box: BoundingBox::new(1, 1),
        color_mode: ColorMode::TrueColor,
        theme: detector.detect(),
        ..CompositorConfig::default()
    });
    let frame = filled('#', ColorToken::TrueColor(Rgb::new(250, 250, 250)), 1, 1);
    assert_ne!(
        dark.compose(&frame, &InfoBlock::default()),
        light.compose(&frame, &InfoBlock::default())
    );
}

// ==================== Playback Tests ====================

#[test]
fn test_bounded_loop_plays_each_frame_per_pass() {
    let frames: Vec<Frame> = ['x', 'y'].iter().map(|&g| filled(g, ColorToken::None, 1, 1)).collect();
    let c = Compositor::new(CompositorConfig {
        bounding_box: BoundingBox::new(1, 1),
        playback: Playback::Loop { loops: Some(3) },
        frame_interval: Duration::ZERO,
        ..CompositorConfig::default()
    });

    let mut out = Vec::new();
    let ticks = c
        .run(
            &mut out,
            &FrameSequence::new(frames),
            &StaticInfo(InfoBlock::default()),
            &AtomicBool::new(false),
        )
        .unwrap();
    assert_eq!(ticks, 6);
    let glyphs: String = String::from_utf8(out)
        .unwrap()
        .chars()
        .filter(|c| *c == 'x' || *c == 'y')
        .collect();
    assert_eq!(glyphs, "xyxyxy");
}

#[test]
fn test_info_provider_closure() {
    let c = compositor(BoundingBox::new(1, 1), ColorMode::None);
    let provider = || InfoBlock::from(vec!["dynamic".to_string()]);
    let mut out = Vec::new();
    c.run(&mut out, &FrameSequence::default(), &provider, &AtomicBool::new(false))
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "  │ dynamic\n");
}
