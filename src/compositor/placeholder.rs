//! Built-in frame shown when no animation is available.

use super::BoundingBox;
use crate::frames::{Cell, Frame};

const MESSAGE: &str = "no frames";
const HINT: &str = "run gen-frames";

/// A bordered box filling `bbox`, with a short message when it fits.
///
/// Boxes smaller than 2×2 are blank.
pub fn placeholder(bbox: BoundingBox) -> Frame {
    let (w, h) = (bbox.width as usize, bbox.height as usize);
    if w < 2 || h < 2 {
        return Frame::blank(bbox.width, bbox.height);
    }

    let inner = w - 2;
    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(h);
    rows.push(border_row('┌', '┐', inner));
    for _ in 0..h - 2 {
        rows.push(text_row("", inner));
    }
    rows.push(border_row('└', '┘', inner));

    let interior = h - 2;
    if interior >= 1 {
        let mid = 1 + (interior - 1) / 2;
        rows[mid] = text_row(MESSAGE, inner);
        if interior >= 3 {
            rows[mid + 1] = text_row(HINT, inner);
        }
    }

    Frame::from_rows(rows)
}

fn border_row(left: char, right: char, inner: usize) -> Vec<Cell> {
    std::iter::once(left)
        .chain(std::iter::repeat('─').take(inner))
        .chain(std::iter::once(right))
        .map(Cell::plain)
        .collect()
}

/// `│ text │` with the text centered and clipped to the interior.
fn text_row(text: &str, inner: usize) -> Vec<Cell> {
    let text: Vec<char> = text.chars().take(inner).collect();
    let left = (inner - text.len()) / 2;
    let right = inner - text.len() - left;

    std::iter::once('│')
        .chain(std::iter::repeat(' ').take(left))
        .chain(text)
        .chain(std::iter::repeat(' ').take(right))
        .chain(std::iter::once('│'))
        .map(Cell::plain)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_fills_box() {
        for (w, h) in [(40, 20), (2, 2), (5, 3), (13, 4), (1, 1), (0, 5)] {
            let frame = placeholder(BoundingBox::new(w, h));
            assert_eq!((frame.width(), frame.height()), (w, h));
        }
    }

    #[test]
    fn test_placeholder_border_and_message() {
        let text = placeholder(BoundingBox::new(18, 5)).to_string_display();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], format!("┌{}┐", "─".repeat(16)));
        assert_eq!(lines[1], format!("│{}│", " ".repeat(16)));
        assert_eq!(lines[2], "│   no frames    │");
        assert_eq!(lines[3], "│ run gen-frames │");
        assert_eq!(lines[4], format!("└{}┘", "─".repeat(16)));
    }

    #[test]
    fn test_placeholder_clips_message() {
        let text = placeholder(BoundingBox::new(6, 3)).to_string_display();
        assert_eq!(text.lines().nth(1), Some("│no f│"));
    }

    #[test]
    fn test_placeholder_has_no_color() {
        assert!(placeholder(BoundingBox::new(10, 5)).cells().iter().all(|c| c.color.is_none()));
    }
}
