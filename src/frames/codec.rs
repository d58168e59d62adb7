//! Text encoding of a single frame.
//!
//! A frame is stored as its rows joined by `\n`. Colored cells are
//! preceded by an SGR foreground escape (`ESC[38;2;R;G;Bm` or
//! `ESC[38;5;Nm`) whenever the color changes along a row, and every row
//! that ends colored is closed with `ESC[0m`. Frames without color are a
//! raw glyph stream.
//!
//! The decoder also accepts the per-character style where every glyph is
//! wrapped in its own color and reset pair. Glyphs that do not occupy
//! exactly one terminal column decode as blanks.

use super::frame::{Cell, Frame};
use crate::ascii::single_column;
use crate::color::{ColorToken, Rgb};

/// Reasons a frame's text cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("frame text is empty")]
    Empty,
    #[error("unterminated escape sequence")]
    UnterminatedEscape,
    #[error("unsupported escape sequence '{0}'")]
    UnsupportedEscape(String),
    #[error("invalid color parameters '{0}'")]
    InvalidColor(String),
}

/// Encode a frame as a self-contained text unit.
pub fn encode_frame(frame: &Frame) -> String {
    let mut out = String::with_capacity(frame.cells().len() + frame.height() as usize);

    for (y, row) in frame.rows().enumerate() {
        if y > 0 {
            out.push('\n');
        }
        encode_row(row, &mut out);
    }

    out
}

/// Append one row of cells, closing it with a reset if it ends colored.
pub fn encode_row(row: &[Cell], out: &mut String) {
    let mut current = ColorToken::None;
    for cell in row {
        if cell.color != current {
            cell.color.write_escape(out);
            current = cell.color;
        }
        out.push(cell.glyph);
    }
    if !current.is_none() {
        ColorToken::None.write_escape(out);
    }
}

/// Decode a frame previously produced by [`encode_frame`].
///
/// Rows of different visible length are padded with blank cells to the
/// longest row. A trailing newline and `\r` line endings are tolerated.
///
/// # Errors
/// Returns a [`CodecError`] for empty input or escapes other than SGR.
pub fn decode_frame(text: &str) -> Result<Frame, CodecError> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    if text.is_empty() {
        return Err(CodecError::Empty);
    }

    let mut rows = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        rows.push(decode_row(line)?);
    }

    Ok(Frame::from_rows(rows))
}

fn decode_row(line: &str) -> Result<Vec<Cell>, CodecError> {
    let mut cells = Vec::new();
    let mut current = ColorToken::None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            cells.push(Cell::new(single_column(c), current));
            continue;
        }

        if chars.next() != Some('[') {
            return Err(CodecError::UnsupportedEscape("ESC".to_string()));
        }
        let mut params = String::new();
        let final_byte = loop {
            match chars.next() {
                Some(ch) if ch.is_ascii_digit() || ch == ';' => params.push(ch),
                Some(ch) => break ch,
                None => return Err(CodecError::UnterminatedEscape),
            }
        };
        if final_byte != 'm' {
            return Err(CodecError::UnsupportedEscape(format!("ESC[{params}{final_byte}")));
        }
        current = apply_sgr(current, &params)?;
    }

    Ok(cells)
}

/// Apply one SGR parameter list to the running color.
///
/// Only the foreground color is tracked; other attributes are ignored.
fn apply_sgr(current: ColorToken, params: &str) -> Result<ColorToken, CodecError> {
    if params.is_empty() {
        return Ok(ColorToken::None);
    }

    let invalid = || CodecError::InvalidColor(params.to_string());
    let values = params
        .split(';')
        .map(|p| if p.is_empty() { Ok(0) } else { p.parse::<u16>() })
        .collect::<Result<Vec<u16>, _>>()
        .map_err(|_| invalid())?;

    let channel = |v: Option<&u16>| -> Result<u8, CodecError> {
        v.and_then(|&v| u8::try_from(v).ok()).ok_or_else(invalid)
    };

    let mut color = current;
    let mut i = 0;
    while i < values.len() {
        match values[i] {
            0 | 39 => {
                color = ColorToken::None;
                i += 1;
            }
            38 => match values.get(i + 1) {
                Some(2) => {
                    let r = channel(values.get(i + 2))?;
                    let g = channel(values.get(i + 3))?;
                    let b = channel(values.get(i + 4))?;
                    color = ColorToken::TrueColor(Rgb::new(r, g, b));
                    i += 5;
                }
                Some(5) => {
                    color = ColorToken::Ansi256(channel(values.get(i + 2))?);
                    i += 3;
                }
                _ => return Err(invalid()),
            },
            _ => i += 1,
        }
    }

    Ok(color)
}
