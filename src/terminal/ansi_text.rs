//! Measuring and clipping text that contains ANSI escape sequences.
//!
//! Escapes occupy no columns. Wide characters (CJK, most emoji) occupy two
//! columns as reported by `unicode-width`; control characters count as zero.

use unicode_width::UnicodeWidthChar;

/// One piece of a string: either an escape sequence or a visible char.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Escape(&'a str),
    Char(char),
}

/// Split `s` into escape sequences and visible characters.
///
/// Recognizes CSI (`ESC [ … final`), OSC (`ESC ] … BEL` or `ESC ] … ESC \`)
/// and two-byte escapes. An unterminated escape swallows the rest of the
/// string.
fn tokens(s: &str) -> impl Iterator<Item = Token<'_>> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let c = rest.chars().next()?;
        if c != '\x1b' {
            rest = &rest[c.len_utf8()..];
            return Some(Token::Char(c));
        }

        let len = escape_len(rest);
        let (esc, tail) = rest.split_at(len);
        rest = tail;
        Some(Token::Escape(esc))
    })
}

/// Byte length of the escape sequence at the start of `s`.
fn escape_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.get(1) {
        None => 1,
        Some(b'[') => bytes[2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map(|p| p + 3)
            .unwrap_or(bytes.len()),
        Some(b']') => {
            let mut i = 2;
            while i < bytes.len() {
                if bytes[i] == 0x07 {
                    return i + 1;
                }
                if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                    return i + 2;
                }
                i += 1;
            }
            bytes.len()
        }
        Some(_) => 1 + s[1..].chars().next().map(char::len_utf8).unwrap_or(0),
    }
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Number of terminal columns `s` occupies.
pub fn visible_width(s: &str) -> usize {
    tokens(s)
        .map(|t| match t {
            Token::Char(c) => char_width(c),
            Token::Escape(_) => 0,
        })
        .sum()
}

/// Remove every escape sequence from `s`.
pub fn strip_ansi(s: &str) -> String {
    tokens(s)
        .filter_map(|t| match t {
            Token::Char(c) => Some(c),
            Token::Escape(_) => None,
        })
        .collect()
}

/// Clip `s` to at most `max` columns, keeping escape sequences.
///
/// A wide character that would straddle the limit is dropped. When the
/// string was clipped and contained escapes, a reset is appended so styles
/// do not leak past the cut.
pub fn truncate_ansi(s: &str, max: usize) -> String {
    if visible_width(s) <= max {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut width = 0;
    let mut styled = false;
    for token in tokens(s) {
        match token {
            Token::Escape(esc) => {
                styled = true;
                out.push_str(esc);
            }
            Token::Char(c) => {
                let w = char_width(c);
                if width + w > max {
                    break;
                }
                width += w;
                out.push(c);
            }
        }
    }
    if styled {
        out.push_str("\x1b[0m");
    }
    out
}

/// Pad `s` with trailing spaces (or clip it) to exactly `target` columns.
pub fn pad_ansi(s: &str, target: usize) -> String {
    let clipped = truncate_ansi(s, target);
    let width = visible_width(&clipped);
    let mut out = clipped;
    out.extend(std::iter::repeat(' ').take(target.saturating_sub(width)));
    out
}
