//! Glyph ramp used for every generated frame.

use unicode_width::UnicodeWidthChar;

/// Density ramp (10 levels).
/// Characters ordered from sparsest (space) to densest (@).
pub const RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Sparsest glyph on the ramp, used for blank cells.
pub const SPARSEST: char = ' ';

/// Densest glyph on the ramp.
pub const DENSEST: char = '@';

/// Check whether a character belongs to the ramp.
pub fn is_ramp_glyph(c: char) -> bool {
    RAMP.contains(&c)
}

/// `c` if it occupies exactly one terminal column, otherwise the sparsest glyph.
///
/// Wide characters and control characters (tabs included) would break the
/// fixed grid, so they never reach the terminal as frame cells.
pub fn single_column(c: char) -> char {
    if c.width() == Some(1) {
        c
    } else {
        SPARSEST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(RAMP.first(), Some(&SPARSEST));
        assert_eq!(RAMP.last(), Some(&DENSEST));
    }

    #[test]
    fn test_ramp_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        assert!(RAMP.iter().all(|c| seen.insert(*c)));
    }

    #[test]
    fn test_is_ramp_glyph() {
        assert!(is_ramp_glyph('#'));
        assert!(is_ramp_glyph(' '));
        assert!(!is_ramp_glyph('x'));
        assert!(!is_ramp_glyph('│'));
    }

    #[test]
    fn test_single_column() {
        assert_eq!(single_column('#'), '#');
        assert_eq!(single_column('│'), '│');
        assert_eq!(single_column('日'), SPARSEST);
        assert_eq!(single_column('\t'), SPARSEST);
        assert_eq!(single_column('\u{200b}'), SPARSEST);
    }
}
