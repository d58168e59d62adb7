//! Luminance to glyph mapping.

use super::charset::RAMP;

/// Map a luminance value to a glyph on the ramp.
///
/// `index = round(luminance × (len − 1))`, mirrored when `invert` is set.
/// Luminance is clamped to `[0, 1]`; NaN counts as 0.
///
/// # Example
/// ```ignore
/// assert_eq!(sample(0.0, false), ' ');
/// assert_eq!(sample(1.0, false), '@');
/// assert_eq!(sample(1.0, true), ' ');
/// ```
pub fn sample(luminance: f32, invert: bool) -> char {
    let l = if luminance.is_nan() { 0.0 } else { luminance.clamp(0.0, 1.0) };
    let last = RAMP.len() - 1;
    let idx = ((l * last as f32).round() as usize).min(last);
    let idx = if invert { last - idx } else { idx };
    RAMP[idx]
}

/// Map an 8-bit brightness value to a glyph.
#[inline]
pub fn sample_u8(brightness: u8, invert: bool) -> char {
    sample(brightness as f32 / 255.0, invert)
}

/// Map a grid of brightness values to glyphs.
///
/// # Arguments
/// * `brightness` - Brightness values (0-255), one per character cell
/// * `invert` - If true, dense glyphs go to dark cells instead
pub fn map_to_chars(brightness: &[u8], invert: bool) -> Vec<char> {
    brightness.iter().map(|&b| sample_u8(b, invert)).collect()
}
