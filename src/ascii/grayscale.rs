//! RGB to grayscale conversion using ITU-R BT.601 luminance formula.

/// Luminance of a single RGB sample.
///
/// Y = 0.299*R + 0.587*G + 0.114*B, with the coefficients scaled by 1000
/// so the hot path stays in integer math.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (r as u32, g as u32, b as u32);
    ((299 * r + 587 * g + 114 * b) / 1000) as u8
}

/// Convert a packed RGB buffer (3 bytes per pixel) to grayscale.
///
/// # Returns
/// A vector of grayscale values (0-255), one per pixel. A trailing partial
/// pixel is ignored.
pub fn to_grayscale(rgb: &[u8]) -> Vec<u8> {
    let mut gray = Vec::with_capacity(rgb.len() / 3);
    for px in rgb.chunks_exact(3) {
        gray.push(luminance(px[0], px[1], px[2]));
    }
    gray
}
