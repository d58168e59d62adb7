//! Downsampling a cropped pixel region onto a character grid.

use super::dimensions::CropRect;
use crate::color::Rgb;

/// Pixel bounds `[x0, x1) × [y0, y1)` covered by one character cell.
///
/// Cells map onto the crop with float strides. When a stride is below one
/// pixel (the source is smaller than the grid) the cell collapses onto the
/// single pixel under its center, so upsampling uses the same rule.
fn cell_bounds(crop: CropRect, char_width: u16, char_height: u16, cx: u16, cy: u16) -> (u32, u32, u32, u32) {
    let cell_w = crop.width as f32 / char_width as f32;
    let cell_h = crop.height as f32 / char_height as f32;

    let axis = |origin: u32, extent: u32, stride: f32, i: u16| -> (u32, u32) {
        let start = (i as f32 * stride) as u32;
        let end = (((i + 1) as f32 * stride) as u32).min(extent);
        if end > start {
            (origin + start, origin + end)
        } else {
            let center = (((i as f32 + 0.5) * stride) as u32).min(extent.saturating_sub(1));
            (origin + center, origin + center + 1)
        }
    };

    let (x0, x1) = axis(crop.x, crop.width, cell_w, cx);
    let (y0, y1) = axis(crop.y, crop.height, cell_h, cy);
    (x0, x1, y0, y1)
}

/// Downsample a grayscale image to a character grid.
///
/// Averages the brightness of all pixels inside each cell's region of the
/// crop.
///
/// # Arguments
/// * `gray` - Grayscale pixel data (one byte per pixel, row-major order)
/// * `img_width` - Width of the source image in pixels
/// * `crop` - Region of the source image to sample
/// * `char_width` - Desired output width in characters
/// * `char_height` - Desired output height in characters
///
/// # Returns
/// Brightness values (0-255), one per cell, row-major; empty when any
/// dimension is zero.
pub fn downsample(gray: &[u8], img_width: u32, crop: CropRect, char_width: u16, char_height: u16) -> Vec<u8> {
    if char_width == 0 || char_height == 0 || crop.width == 0 || crop.height == 0 || gray.is_empty() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity((char_width as usize) * (char_height as usize));

    for cy in 0..char_height {
        for cx in 0..char_width {
            let (x0, x1, y0, y1) = cell_bounds(crop, char_width, char_height, cx, cy);

            let mut sum = 0u32;
            let mut count = 0u32;
            for py in y0..y1 {
                for px in x0..x1 {
                    let idx = (py as usize) * (img_width as usize) + px as usize;
                    if let Some(&v) = gray.get(idx) {
                        sum += v as u32;
                        count += 1;
                    }
                }
            }

            result.push(if count > 0 { (sum / count) as u8 } else { 0 });
        }
    }

    result
}

/// Downsample a packed RGB image to average colors per character cell.
///
/// Uses the same cell regions as [`downsample`].
pub fn downsample_colors(rgb: &[u8], img_width: u32, crop: CropRect, char_width: u16, char_height: u16) -> Vec<Rgb> {
    if char_width == 0 || char_height == 0 || crop.width == 0 || crop.height == 0 || rgb.is_empty() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity((char_width as usize) * (char_height as usize));

    for cy in 0..char_height {
        for cx in 0..char_width {
            let (x0, x1, y0, y1) = cell_bounds(crop, char_width, char_height, cx, cy);

            let (mut sum_r, mut sum_g, mut sum_b) = (0u32, 0u32, 0u32);
            let mut count = 0u32;
            for py in y0..y1 {
                for px in x0..x1 {
                    let idx = ((py as usize) * (img_width as usize) + px as usize) * 3;
                    if let Some(p) = rgb.get(idx..idx + 3) {
                        sum_r += p[0] as u32;
                        sum_g += p[1] as u32;
                        sum_b += p[2] as u32;
                        count += 1;
                    }
                }
            }

            result.push(if count > 0 {
                Rgb::new((sum_r / count) as u8, (sum_g / count) as u8, (sum_b / count) as u8)
            } else {
                Rgb::default()
            });
        }
    }

    result
}
