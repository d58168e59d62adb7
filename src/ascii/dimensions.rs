//! Aspect-correct crop calculation for a fixed character grid.

/// Default terminal character aspect ratio.
/// Terminal characters are typically ~2x taller than wide.
pub const DEFAULT_CHAR_ASPECT_RATIO: f32 = 2.0;

/// Region of the source image that gets sampled into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Calculate the centered crop that fills a `char_width × char_height` grid
/// without distorting the image.
///
/// Terminal characters are `char_aspect` times taller than wide, so a grid
/// of W×H cells covers a physical area of `W : H * char_aspect`. The crop
/// keeps exactly that aspect ratio, trimming the excess from whichever
/// image axis is too long. Each cell therefore samples a region roughly
/// `char_aspect` times taller than it is wide.
///
/// # Arguments
/// * `img_width` - Width of the source image in pixels
/// * `img_height` - Height of the source image in pixels
/// * `char_width` - Grid width in characters
/// * `char_height` - Grid height in characters
/// * `char_aspect` - Character aspect ratio (height/width); non-positive or
///   non-finite values fall back to [`DEFAULT_CHAR_ASPECT_RATIO`]
pub fn crop_to_grid(
    img_width: u32,
    img_height: u32,
    char_width: u16,
    char_height: u16,
    char_aspect: f32,
) -> CropRect {
    let full = CropRect {
        x: 0,
        y: 0,
        width: img_width,
        height: img_height,
    };
    if img_width == 0 || img_height == 0 || char_width == 0 || char_height == 0 {
        return full;
    }

    let char_aspect = if char_aspect.is_finite() && char_aspect > 0.0 {
        char_aspect
    } else {
        DEFAULT_CHAR_ASPECT_RATIO
    };

    let grid_aspect = char_width as f32 / (char_height as f32 * char_aspect);
    let img_aspect = img_width as f32 / img_height as f32;

    if img_aspect > grid_aspect {
        // Image is wider than the grid: trim left and right.
        let width = ((img_height as f32 * grid_aspect).round() as u32).clamp(1, img_width);
        CropRect {
            x: (img_width - width) / 2,
            y: 0,
            width,
            height: img_height,
        }
    } else {
        // Image is taller than the grid: trim top and bottom.
        let height = ((img_width as f32 / grid_aspect).round() as u32).clamp(1, img_height);
        CropRect {
            x: 0,
            y: (img_height - height) / 2,
            width: img_width,
            height,
        }
    }
}
