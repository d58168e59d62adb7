//! Luminance sampling for converting image frames to ASCII grids.
//!
//! The pipeline used by the frame generator:
//!
//! 1. **Grayscale conversion** - RGB to luminance using BT.601
//! 2. **Cropping** - Aspect-correct crop for ~2:1 terminal cells
//! 3. **Downsampling** - Average each cell's pixel region
//! 4. **Glyph mapping** - Map luminance onto the density ramp

mod charset;
mod dimensions;
mod downsample;
mod grayscale;
mod mapping;

pub use charset::{is_ramp_glyph, single_column, DENSEST, RAMP, SPARSEST};
pub use dimensions::{crop_to_grid, CropRect, DEFAULT_CHAR_ASPECT_RATIO};
pub use downsample::{downsample, downsample_colors};
pub use grayscale::{luminance, to_grayscale};
pub use mapping::{map_to_chars, sample, sample_u8};
