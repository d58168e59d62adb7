//! Source image decoding.
//!
//! Animated GIFs yield one [`SourceFrame`] per animation frame, already
//! composited onto the full canvas by the `image` crate. Every other
//! format yields a single frame.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat, ImageResult, RgbaImage};

use super::error::FrameError;

/// One decoded frame as packed RGB (3 bytes per pixel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFrame {
    pub rgb: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub delay: Duration,
}

/// All frames of a decoded source image in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceImage {
    pub frames: Vec<SourceFrame>,
}

impl SourceImage {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Decode an image file.
///
/// # Errors
/// [`FrameError::ImageDecode`] when the file cannot be read or decoded.
pub fn decode(path: &Path) -> Result<SourceImage, FrameError> {
    let bytes = std::fs::read(path).map_err(|e| FrameError::ImageDecode {
        path: path.to_path_buf(),
        source: image::ImageError::IoError(e),
    })?;
    decode_bytes(&bytes).map_err(|source| FrameError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode an in-memory image, sniffing the format from its contents.
pub fn decode_bytes(bytes: &[u8]) -> ImageResult<SourceImage> {
    let format = image::guess_format(bytes)?;

    let frames = if format == ImageFormat::Gif {
        let decoder = GifDecoder::new(Cursor::new(bytes))?;
        decoder
            .into_frames()
            .collect_frames()?
            .into_iter()
            .map(|frame| {
                let delay = Duration::from(frame.delay());
                flatten_rgba(frame.into_buffer(), delay)
            })
            .collect()
    } else {
        let img = image::load_from_memory_with_format(bytes, format)?;
        vec![flatten_rgba(img.to_rgba8(), Duration::ZERO)]
    };

    log::debug!("Decoded {:?} source with {} frame(s)", format, frames.len());
    Ok(SourceImage { frames })
}

/// Drop alpha by compositing over black.
fn flatten_rgba(rgba: RgbaImage, delay: Duration) -> SourceFrame {
    let (width, height) = rgba.dimensions();
    let mut rgb = Vec::with_capacity((width as usize) * (height as usize) * 3);

    for px in rgba.as_raw().chunks_exact(4) {
        let a = px[3] as u16;
        for &c in &px[..3] {
            rgb.push(((c as u16 * a + 127) / 255) as u8);
        }
    }

    SourceFrame {
        rgb,
        width,
        height,
        delay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, DynamicImage, Frame, Rgba};

    fn png_bytes(img: RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_decode_png_single_frame() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let source = decode_bytes(&png_bytes(img)).unwrap();
        assert_eq!(source.len(), 1);
        let frame = &source.frames[0];
        assert_eq!((frame.width, frame.height), (3, 2));
        assert_eq!(frame.rgb.len(), 18);
        assert_eq!(&frame.rgb[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_transparent_pixels_become_black() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 0]));
        let source = decode_bytes(&png_bytes(img)).unwrap();
        assert_eq!(source.frames[0].rgb, vec![0, 0, 0]);
    }

    #[test]
    fn test_decode_gif_keeps_order_and_delays() {
        let mut buf = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut buf);
            let frames = [0u8, 128, 255].map(|v| {
                Frame::from_parts(
                    RgbaImage::from_pixel(4, 4, Rgba([v, v, v, 255])),
                    0,
                    0,
                    Delay::from_numer_denom_ms(100, 1),
                )
            });
            encoder.encode_frames(frames).unwrap();
        }

        let source = decode_bytes(&buf).unwrap();
        assert_eq!(source.len(), 3);
        assert!(source.frames[0].rgb[0] < source.frames[1].rgb[0]);
        assert!(source.frames[1].rgb[0] < source.frames[2].rgb[0]);
        assert_eq!(source.frames[0].delay, Duration::from_millis(100));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn test_decode_missing_file_is_image_decode_error() {
        let err = decode(Path::new("/definitely/not/here.gif")).unwrap_err();
        assert!(matches!(err, FrameError::ImageDecode { .. }));
    }
}
