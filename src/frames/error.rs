//! Frame generation and frame store error types.

use std::path::PathBuf;

/// Errors raised while generating, writing, or reading frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The source image is missing, unreadable, or corrupt
    #[error("failed to decode image '{}': {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The output directory cannot be written
    #[error("output directory '{}' is not writable: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted frame file could not be parsed
    #[error("malformed frame file '{}': {reason}", .path.display())]
    FrameDecode { path: PathBuf, reason: String },

    /// The frame store directory exists but cannot be listed or read
    #[error("failed to read frame store '{}': {source}", .path.display())]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FrameError {
    pub(crate) fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FrameError::OutputWrite {
            path: path.into(),
            source,
        }
    }
}
