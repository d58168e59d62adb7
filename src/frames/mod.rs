//! Frame generation, encoding, and persistence.
//!
//! - [`generator`] turns decoded images into fixed-size [`FrameSequence`]s
//! - [`codec`] is the text form of one frame
//! - [`store`] persists a sequence as a directory of frame files

pub mod codec;
pub mod decode;
mod error;
mod frame;
pub mod generator;
mod manifest;
pub mod store;

pub use codec::{decode_frame, encode_frame, encode_row, CodecError};
pub use decode::{decode, decode_bytes, SourceFrame, SourceImage};
pub use error::FrameError;
pub use frame::{Cell, Frame, FrameSequence};
pub use generator::{
    generate, generate_into_store, FrameGenerator, GenerateOutcome, GeneratorOptions, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
pub use manifest::{Manifest, MANIFEST_FILE};
pub use store::FrameStore;
