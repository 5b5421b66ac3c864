//! Image decoding for the compression pipeline.
//!
//! This module decodes the two supported upload formats (JPEG and PNG) into
//! an RGB surface, applying EXIF orientation correction for JPEG sources.
//!
//! # Architecture
//!
//! Decoding is synchronous and single-threaded; the engine runs it as the
//! first suspend/resume step of each compression attempt.

mod raster;
mod types;

pub use raster::decode_image;
pub use types::{DecodeError, DecodedImage, Orientation};
