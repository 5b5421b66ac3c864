//! The re-encoding step of the compression pipeline.
//!
//! [`encode`] performs one full decode -> resize -> serialize pass for a
//! source image at a given quality. It has no side effects beyond the
//! returned bytes: resource registration and release belong to the caller.
//!
//! # Architecture
//!
//! The pipeline is synchronous and single-threaded; in the browser it runs
//! inside a Web Worker via the WASM bindings. Output always uses the
//! source's own format (no format conversion).

mod jpeg;
mod png;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

use thiserror::Error;

use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::policy;
use crate::source::{SourceFormat, SourceImage};

/// Quality floor applied as a last-resort clamp before encoding.
pub const MIN_QUALITY: f32 = 0.1;

/// Errors that can occur during the re-encoding step.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The source could not be decoded into a raster surface.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match expected dimensions.
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// The codec failed internally.
    #[error("Encoding failed: {0}")]
    Codec(String),

    /// The codec produced no output.
    #[error("Encoder produced no output")]
    EmptyOutput,
}

/// One successfully encoded result blob.
#[derive(Debug, Clone)]
pub struct EncodedBlob {
    /// Output format (always the source format).
    pub format: SourceFormat,
    /// Encoded pixel width.
    pub width: u32,
    /// Encoded pixel height.
    pub height: u32,
    /// The serialized image.
    pub bytes: Vec<u8>,
}

impl EncodedBlob {
    /// Byte size of the encoded output.
    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Re-encode a source image at the given quality.
///
/// Decodes the source, computes target dimensions via the size policy,
/// resamples in a single bilinear pass, and serializes to the source's own
/// format. Quality is clamped to `[MIN_QUALITY, 1.0]` before use; callers
/// should already pass a value in range.
///
/// # Errors
///
/// Propagates decode failures and codec failures; fails with
/// [`EncodeError::EmptyOutput`] if the codec yields no bytes.
pub fn encode(source: &SourceImage, quality: f32) -> Result<EncodedBlob, EncodeError> {
    let quality = quality.clamp(MIN_QUALITY, 1.0);

    let decoded = decode_image(source.bytes())?;
    if decoded.is_empty() {
        return Err(EncodeError::InvalidDimensions {
            width: decoded.width,
            height: decoded.height,
        });
    }
    source.record_dimensions(decoded.width, decoded.height);

    let (width, height) =
        policy::target_dimensions(decoded.width, decoded.height, source.byte_size());
    let surface = resample(&decoded, width, height)?;

    let bytes = match source.format() {
        SourceFormat::Jpeg => encode_jpeg(&surface.pixels, width, height, jpeg_quality(quality))?,
        SourceFormat::Png => encode_png(&surface.pixels, width, height)?,
    };
    if bytes.is_empty() {
        return Err(EncodeError::EmptyOutput);
    }

    log::debug!(
        "encoded {}x{} at quality {:.2}: {} bytes",
        width,
        height,
        quality,
        bytes.len()
    );

    Ok(EncodedBlob {
        format: source.format(),
        width,
        height,
        bytes,
    })
}

/// Render the decoded surface into exactly the target dimensions.
///
/// Single-pass bilinear resample; returns a clone when the dimensions
/// already match.
fn resample(image: &DecodedImage, width: u32, height: u32) -> Result<DecodedImage, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| EncodeError::Codec("Failed to create RgbImage".to_string()))?;

    let resized =
        image::imageops::resize(&rgb_image, width, height, image::imageops::FilterType::Triangle);

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Map the normalized quality scale onto the JPEG codec's 1-100 scale.
fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceImage;

    fn gradient_pixels(width: u32, height: u32) -> Vec<u8> {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8);
                pixels.push(((y * 255) / height.max(1)) as u8);
                pixels.push(128);
            }
        }
        pixels
    }

    /// Deterministic noise makes the PNG incompressible, pushing the file
    /// size over the resize threshold without a fixture on disk.
    fn noise_pixels(width: u32, height: u32) -> Vec<u8> {
        let mut state = 0x2545F491u32;
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..(width * height * 3) {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            pixels.push((state >> 24) as u8);
        }
        pixels
    }

    fn png_source(name: &str, width: u32, height: u32, pixels: &[u8]) -> SourceImage {
        let bytes = encode_png(pixels, width, height).unwrap();
        SourceImage::from_upload(name, "image/png", bytes).unwrap()
    }

    fn jpeg_source(name: &str, width: u32, height: u32, pixels: &[u8]) -> SourceImage {
        let bytes = encode_jpeg(pixels, width, height, 90).unwrap();
        SourceImage::from_upload(name, "image/jpeg", bytes).unwrap()
    }

    #[test]
    fn test_small_source_keeps_dimensions() {
        let source = jpeg_source("small.jpg", 400, 300, &gradient_pixels(400, 300));

        let blob = encode(&source, 0.5).unwrap();
        assert_eq!((blob.width, blob.height), (400, 300));

        let decoded = decode_image(&blob.bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (400, 300));
    }

    #[test]
    fn test_oversized_source_resized_to_policy_target() {
        let source = png_source("noise.png", 1600, 800, &noise_pixels(1600, 800));
        assert!(source.byte_size() > crate::policy::RESIZE_BYTE_THRESHOLD);

        let blob = encode(&source, 1.0).unwrap();
        assert_eq!((blob.width, blob.height), (1200, 600));

        // Round trip: decoding the output yields the policy's target
        let decoded = decode_image(&blob.bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (1200, 600));
    }

    #[test]
    fn test_output_keeps_source_format() {
        let png = png_source("a.png", 32, 32, &gradient_pixels(32, 32));
        let blob = encode(&png, 0.8).unwrap();
        assert_eq!(blob.format, SourceFormat::Png);
        assert_eq!(&blob.bytes[0..4], &[0x89, 0x50, 0x4E, 0x47]);

        let jpeg = jpeg_source("a.jpg", 32, 32, &gradient_pixels(32, 32));
        let blob = encode(&jpeg, 0.8).unwrap();
        assert_eq!(blob.format, SourceFormat::Jpeg);
        assert_eq!(&blob.bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_quality_clamped_to_valid_range() {
        let source = jpeg_source("a.jpg", 16, 16, &gradient_pixels(16, 16));

        assert!(encode(&source, 5.0).is_ok());
        assert!(encode(&source, 0.01).is_ok());
    }

    #[test]
    fn test_dimensions_recorded_on_source() {
        let source = jpeg_source("a.jpg", 40, 20, &gradient_pixels(40, 20));
        assert_eq!(source.dimensions(), None);

        encode(&source, 0.9).unwrap();
        assert_eq!(source.dimensions(), Some((40, 20)));
    }

    #[test]
    fn test_decode_failure_propagates() {
        // Valid PNG magic followed by garbage passes upload sniffing but
        // fails the actual decode
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0u8; 64]);
        let source = SourceImage::from_upload("bad.png", "image/png", bytes).unwrap();

        let result = encode(&source, 0.9);
        assert!(matches!(result, Err(EncodeError::Decode(_))));
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(0.1), 10);
        assert_eq!(jpeg_quality(0.736), 74);
        assert_eq!(jpeg_quality(1.0), 100);
    }

    #[test]
    fn test_resample_same_dimensions_is_identity() {
        let img = DecodedImage::new(10, 10, vec![77u8; 10 * 10 * 3]);
        let out = resample(&img, 10, 10).unwrap();
        assert_eq!(out.pixels, img.pixels);
    }

    #[test]
    fn test_resample_zero_dimension_errors() {
        let img = DecodedImage::new(10, 10, vec![77u8; 10 * 10 * 3]);
        assert!(resample(&img, 0, 10).is_err());
    }
}
