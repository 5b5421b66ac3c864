//! PNG serialization.
//!
//! PNG is lossless, so the engine's quality parameter does not alter pixel
//! data; re-encoding always uses the codec's strongest compression and size
//! reduction comes from the resize step alone.

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::EncodeError;

/// Encode RGB pixel data to PNG bytes.
///
/// # Errors
///
/// Returns an error when the dimensions are zero, the pixel buffer length
/// does not match `width * height * 3`, or the codec fails.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    let encoder = PngEncoder::new_with_quality(
        &mut buffer,
        CompressionType::Best,
        FilterType::Adaptive,
    );

    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::Codec(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_image;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_encode_png_basic() {
        let pixels = vec![128u8; 20 * 10 * 3];

        let png_bytes = encode_png(&pixels, 20, 10).unwrap();
        assert_eq!(&png_bytes[0..8], PNG_MAGIC);
    }

    #[test]
    fn test_encode_png_zero_dimensions() {
        let result = encode_png(&[], 0, 10);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_encode_png_invalid_pixel_data() {
        let pixels = vec![128u8; 10 * 10 * 3 - 1];

        let result = encode_png(&pixels, 10, 10);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_png_lossless_round_trip() {
        // A gradient survives encode -> decode byte-for-byte
        let width = 16u32;
        let height = 8u32;
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width) as u8);
                pixels.push(((y * 255) / height) as u8);
                pixels.push(128);
            }
        }

        let png_bytes = encode_png(&pixels, width, height).unwrap();
        let decoded = decode_image(&png_bytes).unwrap();

        assert_eq!(decoded.width, width);
        assert_eq!(decoded.height, height);
        assert_eq!(decoded.pixels, pixels);
    }
}
