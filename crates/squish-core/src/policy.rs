//! Target dimension policy for re-encoding.
//!
//! Large uploads are downscaled before encoding to bound both encode cost
//! and output size. Small files keep their pixel dimensions regardless of
//! how the encode itself goes.

/// Source files at or below this byte size are never resized.
pub const RESIZE_BYTE_THRESHOLD: u64 = 1024 * 1024;

/// Maximum length of the longer edge after resizing.
pub const MAX_EDGE: u32 = 1200;

/// Compute the target pixel dimensions for a source surface.
///
/// # Arguments
///
/// * `width` - Decoded source width in pixels
/// * `height` - Decoded source height in pixels
/// * `byte_size` - Byte size of the source file
///
/// # Behavior
///
/// * Files at or below [`RESIZE_BYTE_THRESHOLD`] keep their dimensions.
/// * Larger files are scaled so the longer edge does not exceed
///   [`MAX_EDGE`], preserving aspect ratio; the dependent dimension is
///   rounded to the nearest integer.
/// * No upscaling: if both edges already fit, dimensions are unchanged
///   regardless of byte size.
pub fn target_dimensions(width: u32, height: u32, byte_size: u64) -> (u32, u32) {
    if byte_size <= RESIZE_BYTE_THRESHOLD {
        return (width, height);
    }

    if width <= MAX_EDGE && height <= MAX_EDGE {
        return (width, height);
    }

    let ratio = width as f64 / height as f64;

    if width > height {
        let new_height = (MAX_EDGE as f64 / ratio).round() as u32;
        (MAX_EDGE, new_height.max(1))
    } else {
        let new_width = (MAX_EDGE as f64 * ratio).round() as u32;
        (new_width.max(1), MAX_EDGE)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
