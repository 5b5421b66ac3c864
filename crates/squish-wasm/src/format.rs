//! Formatting helpers exposed to the UI layer.

use wasm_bindgen::prelude::*;

/// Format a byte count using binary units (Bytes/KB/MB/GB, base 1024).
///
/// Accepts a JavaScript number; negative or fractional input is floored
/// at zero before formatting.
///
/// # Example
///
/// ```typescript
/// format_file_size(1536); // "1.5 KB"
/// format_file_size(0);    // "0 Bytes"
/// ```
#[wasm_bindgen]
pub fn format_file_size(bytes: f64) -> String {
    squish_core::format_file_size(bytes.max(0.0) as u64)
}

/// Percentage saved by compression, rounded to the nearest integer.
/// Negative when the output grew.
#[wasm_bindgen]
pub fn saved_percent(original_size: f64, compressed_size: f64) -> i32 {
    squish_core::saved_percent(original_size.max(0.0) as u64, compressed_size.max(0.0) as u64)
        as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size_binding() {
        assert_eq!(format_file_size(1536.0), "1.5 KB");
        assert_eq!(format_file_size(0.0), "0 Bytes");
        assert_eq!(format_file_size(-10.0), "0 Bytes");
    }

    #[test]
    fn test_saved_percent_binding() {
        assert_eq!(saved_percent(1000.0, 250.0), 75);
        assert_eq!(saved_percent(1000.0, 1500.0), -50);
    }
}
