//! User-facing compression status reports.
//!
//! The engine reports progress through [`CompressionStatus`]; the UI layer
//! renders [`CompressionStatus::message`] directly or formats its fields
//! itself. Byte sizes use binary units (base 1024) with up to two decimal
//! places, trailing zeros trimmed.

use serde::Serialize;

/// Status reported to the UI after each engine step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CompressionStatus {
    /// A run is scheduled and waiting out the debounce window.
    Waiting,
    /// A run is executing. Reported by the driver between starting a
    /// request and completing it.
    Processing,
    /// A quality change arrived with no image uploaded.
    NoFile,
    /// The requested quality matches the current result; nothing re-ran.
    Unchanged,
    /// The retry chain bottomed out and the output is still not smaller
    /// than the source.
    BestQuality { size: u64 },
    /// A result is installed.
    Compressed {
        original_size: u64,
        compressed_size: u64,
        quality: f32,
    },
    /// The run failed.
    Error { message: String },
}

impl CompressionStatus {
    /// Human-readable text for this status.
    pub fn message(&self) -> String {
        match self {
            CompressionStatus::Waiting => "Waiting to compress...".to_string(),
            CompressionStatus::Processing => "Compressing...".to_string(),
            CompressionStatus::NoFile => "Upload an image first".to_string(),
            CompressionStatus::Unchanged => {
                "Quality unchanged, keeping the current result".to_string()
            }
            CompressionStatus::BestQuality { size } => format!(
                "Already at best quality ({}), further compression would grow the file",
                format_file_size(*size)
            ),
            CompressionStatus::Compressed {
                original_size,
                compressed_size,
                quality,
            } => {
                let percent = saved_percent(*original_size, *compressed_size);
                let quality_percent = (quality * 100.0).round() as i64;
                let description = quality_description(quality_percent);

                if percent < 0 {
                    format!(
                        "Current setting: {} (quality: {}%, original: {}, compressed: {}, size increased by {}%)",
                        description,
                        quality_percent,
                        format_file_size(*original_size),
                        format_file_size(*compressed_size),
                        -percent
                    )
                } else {
                    format!(
                        "Current setting: {} (quality: {}%, original: {}, compressed: {}, saved: {}%)",
                        description,
                        quality_percent,
                        format_file_size(*original_size),
                        format_file_size(*compressed_size),
                        percent
                    )
                }
            }
            CompressionStatus::Error { message } => {
                if message.is_empty() {
                    "Compression failed, please retry".to_string()
                } else {
                    message.clone()
                }
            }
        }
    }
}

/// Format a byte count using binary units, two decimals, trailing zeros
/// trimmed.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);

    let mut rendered = format!("{:.2}", value);
    if rendered.contains('.') {
        while rendered.ends_with('0') {
            rendered.pop();
        }
        if rendered.ends_with('.') {
            rendered.pop();
        }
    }

    format!("{} {}", rendered, UNITS[exponent])
}

/// Percentage saved by compression, rounded to the nearest integer.
/// Negative when the output grew.
pub fn saved_percent(original_size: u64, compressed_size: u64) -> i64 {
    if original_size == 0 {
        return 0;
    }
    let difference = original_size as f64 - compressed_size as f64;
    (difference * 100.0 / original_size as f64).round() as i64
}

/// Describe a quality percentage the way the slider labels it.
fn quality_description(quality_percent: i64) -> &'static str {
    if quality_percent >= 90 {
        "best quality, larger file"
    } else if quality_percent >= 70 {
        "high quality, moderate size"
    } else if quality_percent >= 40 {
        "balanced quality and size"
    } else {
        "high compression, lower quality"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size_zero() {
        assert_eq!(format_file_size(0), "0 Bytes");
    }

    #[test]
    fn test_format_file_size_bytes() {
        assert_eq!(format_file_size(1), "1 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
    }

    #[test]
    fn test_format_file_size_trims_trailing_zeros() {
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024), "1 KB");
    }

    #[test]
    fn test_format_file_size_larger_units() {
        assert_eq!(format_file_size(1024 * 1024), "1 MB");
        assert_eq!(format_file_size(1024 * 1024 + 512 * 1024), "1.5 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 / 2), "2.5 GB");
    }

    #[test]
    fn test_format_file_size_two_decimals() {
        // 1234567 / 1024^2 = 1.17738... -> 1.18
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
    }

    #[test]
    fn test_saved_percent() {
        assert_eq!(saved_percent(1000, 250), 75);
        assert_eq!(saved_percent(1000, 1500), -50);
        assert_eq!(saved_percent(3, 2), 33);
        assert_eq!(saved_percent(0, 100), 0);
    }

    #[test]
    fn test_compressed_message_reports_savings() {
        let status = CompressionStatus::Compressed {
            original_size: 1000,
            compressed_size: 250,
            quality: 0.8,
        };

        let message = status.message();
        assert!(message.contains("saved: 75%"));
        assert!(message.contains("quality: 80%"));
        assert!(message.contains("high quality, moderate size"));
    }

    #[test]
    fn test_compressed_message_reports_growth() {
        let status = CompressionStatus::Compressed {
            original_size: 1000,
            compressed_size: 1500,
            quality: 0.45,
        };

        let message = status.message();
        assert!(message.contains("size increased by 50%"));
        assert!(message.contains("balanced quality and size"));
    }

    #[test]
    fn test_best_quality_message_includes_size() {
        let status = CompressionStatus::BestQuality { size: 1536 };
        assert!(status.message().contains("1.5 KB"));
    }

    #[test]
    fn test_quality_description_bands() {
        assert_eq!(quality_description(95), "best quality, larger file");
        assert_eq!(quality_description(90), "best quality, larger file");
        assert_eq!(quality_description(70), "high quality, moderate size");
        assert_eq!(quality_description(40), "balanced quality and size");
        assert_eq!(quality_description(39), "high compression, lower quality");
    }

    #[test]
    fn test_error_message_fallback() {
        let status = CompressionStatus::Error {
            message: String::new(),
        };
        assert_eq!(status.message(), "Compression failed, please retry");

        let status = CompressionStatus::Error {
            message: "Encoder produced no output".to_string(),
        };
        assert_eq!(status.message(), "Encoder produced no output");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
