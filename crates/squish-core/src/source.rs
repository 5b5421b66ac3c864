//! Uploaded source images and upstream validation.
//!
//! A [`SourceImage`] is the immutable handle to the originally uploaded
//! file. It is created once per upload, replaced wholesale by the next
//! upload, and never mutated; the decoded pixel dimensions become available
//! lazily after the first decode.

use std::cell::Cell;

use serde::Serialize;
use thiserror::Error;

/// Maximum accepted upload size.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Errors rejected at the upload boundary, before any engine state changes.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The declared MIME type is not one of the supported raster formats.
    #[error("Unsupported image type: {0} (only JPEG and PNG are accepted)")]
    UnsupportedType(String),

    /// The file exceeds the upload size limit.
    #[error("Image is too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    /// The byte stream does not match the declared MIME type.
    #[error("File content does not match its declared type {declared}")]
    FormatMismatch { declared: String },
}

/// The two supported raster formats. Output always uses the source format;
/// there is no format conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Jpeg,
    Png,
}

impl SourceFormat {
    /// Parse a MIME type string into a supported format.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(SourceFormat::Jpeg),
            "image/png" => Some(SourceFormat::Png),
            _ => None,
        }
    }

    /// The canonical MIME type for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Png => "image/png",
        }
    }
}

/// Immutable handle to the originally uploaded file.
#[derive(Debug)]
pub struct SourceImage {
    name: String,
    format: SourceFormat,
    bytes: Vec<u8>,
    /// Decoded pixel dimensions, cached after the first decode.
    dimensions: Cell<Option<(u32, u32)>>,
}

impl SourceImage {
    /// Validate and accept an upload.
    ///
    /// Checks the declared MIME type against the supported formats, the
    /// byte size against [`MAX_UPLOAD_BYTES`], and the stream's magic bytes
    /// against the declared type. Rejected uploads cause no state change.
    pub fn from_upload(
        name: impl Into<String>,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        let format = SourceFormat::from_mime(mime)
            .ok_or_else(|| ValidationError::UnsupportedType(mime.to_string()))?;

        let size = bytes.len() as u64;
        if size > MAX_UPLOAD_BYTES {
            return Err(ValidationError::TooLarge {
                size,
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let sniffed = image::guess_format(&bytes).ok();
        let matches = matches!(
            (format, sniffed),
            (SourceFormat::Jpeg, Some(image::ImageFormat::Jpeg))
                | (SourceFormat::Png, Some(image::ImageFormat::Png))
        );
        if !matches {
            return Err(ValidationError::FormatMismatch {
                declared: mime.to_string(),
            });
        }

        Ok(Self {
            name: name.into(),
            format,
            bytes,
            dimensions: Cell::new(None),
        })
    }

    /// Original file name as uploaded.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raster format shared by input and output.
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Raw file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte size of the uploaded file.
    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Decoded pixel dimensions, if a decode has happened yet.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions.get()
    }

    /// Suggested file name for the downloadable result.
    pub fn download_file_name(&self) -> String {
        format!("compressed_{}", self.name)
    }

    pub(crate) fn record_dimensions(&self, width: u32, height: u32) {
        self.dimensions.set(Some((width, height)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    fn tiny_png() -> Vec<u8> {
        let pixels = vec![32u8; 2 * 2 * 3];
        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(&pixels, 2, 2, ExtendedColorType::Rgb8)
            .unwrap();
        buffer
    }

    #[test]
    fn test_accepts_png_upload() {
        let source = SourceImage::from_upload("photo.png", "image/png", tiny_png()).unwrap();
        assert_eq!(source.format(), SourceFormat::Png);
        assert_eq!(source.name(), "photo.png");
        assert!(source.byte_size() > 0);
        assert_eq!(source.dimensions(), None);
    }

    #[test]
    fn test_rejects_unsupported_mime() {
        let result = SourceImage::from_upload("anim.gif", "image/gif", tiny_png());
        assert!(matches!(result, Err(ValidationError::UnsupportedType(_))));
    }

    #[test]
    fn test_rejects_oversized_upload() {
        let mut bytes = tiny_png();
        bytes.resize((MAX_UPLOAD_BYTES + 1) as usize, 0);

        let result = SourceImage::from_upload("big.png", "image/png", bytes);
        assert!(matches!(result, Err(ValidationError::TooLarge { .. })));
    }

    #[test]
    fn test_rejects_mismatched_content() {
        // PNG bytes declared as JPEG
        let result = SourceImage::from_upload("photo.jpg", "image/jpeg", tiny_png());
        assert!(matches!(result, Err(ValidationError::FormatMismatch { .. })));
    }

    #[test]
    fn test_rejects_garbage_content() {
        let result = SourceImage::from_upload("photo.png", "image/png", vec![0u8; 16]);
        assert!(matches!(result, Err(ValidationError::FormatMismatch { .. })));
    }

    #[test]
    fn test_download_file_name() {
        let source = SourceImage::from_upload("cat.png", "image/png", tiny_png()).unwrap();
        assert_eq!(source.download_file_name(), "compressed_cat.png");
    }

    #[test]
    fn test_dimensions_cached_after_record() {
        let source = SourceImage::from_upload("photo.png", "image/png", tiny_png()).unwrap();
        assert_eq!(source.dimensions(), None);

        source.record_dimensions(2, 2);
        assert_eq!(source.dimensions(), Some((2, 2)));
    }

    #[test]
    fn test_format_mime_round_trip() {
        assert_eq!(SourceFormat::from_mime("image/jpeg"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_mime("image/png"), Some(SourceFormat::Png));
        assert_eq!(SourceFormat::from_mime("image/webp"), None);
        assert_eq!(SourceFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(SourceFormat::Png.mime_type(), "image/png");
    }
}
