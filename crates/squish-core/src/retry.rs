//! Shrink-on-growth retry policy around the encoder.
//!
//! Re-encoding already-efficient data at high quality can inflate the file:
//! format overhead dominates and the "compressed" output comes out larger
//! than the source. When that happens the controller walks the quality down
//! geometrically (x0.8 per attempt) until the output fits or the quality
//! knee is reached, then returns whatever the final attempt produced.

use log::debug;

use crate::encode::{self, EncodeError, EncodedBlob};
use crate::ledger::{BlobHandle, BlobLedger};
use crate::source::SourceImage;

/// Below this quality the growth retry stops; the final attempt stands.
pub const RETRY_QUALITY_KNEE: f32 = 0.5;

/// Geometric backoff factor applied to quality on each growth retry.
pub const RETRY_BACKOFF: f32 = 0.8;

/// The result bundle of one successful compression run.
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    /// Quality actually used by the final attempt.
    pub quality: f32,
    /// Output byte size.
    pub byte_size: u64,
    /// Handle to the output bytes, owned by the session's ledger.
    pub handle: BlobHandle,
    /// Encoded pixel width.
    pub width: u32,
    /// Encoded pixel height.
    pub height: u32,
    /// Number of encode attempts the run took.
    pub attempts: u32,
}

/// The final attempt of a retry chain, before ledger registration.
struct FinalAttempt {
    quality: f32,
    attempts: u32,
    blob: EncodedBlob,
}

/// Compress a source image, retrying at lower quality on growth.
///
/// Runs the encoder at `quality`, walking the quality down while the output
/// is larger than the source and the quality is still above
/// [`RETRY_QUALITY_KNEE`]. Encode errors propagate immediately without
/// retry. The final attempt's bytes are registered with `ledger` and the
/// returned outcome carries the minted handle.
pub fn compress(
    source: &SourceImage,
    quality: f32,
    ledger: &mut BlobLedger,
) -> Result<CompressionOutcome, EncodeError> {
    let attempt = run_attempts(source.byte_size(), quality, |q| encode::encode(source, q))?;

    let byte_size = attempt.blob.byte_size();
    let width = attempt.blob.width;
    let height = attempt.blob.height;
    let handle = ledger.register(attempt.blob.bytes);

    Ok(CompressionOutcome {
        quality: attempt.quality,
        byte_size,
        handle,
        width,
        height,
        attempts: attempt.attempts,
    })
}

/// The retry loop itself, driven by an attempt function.
///
/// Factored out so the termination condition and iteration count can be
/// exercised without a real codec.
fn run_attempts<F>(
    source_size: u64,
    initial_quality: f32,
    mut attempt: F,
) -> Result<FinalAttempt, EncodeError>
where
    F: FnMut(f32) -> Result<EncodedBlob, EncodeError>,
{
    let mut quality = initial_quality;
    let mut attempts = 0u32;

    loop {
        let blob = attempt(quality)?;
        attempts += 1;

        if blob.byte_size() > source_size && quality > RETRY_QUALITY_KNEE {
            debug!(
                "output grew ({} > {} bytes), retrying at quality {:.3}",
                blob.byte_size(),
                source_size,
                quality * RETRY_BACKOFF
            );
            quality *= RETRY_BACKOFF;
            continue;
        }

        // Final: either the output fits or the knee was reached. A result
        // larger than the source is still returned.
        return Ok(FinalAttempt {
            quality,
            attempts,
            blob,
        });
    }
}
