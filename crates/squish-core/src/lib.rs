//! Squish Core - Adaptive image compression engine
//!
//! This crate implements the compression engine behind Squish: decoding an
//! uploaded JPEG or PNG, resizing oversized images, re-encoding at a
//! user-chosen quality, retrying at lower quality when the output grows,
//! and owning the lifetime of every downloadable result blob.
//!
//! # Architecture
//!
//! All state lives in a [`Session`]. A quality-change event enters the
//! session's debounce gate; once the input quiesces, the retry controller
//! runs the encoder (possibly several times at decreasing quality),
//! registers the winning bytes with the blob ledger, and reports a
//! [`CompressionStatus`]. Everything is synchronous and single-threaded;
//! in the browser the WASM bindings drive the session from the page's
//! event loop.

pub mod debounce;
pub mod decode;
pub mod encode;
pub mod ledger;
pub mod policy;
pub mod retry;
pub mod session;
pub mod source;
pub mod status;

pub use debounce::DebounceGate;
pub use decode::{decode_image, DecodeError, DecodedImage};
pub use encode::{encode, EncodeError, EncodedBlob, MIN_QUALITY};
pub use ledger::{BlobHandle, BlobLedger};
pub use retry::{compress, CompressionOutcome, RETRY_BACKOFF, RETRY_QUALITY_KNEE};
pub use session::{quality_from_percent, CompressionTicket, Session, DEBOUNCE_DELAY_MS};
pub use source::{SourceFormat, SourceImage, ValidationError, MAX_UPLOAD_BYTES};
pub use status::{format_file_size, saved_percent, CompressionStatus};
