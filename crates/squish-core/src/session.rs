//! Per-session engine state.
//!
//! A [`Session`] owns everything the compression engine mutates: the
//! current source image, the current outcome, the blob ledger, and the
//! debounce gate. There are no ambient globals; hosts create one session
//! per page and pass it to every operation.
//!
//! # Request sequencing
//!
//! Each compression request is tagged with a sequence number when it
//! begins. Completing a request whose number is no longer the newest
//! discards the result: its freshly registered handle is released and the
//! installed outcome is untouched. This closes the stale-overwrite race a
//! slow encode could otherwise lose to a newer request.

use log::debug;

use crate::debounce::DebounceGate;
use crate::encode::{EncodeError, MIN_QUALITY};
use crate::ledger::BlobLedger;
use crate::retry::{self, CompressionOutcome, RETRY_QUALITY_KNEE};
use crate::source::SourceImage;
use crate::status::CompressionStatus;

/// Quiescence window for slider input.
pub const DEBOUNCE_DELAY_MS: f64 = 300.0;

/// Scale a slider position in [0, 100] to a quality in [0.1, 1.0].
pub fn quality_from_percent(percent: f64) -> f32 {
    ((percent / 100.0) as f32).clamp(MIN_QUALITY, 1.0)
}

/// A compression run waiting out the debounce window.
#[derive(Debug, Clone, Copy)]
struct PendingRun {
    quality: f32,
}

/// Token for one begun compression request.
///
/// The driver reports [`CompressionStatus::Processing`] while it holds a
/// ticket, then hands it back through [`Session::execute`] or
/// [`Session::complete`].
#[derive(Debug, Clone, Copy)]
pub struct CompressionTicket {
    seq: u64,
    quality: f32,
}

impl CompressionTicket {
    /// The quality this request was begun with.
    pub fn quality(&self) -> f32 {
        self.quality
    }
}

/// All mutable engine state for one user session.
#[derive(Debug, Default)]
pub struct Session {
    source: Option<SourceImage>,
    current: Option<CompressionOutcome>,
    ledger: BlobLedger,
    gate: DebounceGate<PendingRun>,
    next_seq: u64,
    newest_seq: u64,
    last_requested: Option<f32>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current source image, if one is uploaded.
    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// The currently installed outcome.
    pub fn current_outcome(&self) -> Option<&CompressionOutcome> {
        self.current.as_ref()
    }

    /// The session's blob ledger.
    pub fn ledger(&self) -> &BlobLedger {
        &self.ledger
    }

    /// Borrow the current outcome's bytes for preview or download.
    pub fn output_payload(&self) -> Option<&[u8]> {
        let outcome = self.current.as_ref()?;
        self.ledger.payload(outcome.handle)
    }

    /// Suggested download file name for the current result.
    pub fn download_file_name(&self) -> Option<String> {
        self.source.as_ref().map(|s| s.download_file_name())
    }

    /// Install a validated upload, immediately scheduling a first run at
    /// the slider's current position.
    ///
    /// The prior outcome's handle is released and the prior source dropped
    /// before the new one is installed.
    pub fn upload(
        &mut self,
        source: SourceImage,
        slider_percent: f64,
        now_ms: f64,
    ) -> CompressionStatus {
        self.set_source(source);
        let quality = quality_from_percent(slider_percent);
        self.gate.schedule(PendingRun { quality }, 0.0, now_ms);
        CompressionStatus::Waiting
    }

    /// Replace the current source image.
    pub fn set_source(&mut self, source: SourceImage) {
        self.discard_outcome();
        self.gate.cancel();
        self.invalidate_in_flight();
        self.last_requested = None;
        self.source = Some(source);
    }

    /// Handle a slider quality-change event.
    ///
    /// Debounces the run: a new event within the window supersedes the
    /// pending one. Returns [`CompressionStatus::NoFile`] when nothing is
    /// uploaded.
    pub fn request_quality(&mut self, percent: f64, now_ms: f64) -> CompressionStatus {
        if self.source.is_none() {
            return CompressionStatus::NoFile;
        }
        let quality = quality_from_percent(percent);
        self.gate.schedule(PendingRun { quality }, DEBOUNCE_DELAY_MS, now_ms);
        CompressionStatus::Waiting
    }

    /// Drive the debounce gate; runs a due compression synchronously.
    ///
    /// Returns `None` while nothing is due.
    pub fn poll(&mut self, now_ms: f64) -> Option<CompressionStatus> {
        let run = self.gate.poll(now_ms)?;
        Some(self.run(run.quality))
    }

    fn run(&mut self, quality: f32) -> CompressionStatus {
        if self.source.is_none() {
            return CompressionStatus::NoFile;
        }
        if self.current.is_some() && self.last_requested == Some(quality) {
            return CompressionStatus::Unchanged;
        }
        let ticket = self.begin(quality);
        self.execute(ticket)
    }

    /// Begin a compression request, tagging it with a fresh sequence
    /// number. Newer begins make earlier tickets stale.
    pub fn begin(&mut self, quality: f32) -> CompressionTicket {
        self.next_seq += 1;
        self.newest_seq = self.next_seq;
        self.last_requested = Some(quality);
        CompressionTicket {
            seq: self.next_seq,
            quality,
        }
    }

    /// Run the full compress for a ticket and complete it.
    pub fn execute(&mut self, ticket: CompressionTicket) -> CompressionStatus {
        let result = match self.source.as_ref() {
            Some(source) => retry::compress(source, ticket.quality, &mut self.ledger),
            None => return CompressionStatus::NoFile,
        };
        self.complete(ticket, result)
    }

    /// Complete a request, installing its outcome unless it went stale.
    ///
    /// Installing releases the superseded outcome's handle; at most one
    /// live result handle exists at any time. A stale completion releases
    /// its own handle instead and reports the unchanged current state.
    pub fn complete(
        &mut self,
        ticket: CompressionTicket,
        result: Result<CompressionOutcome, EncodeError>,
    ) -> CompressionStatus {
        if ticket.seq != self.newest_seq {
            if let Ok(outcome) = result {
                debug!("discarding stale outcome for request {}", ticket.seq);
                self.ledger.release(outcome.handle);
            }
            return self.current_status();
        }

        let Some(source) = self.source.as_ref() else {
            if let Ok(outcome) = result {
                self.ledger.release(outcome.handle);
            }
            return CompressionStatus::NoFile;
        };

        match result {
            Ok(outcome) => {
                let status = outcome_status(source.byte_size(), &outcome);
                if let Some(previous) = self.current.replace(outcome) {
                    debug!("superseding outcome handle {}", previous.handle.id());
                    self.ledger.release(previous.handle);
                }
                status
            }
            Err(e) => {
                // A failed quality must stay retryable; only an installed
                // outcome makes a repeat request a no-op
                self.last_requested = None;
                CompressionStatus::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Status describing the installed state, without running anything.
    pub fn current_status(&self) -> CompressionStatus {
        match (self.source.as_ref(), self.current.as_ref()) {
            (Some(source), Some(outcome)) => outcome_status(source.byte_size(), outcome),
            (Some(_), None) => CompressionStatus::Waiting,
            (None, _) => CompressionStatus::NoFile,
        }
    }

    /// Session end: release every handle and drop the source reference.
    pub fn teardown(&mut self) {
        self.gate.cancel();
        self.invalidate_in_flight();
        self.ledger.release_all();
        self.current = None;
        self.source = None;
        self.last_requested = None;
    }

    fn discard_outcome(&mut self) {
        if let Some(outcome) = self.current.take() {
            self.ledger.release(outcome.handle);
        }
    }

    /// Make every ticket issued so far stale without minting a new one.
    fn invalidate_in_flight(&mut self) {
        self.next_seq += 1;
        self.newest_seq = self.next_seq;
    }
}

fn outcome_status(original_size: u64, outcome: &CompressionOutcome) -> CompressionStatus {
    // The chain walked below the knee and the file still didn't shrink:
    // there is no better quality to offer
    if outcome.byte_size >= original_size
        && outcome.quality <= RETRY_QUALITY_KNEE
        && outcome.attempts > 1
    {
        CompressionStatus::BestQuality {
            size: outcome.byte_size,
        }
    } else {
        CompressionStatus::Compressed {
            original_size,
            compressed_size: outcome.byte_size,
            quality: outcome.quality,
        }
    }
}
