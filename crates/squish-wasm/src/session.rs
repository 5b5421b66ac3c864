//! Session bindings.
//!
//! [`JsSession`] wraps the core [`Session`] for JavaScript. The page feeds
//! it the file-picker/drop result and slider events, then drives it with
//! `poll(Date.now())` from a `requestAnimationFrame` or interval callback;
//! a non-null return is a status report to render.
//!
//! # Memory Management
//!
//! Result bytes live in WASM memory inside the session's ledger.
//! `output_bytes()` copies the current result out for Blob creation; the
//! copy is owned by JavaScript and unaffected by later releases. Call
//! `teardown()` from `beforeunload` to release everything deterministically.

use serde::Serialize;
use squish_core::{CompressionStatus, Session, SourceImage};
use wasm_bindgen::prelude::*;

/// Status report handed to JavaScript: the status fields plus the
/// pre-rendered human-readable message.
#[derive(Serialize)]
struct StatusReport<'a> {
    #[serde(flatten)]
    status: &'a CompressionStatus,
    message: String,
}

fn status_to_js(status: &CompressionStatus) -> JsValue {
    let report = StatusReport {
        status,
        message: status.message(),
    };
    serde_wasm_bindgen::to_value(&report)
        .unwrap_or_else(|_| JsValue::from_str(&status.message()))
}

/// A compression session owned by the page.
#[wasm_bindgen]
pub struct JsSession {
    inner: Session,
}

#[wasm_bindgen]
impl JsSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsSession {
        JsSession {
            inner: Session::new(),
        }
    }

    /// Accept an upload from the file picker or drop surface.
    ///
    /// Validates the MIME type (JPEG/PNG only) and the 10 MiB size limit,
    /// installs the image, and schedules an immediate first run at the
    /// slider's current position.
    ///
    /// # Errors
    ///
    /// Returns an error string when validation rejects the file; the
    /// session state is unchanged in that case.
    pub fn upload(
        &mut self,
        name: &str,
        mime: &str,
        bytes: Vec<u8>,
        slider_percent: f64,
        now_ms: f64,
    ) -> Result<JsValue, JsValue> {
        let source = SourceImage::from_upload(name, mime, bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let status = self.inner.upload(source, slider_percent, now_ms);
        Ok(status_to_js(&status))
    }

    /// Handle a slider input event with a value in [0, 100].
    ///
    /// Rapid events are coalesced; the compression runs once the slider
    /// has been quiet for the debounce window.
    pub fn quality_input(&mut self, percent: f64, now_ms: f64) -> JsValue {
        let status = self.inner.request_quality(percent, now_ms);
        status_to_js(&status)
    }

    /// Drive the session clock; runs a due compression synchronously.
    ///
    /// Returns a status report when a run fired, or `null` while idle.
    pub fn poll(&mut self, now_ms: f64) -> JsValue {
        match self.inner.poll(now_ms) {
            Some(status) => status_to_js(&status),
            None => JsValue::NULL,
        }
    }

    /// Convenience variant of [`JsSession::poll`] using the browser clock.
    pub fn poll_now(&mut self) -> JsValue {
        self.poll(js_sys::Date::now())
    }

    /// Status report for the currently installed state.
    pub fn current_status(&self) -> JsValue {
        status_to_js(&self.inner.current_status())
    }

    /// Copy of the current result bytes for preview/Blob creation.
    pub fn output_bytes(&self) -> Option<Vec<u8>> {
        self.inner.output_payload().map(|bytes| bytes.to_vec())
    }

    /// MIME type of the current result (always the source's own type).
    pub fn output_mime(&self) -> Option<String> {
        self.inner
            .source()
            .map(|source| source.format().mime_type().to_string())
    }

    /// Ledger id of the current result handle.
    pub fn output_handle(&self) -> Option<f64> {
        self.inner
            .current_outcome()
            .map(|outcome| outcome.handle.id() as f64)
    }

    /// Suggested file name for the download action
    /// (`compressed_<originalName>`).
    pub fn download_name(&self) -> Option<String> {
        self.inner.download_file_name()
    }

    /// Whether an image is currently uploaded.
    pub fn has_source(&self) -> bool {
        self.inner.source().is_some()
    }

    /// Session end: release every result handle and drop the source.
    /// Wire this to `beforeunload`.
    pub fn teardown(&mut self) {
        self.inner.teardown();
    }
}

impl Default for JsSession {
    fn default() -> Self {
        Self::new()
    }
}


/// WASM-specific tests that require JsValue.
///
/// These use functions that return `Result<T, JsValue>` and can only run
/// on wasm32 targets. Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_upload_rejects_unsupported_type() {
        let mut session = JsSession::new();
        let result = session.upload("anim.gif", "image/gif", vec![0u8; 8], 80.0, 0.0);
        assert!(result.is_err());
        assert!(!session.has_source());
    }

    #[wasm_bindgen_test]
    fn test_quality_input_without_file() {
        let mut session = JsSession::new();
        let status = session.quality_input(50.0, 0.0);
        assert!(!status.is_null());
    }

    #[wasm_bindgen_test]
    fn test_poll_idle_returns_null() {
        let mut session = JsSession::new();
        assert!(session.poll(1000.0).is_null());
    }
}
