//! Squish WASM - WebAssembly bindings for the Squish compression engine
//!
//! This crate exposes the squish-core session to JavaScript/TypeScript.
//! The page owns one [`JsSession`], feeds it upload and slider events, and
//! drives it from the event loop with `poll(Date.now())`.
//!
//! # Module Structure
//!
//! - `session` - The session binding (upload, quality input, polling)
//! - `format` - Byte-size and percentage formatting helpers for the UI
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsSession } from '@squish/wasm';
//!
//! await init();
//!
//! const session = new JsSession();
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! session.upload(file.name, file.type, bytes, slider.value, Date.now());
//! ```

use wasm_bindgen::prelude::*;

mod format;
mod logger;
mod session;

// Re-export public bindings
pub use format::{format_file_size, saved_percent};
pub use session::JsSession;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Route the core crate's `log` records to the browser console
    logger::install();
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
