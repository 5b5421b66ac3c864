//! Ownership ledger for downloadable result blobs.
//!
//! The ledger is the single owner of every encoded output ever produced in
//! a session. Other components refer to a result through an opaque
//! [`BlobHandle`] and borrow the payload bytes; they never take ownership.
//! Releasing a handle drops its payload exactly once, and a released id is
//! never reused, so a stale handle can only ever dereference to `None`.

use std::collections::HashMap;

use log::warn;
use serde::Serialize;

/// Opaque reference to encoded output bytes held by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlobHandle(u64);

impl BlobHandle {
    /// Numeric id, stable for the lifetime of the session.
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A handle's slot. Released slots keep a tombstone so an old id can never
/// be confused with a fresh registration.
#[derive(Debug)]
enum Slot {
    Live(Vec<u8>),
    Released,
}

/// Tracks every result blob created during a session.
#[derive(Debug, Default)]
pub struct BlobLedger {
    next_id: u64,
    slots: HashMap<u64, Slot>,
}

impl BlobLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new live blob and mint its handle.
    ///
    /// Handle ids increase monotonically and are never reused, so
    /// registering "the same" released handle again is unrepresentable.
    pub fn register(&mut self, bytes: Vec<u8>) -> BlobHandle {
        let handle = BlobHandle(self.next_id);
        self.next_id += 1;
        self.insert(handle, bytes);
        handle
    }

    fn insert(&mut self, handle: BlobHandle, bytes: Vec<u8>) {
        if self.slots.contains_key(&handle.0) {
            // Invariant violation: fail fast in debug, warn-and-skip in release
            debug_assert!(false, "blob handle {} registered twice", handle.0);
            warn!("ignoring duplicate registration of blob handle {}", handle.0);
            return;
        }
        self.slots.insert(handle.0, Slot::Live(bytes));
    }

    /// Borrow the payload of a live handle.
    ///
    /// Returns `None` for released or unknown handles.
    pub fn payload(&self, handle: BlobHandle) -> Option<&[u8]> {
        match self.slots.get(&handle.0) {
            Some(Slot::Live(bytes)) => Some(bytes),
            _ => None,
        }
    }

    /// Whether the handle is currently live.
    pub fn is_live(&self, handle: BlobHandle) -> bool {
        matches!(self.slots.get(&handle.0), Some(Slot::Live(_)))
    }

    /// Number of live blobs.
    pub fn live_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Live(_)))
            .count()
    }

    /// Release a handle, dropping its payload.
    ///
    /// Idempotent: releasing an already-released or unknown handle is a
    /// no-op. Returns `true` only when a payload was actually dropped.
    pub fn release(&mut self, handle: BlobHandle) -> bool {
        match self.slots.get_mut(&handle.0) {
            Some(slot @ Slot::Live(_)) => {
                *slot = Slot::Released;
                true
            }
            _ => false,
        }
    }

    /// Release every live handle; used at session teardown.
    pub fn release_all(&mut self) {
        for slot in self.slots.values_mut() {
            if matches!(slot, Slot::Live(_)) {
                *slot = Slot::Released;
            }
        }
    }
}
