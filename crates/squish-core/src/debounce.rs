//! Single-slot debounce gate.
//!
//! Coalesces rapid repeated triggers into one delayed task: scheduling
//! cancels whatever was pending and arms the slot anew, so at most one task
//! is ever pending. The gate owns no timer; callers drive it with a
//! millisecond clock (`Date.now()` in the browser, a plain counter in
//! tests), keeping it independent of any concurrency runtime.

/// A pending task plus its fire deadline.
#[derive(Debug)]
struct Pending<T> {
    task: T,
    fire_at_ms: f64,
}

/// Cancel-then-set scheduler with a single pending slot.
#[derive(Debug)]
pub struct DebounceGate<T> {
    pending: Option<Pending<T>>,
}

impl<T> Default for DebounceGate<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> DebounceGate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire after `delay_ms` of quiescence.
    ///
    /// Any previously scheduled, not-yet-fired task is cancelled.
    pub fn schedule(&mut self, task: T, delay_ms: f64, now_ms: f64) {
        self.pending = Some(Pending {
            task,
            fire_at_ms: now_ms + delay_ms,
        });
    }

    /// Fire the pending task if its deadline has passed.
    ///
    /// Returns `None` while the slot is empty or still waiting.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now_ms >= pending.fire_at_ms);
        if due {
            self.pending.take().map(|p| p.task)
        } else {
            None
        }
    }

    /// Drop the pending task without firing it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Whether a task is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiescence() {
        let mut gate = DebounceGate::new();
        gate.schedule("run", 300.0, 1000.0);

        assert_eq!(gate.poll(1100.0), None);
        assert_eq!(gate.poll(1299.0), None);
        assert_eq!(gate.poll(1300.0), Some("run"));
        assert!(!gate.is_pending());
    }

    #[test]
    fn test_fires_only_once() {
        let mut gate = DebounceGate::new();
        gate.schedule(1, 100.0, 0.0);

        assert_eq!(gate.poll(150.0), Some(1));
        assert_eq!(gate.poll(200.0), None);
    }

    #[test]
    fn test_reschedule_supersedes_pending_task() {
        let mut gate = DebounceGate::new();
        gate.schedule("first", 300.0, 0.0);
        gate.schedule("second", 300.0, 200.0);

        // The first deadline passes without firing anything
        assert_eq!(gate.poll(350.0), None);
        // Only the superseding task ever fires
        assert_eq!(gate.poll(500.0), Some("second"));
    }

    #[test]
    fn test_zero_delay_fires_immediately() {
        let mut gate = DebounceGate::new();
        gate.schedule((), 0.0, 42.0);

        assert_eq!(gate.poll(42.0), Some(()));
    }

    #[test]
    fn test_cancel() {
        let mut gate = DebounceGate::new();
        gate.schedule(7, 100.0, 0.0);

        assert!(gate.is_pending());
        assert!(gate.cancel());
        assert!(!gate.cancel());
        assert_eq!(gate.poll(1000.0), None);
    }
}
