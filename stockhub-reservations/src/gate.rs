use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The `reservationsEnabled` flag of one reservable resource.
///
/// Starts open and only ever closes. Clones share the same flag, so the
/// orchestrator and its job processor observe the same state.
#[derive(Debug, Clone)]
pub struct ReservationGate {
    enabled: Arc<AtomicBool>,
}

impl Default for ReservationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationGate {
    pub fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Close the gate. Returns true if this call closed it.
    pub fn block(&self) -> bool {
        self.enabled.swap(false, Ordering::SeqCst)
    }
}
