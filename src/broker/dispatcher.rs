use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::metrics::get_current_ms;

/// Identifies one downstream event path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatcherId(Uuid);

impl DispatcherId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DispatcherId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DispatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Signal that a dispatcher's source range may hold new events.
///
/// Tasks are not queued per signal: each path keeps one slot, and a newer
/// task squeezes a waiting one out. Skipping an older signal is safe because
/// its range is a prefix of the newer one's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanTask {
    pub dispatcher: DispatcherId,
    /// Watermark reported by the notifier; the scan is skipped when the path
    /// has already covered it.
    pub notified_ts: u64,
    /// Enqueue wall clock in ms, for queue-delay accounting.
    pub queued_at_ms: f64,
}

impl ScanTask {
    pub fn new(dispatcher: DispatcherId, notified_ts: u64) -> Self {
        Self {
            dispatcher,
            notified_ts,
            queued_at_ms: get_current_ms(),
        }
    }
}
