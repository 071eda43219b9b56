use crate::broker::DispatcherId;
use crate::messaging::DmlEvent;
use crate::Result;

/// One scan's worth of events plus the watermark the scan reached.
#[derive(Debug, Clone, Default)]
pub struct ScanBatch {
    /// Row-change events in commit order.
    pub events: Vec<DmlEvent>,
    /// Every change at or below this timestamp has been surfaced.
    pub resolved_ts: u64,
    /// Whether the source hit `limit` with events still unread.
    pub has_more: bool,
}

/// Ordered change-event source the broker scans on demand.
///
/// Implementations hand back events with commit timestamps strictly greater
/// than `from_ts`, never more than `limit` at a time. The broker loops while
/// `has_more` is set, flushing between batches, so a slow consumer cannot
/// force one giant scan.
#[cfg_attr(test, mockall::automock)]
pub trait ScanSource: Send + Sync {
    fn scan(&self, dispatcher: DispatcherId, from_ts: u64, limit: usize) -> Result<ScanBatch>;
}
