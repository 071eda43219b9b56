use crate::Result;
use crate::TargetMessage;

/// Downstream writer receiving ordered runs of buffered messages.
///
/// The broker hands over one block-sized slice at a time; a failed write
/// leaves the undelivered remainder buffered, so writers see each message at
/// least once and always in order.
#[cfg_attr(test, mockall::automock)]
pub trait SinkWriter: Send + Sync {
    fn write_batch(&self, messages: &[TargetMessage]) -> Result<()>;
}
