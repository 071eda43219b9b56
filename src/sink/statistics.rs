//! Per-changefeed accounting wrapped around sink executions.

use std::time::Instant;

use prometheus::Histogram;
use prometheus::IntCounter;

use crate::metrics::EVENT_SIZE_METRIC;
use crate::metrics::EXEC_BATCH_SIZE_METRIC;
use crate::metrics::EXEC_DDL_DURATION_METRIC;
use crate::metrics::EXEC_DML_COUNT;
use crate::metrics::EXEC_ERROR_COUNT;
use crate::metrics::TOTAL_WRITE_BYTES_COUNT;
use crate::DmlEvent;
use crate::Result;

/// Metrics handle bound to one changefeed and sink type.
///
/// Label values are resolved once at construction so the hot path only
/// touches pre-bound collectors. All methods are thread-safe.
pub struct SinkStatistics {
    changefeed: String,
    sink_type: String,

    exec_ddl_duration: Histogram,
    exec_batch_size: Histogram,
    total_write_bytes: IntCounter,
    event_size: Histogram,
    exec_error_count: IntCounter,
    exec_dml_count: IntCounter,
}

impl SinkStatistics {
    pub fn new(changefeed: &str, sink_type: &str) -> Self {
        Self {
            changefeed: changefeed.to_string(),
            sink_type: sink_type.to_string(),
            exec_ddl_duration: EXEC_DDL_DURATION_METRIC.with_label_values(&[changefeed, sink_type]),
            exec_batch_size: EXEC_BATCH_SIZE_METRIC.with_label_values(&[changefeed, sink_type]),
            total_write_bytes: TOTAL_WRITE_BYTES_COUNT.with_label_values(&[changefeed, sink_type]),
            event_size: EVENT_SIZE_METRIC.with_label_values(&[changefeed]),
            exec_error_count: EXEC_ERROR_COUNT.with_label_values(&[changefeed, sink_type]),
            exec_dml_count: EXEC_DML_COUNT.with_label_values(&[changefeed]),
        }
    }

    /// Accounts every row-change event accepted by the sink.
    pub fn observe_rows<'a>(&self, events: impl IntoIterator<Item = &'a DmlEvent>) {
        for event in events {
            self.event_size.observe(event.size_bytes() as f64);
            self.exec_dml_count.inc();
        }
    }

    /// Runs a batch executor returning `(row_count, written_bytes)` and files
    /// its outcome; a failure bumps the error counter and propagates.
    pub fn record_batch_execution<F>(&self, executor: F) -> Result<()>
    where
        F: FnOnce() -> Result<(usize, u64)>,
    {
        match executor() {
            Ok((batch_size, written_bytes)) => {
                self.exec_batch_size.observe(batch_size as f64);
                self.total_write_bytes.inc_by(written_bytes);
                Ok(())
            }
            Err(e) => {
                self.exec_error_count.inc();
                Err(e)
            }
        }
    }

    /// Times one DDL execution; a failure bumps the error counter and
    /// propagates.
    pub fn record_ddl_execution<F>(&self, executor: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        let start = Instant::now();
        if let Err(e) = executor() {
            self.exec_error_count.inc();
            return Err(e);
        }
        self.exec_ddl_duration
            .observe(start.elapsed().as_secs_f64() * 1000.0);
        Ok(())
    }

    /// Unbinds this changefeed's label values from the shared collectors.
    pub fn close(&self) {
        let labels = [self.changefeed.as_str(), self.sink_type.as_str()];
        let _ = EXEC_DDL_DURATION_METRIC.remove_label_values(&labels);
        let _ = EXEC_BATCH_SIZE_METRIC.remove_label_values(&labels);
        let _ = TOTAL_WRITE_BYTES_COUNT.remove_label_values(&labels);
        let _ = EXEC_ERROR_COUNT.remove_label_values(&labels);
        let _ = EVENT_SIZE_METRIC.remove_label_values(&[self.changefeed.as_str()]);
        let _ = EXEC_DML_COUNT.remove_label_values(&[self.changefeed.as_str()]);
    }
}
