use super::statistics::SinkStatistics;
use crate::metrics::EXEC_DML_COUNT;
use crate::metrics::EXEC_ERROR_COUNT;
use crate::metrics::TOTAL_WRITE_BYTES_COUNT;
use crate::DmlEvent;
use crate::Error;
use crate::SinkError;

fn event(bytes: usize) -> DmlEvent {
    DmlEvent {
        schema: "shop".to_string(),
        table: "orders".to_string(),
        commit_ts: 1,
        rows: vec![vec![0u8; bytes]],
    }
}

// Collectors are process-global, so every test binds its own changefeed
// label to stay independent of the others.

#[test]
fn test_observe_rows_counts_events() {
    let stats = SinkStatistics::new("cf-observe", "kafka");
    stats.observe_rows([event(10), event(20), event(30)].iter());

    let count = EXEC_DML_COUNT.with_label_values(&["cf-observe"]).get();
    assert_eq!(3, count);
}

#[test]
fn test_record_batch_execution_files_sizes() {
    let stats = SinkStatistics::new("cf-batch", "kafka");
    stats
        .record_batch_execution(|| Ok((7, 1024)))
        .unwrap();
    stats
        .record_batch_execution(|| Ok((3, 476)))
        .unwrap();

    let bytes = TOTAL_WRITE_BYTES_COUNT
        .with_label_values(&["cf-batch", "kafka"])
        .get();
    assert_eq!(1500, bytes);
}

#[test]
fn test_record_batch_execution_counts_failures() {
    let stats = SinkStatistics::new("cf-batch-err", "kafka");
    let result = stats.record_batch_execution(|| {
        Err(SinkError::WriteFailed("connection reset".to_string()).into())
    });

    assert!(matches!(
        result,
        Err(Error::Sink(SinkError::WriteFailed(_)))
    ));
    let errors = EXEC_ERROR_COUNT
        .with_label_values(&["cf-batch-err", "kafka"])
        .get();
    assert_eq!(1, errors);

    // Bytes must not be filed for a failed batch.
    let bytes = TOTAL_WRITE_BYTES_COUNT
        .with_label_values(&["cf-batch-err", "kafka"])
        .get();
    assert_eq!(0, bytes);
}

#[test]
fn test_record_ddl_execution() {
    let stats = SinkStatistics::new("cf-ddl", "kafka");
    stats.record_ddl_execution(|| Ok(())).unwrap();

    let result = stats.record_ddl_execution(|| {
        Err(SinkError::WriteFailed("ddl rejected".to_string()).into())
    });
    assert!(result.is_err());

    let errors = EXEC_ERROR_COUNT.with_label_values(&["cf-ddl", "kafka"]).get();
    assert_eq!(1, errors);
}

#[test]
fn test_close_unbinds_label_values() {
    let stats = SinkStatistics::new("cf-close", "kafka");
    stats.observe_rows([event(5)].iter());
    assert_eq!(1, EXEC_DML_COUNT.with_label_values(&["cf-close"]).get());

    stats.close();

    // Re-binding after close starts from a fresh series.
    assert_eq!(0, EXEC_DML_COUNT.with_label_values(&["cf-close"]).get());
}
