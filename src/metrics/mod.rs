use autometrics::prometheus_exporter::{self, PrometheusResponse};
use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, register_histogram, register_histogram_vec, GaugeVec, Histogram,
    HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use warp::{Filter, Rejection, Reply};

lazy_static! {
    pub static ref SEND_EVENT_DURATION_METRIC: HistogramVec = register_histogram_vec!(
        "send_event_duration_ms",
        "Histogram of per-message delivery duration in ms, by payload kind",
        &["type"],
        exponential_buckets(1.0, 2.0, 10).unwrap()
    )
    .expect("metric can not be created");

    pub static ref SCAN_DURATION_METRIC: Histogram = register_histogram!(
        "scan_duration_ms",
        "Histogram of one source scan duration in ms",
        exponential_buckets(1.0, 2.0, 10).unwrap()
    )
    .expect("metric can not be created");

    pub static ref HANDLE_DURATION_METRIC: Histogram = register_histogram!(
        "handle_duration_ms",
        "Histogram of scan task handling duration in ms",
        exponential_buckets(1.0, 2.0, 10).unwrap()
    )
    .expect("metric can not be created");

    pub static ref SCAN_TASK_QUEUE_DURATION_METRIC: Histogram = register_histogram!(
        "scan_task_queue_duration_ms",
        "Histogram of time a scan task spent queued in ms",
        exponential_buckets(1.0, 2.0, 10).unwrap()
    )
    .expect("metric can not be created");

    pub static ref EXEC_DDL_DURATION_METRIC: HistogramVec = register_histogram_vec!(
        "exec_ddl_duration_ms",
        "Histogram of DDL execution duration in ms",
        &["changefeed", "sink_type"],
        exponential_buckets(1.0, 2.0, 14).unwrap()
    )
    .expect("metric can not be created");

    pub static ref EXEC_BATCH_SIZE_METRIC: HistogramVec = register_histogram_vec!(
        "exec_batch_size",
        "Histogram of rows per executed sink batch",
        &["changefeed", "sink_type"],
        exponential_buckets(1.0, 2.0, 12).unwrap()
    )
    .expect("metric can not be created");

    pub static ref EVENT_SIZE_METRIC: HistogramVec = register_histogram_vec!(
        "event_size_bytes",
        "Histogram of row-change event sizes in bytes",
        &["changefeed"],
        exponential_buckets(10.0, 5.0, 10).unwrap()
    )
    .expect("metric can not be created");

    pub static ref SEND_EVENT_COUNT: IntCounterVec = IntCounterVec::new(
        Opts::new("send_event_count", "Events handed to the sink, by payload kind"),
        &["type"]
    )
    .expect("Should succeed to create metric");

    pub static ref RESOLVED_TS_METRIC: GaugeVec = GaugeVec::new(
        Opts::new("resolved_ts", "Resolved watermark per dispatcher in ms"),
        &["dispatcher"]
    )
    .expect("Should succeed to create metric");

    pub static ref RESOLVED_TS_LAG_METRIC: GaugeVec = GaugeVec::new(
        Opts::new("resolved_ts_lag_ms", "Resolved watermark lag per dispatcher in ms"),
        &["dispatcher"]
    )
    .expect("Should succeed to create metric");

    pub static ref DISPATCHER_COUNT: IntGauge = IntGauge::new(
        "dispatcher_count",
        "Number of registered dispatchers"
    )
    .expect("Should succeed to create metric");

    pub static ref DROP_SCAN_TASK_COUNT: IntCounter = IntCounter::new(
        "drop_scan_task_count",
        "Scan tasks squeezed out by a newer signal"
    )
    .expect("Should succeed to create metric");

    pub static ref DROP_NOTIFICATION_COUNT: IntCounter = IntCounter::new(
        "drop_notification_count",
        "Notifications dropped because no dispatcher path matched"
    )
    .expect("Should succeed to create metric");

    pub static ref DROPPED_EVENT_COUNT: IntCounterVec = IntCounterVec::new(
        Opts::new("dropped_event_count", "Buffered events evicted by the bounded window"),
        &["dispatcher"]
    )
    .expect("Should succeed to create metric");

    pub static ref TOTAL_WRITE_BYTES_COUNT: IntCounterVec = IntCounterVec::new(
        Opts::new("total_write_bytes", "Bytes written to the sink"),
        &["changefeed", "sink_type"]
    )
    .expect("Should succeed to create metric");

    pub static ref EXEC_ERROR_COUNT: IntCounterVec = IntCounterVec::new(
        Opts::new("exec_error_count", "Failed sink executions"),
        &["changefeed", "sink_type"]
    )
    .expect("Should succeed to create metric");

    pub static ref EXEC_DML_COUNT: IntCounterVec = IntCounterVec::new(
        Opts::new("exec_dml_count", "Row-change events accepted by the sink"),
        &["changefeed"]
    )
    .expect("Should succeed to create metric");

    pub static ref REGISTRY: Registry = Registry::new();
}

fn register_custom_metrics() {
    REGISTRY
        .register(Box::new(SEND_EVENT_COUNT.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(RESOLVED_TS_METRIC.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(RESOLVED_TS_LAG_METRIC.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(DISPATCHER_COUNT.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(DROP_SCAN_TASK_COUNT.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(DROP_NOTIFICATION_COUNT.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(DROPPED_EVENT_COUNT.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(TOTAL_WRITE_BYTES_COUNT.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(EXEC_ERROR_COUNT.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(EXEC_DML_COUNT.clone()))
        .expect("collector can be registered");
}

/// Serves `/metrics` as the monitoring section dictates; disabled monitoring
/// is a no-op. Returns whether a server actually ran.
pub async fn start_server_with(
    config: &crate::config::MonitoringConfig,
    shutdown_signal: watch::Receiver<()>,
) -> bool {
    if !config.prometheus_enabled {
        tracing::info!("prometheus disabled, metrics server not started");
        return false;
    }
    start_server(config.prometheus_port, shutdown_signal).await;
    true
}

pub async fn start_server(port: u16, mut shutdown_signal: watch::Receiver<()>) {
    register_custom_metrics();

    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    let (_, server) =
        warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
            let _ = shutdown_signal.changed().await;
        });
    server.await;
}

async fn metrics_handler() -> Result<impl Reply, Rejection> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        eprintln!("could not encode custom metrics: {}", e);
    };
    let mut res = match String::from_utf8(buffer.clone()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    };
    buffer.clear();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        eprintln!("could not encode prometheus metrics: {}", e);
    };
    let res_custom = match String::from_utf8(buffer.clone()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("prometheus metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    };
    buffer.clear();

    let autometrics_metrics = get_metrics_body();
    res.push_str(&res_custom);
    res.push_str(&autometrics_metrics);
    Ok(res)
}

/// Export metrics for Prometheus to scrape
pub fn get_metrics_body() -> String {
    let autometrics_response = prometheus_exporter::encode_http_response();
    autometrics_response.into_body()
}
/// Export metrics for Prometheus to scrape
pub fn get_metrics() -> PrometheusResponse {
    prometheus_exporter::encode_http_response()
}

pub fn get_current_ms() -> f64 {
    let start_time = SystemTime::now();
    let since_epoch = start_time
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards");
    let current_time_ms =
        (since_epoch.as_secs() * 1000) as f64 + since_epoch.subsec_nanos() as f64 / 1_000_000.0;
    current_time_ms.round() / 1.0
}
