use std::sync::Arc;
use std::time::Instant;

use autometrics::autometrics;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::broker::DispatcherId;
use crate::broker::ScanSource;
use crate::broker::ScanTask;
use crate::config::BrokerConfig;
use crate::config::BufferConfig;
use crate::config::Settings;
use crate::deque::BlockDeque;
use crate::messaging::DmlEvent;
use crate::messaging::Payload;
use crate::messaging::ServerId;
use crate::messaging::TargetMessage;
use crate::metrics::get_current_ms;
use crate::metrics::DISPATCHER_COUNT;
use crate::metrics::DROPPED_EVENT_COUNT;
use crate::metrics::DROP_NOTIFICATION_COUNT;
use crate::metrics::DROP_SCAN_TASK_COUNT;
use crate::metrics::HANDLE_DURATION_METRIC;
use crate::metrics::RESOLVED_TS_LAG_METRIC;
use crate::metrics::RESOLVED_TS_METRIC;
use crate::metrics::SCAN_DURATION_METRIC;
use crate::metrics::SCAN_TASK_QUEUE_DURATION_METRIC;
use crate::metrics::SEND_EVENT_COUNT;
use crate::metrics::SEND_EVENT_DURATION_METRIC;
use crate::sink::SinkWriter;
use crate::BrokerError;
use crate::Result;
use crate::API_SLO;

/// Mutable per-dispatcher state, guarded by the path lock.
struct PathState {
    to: ServerId,
    epoch: u64,
    sequence: u64,
    /// Source position already covered by past scans.
    scanned_ts: u64,
    /// Watermark the downstream may trust.
    resolved_ts: u64,
    /// Scanned but undelivered events, oldest first.
    buffer: BlockDeque<TargetMessage>,
    /// One slot; a newer signal evicts the waiting one.
    pending_scan: BlockDeque<ScanTask>,
}

impl PathState {
    fn new(to: ServerId, from_ts: u64, epoch: u64, buffer: &BufferConfig) -> Self {
        Self {
            to,
            epoch,
            sequence: 0,
            scanned_ts: from_ts,
            resolved_ts: from_ts,
            buffer: BlockDeque::new(buffer.block_len, buffer.max_buffered_events),
            pending_scan: BlockDeque::new(2, 1),
        }
    }
}

/// Fans scanned changes out to per-dispatcher buffers and drains them into
/// the sink.
///
/// Every dispatcher owns an independent path: its own scan position,
/// watermark, sequence counter and bounded event buffer. Paths never block
/// each other; a stalled sink shows up as one path's buffer filling, not as
/// backpressure on the whole broker.
pub struct EventBroker {
    server_id: ServerId,
    source: Arc<dyn ScanSource>,
    writer: Arc<dyn SinkWriter>,
    paths: DashMap<DispatcherId, Arc<Mutex<PathState>>>,
    buffer_config: BufferConfig,
    broker_config: BrokerConfig,
}

impl EventBroker {
    pub fn new(
        server_id: ServerId,
        source: Arc<dyn ScanSource>,
        writer: Arc<dyn SinkWriter>,
        settings: &Settings,
    ) -> Self {
        Self {
            server_id,
            source,
            writer,
            paths: DashMap::new(),
            buffer_config: settings.buffer.clone(),
            broker_config: settings.broker.clone(),
        }
    }

    /// Opens (or reopens) the event path for a dispatcher and returns its
    /// epoch.
    ///
    /// Re-registering discards buffered state and bumps the epoch, so a
    /// downstream that reconnects can tell fresh messages from stale ones.
    #[autometrics(objective = API_SLO)]
    pub fn register_dispatcher(&self, dispatcher: DispatcherId, to: ServerId, from_ts: u64) -> u64 {
        let epoch = match self.paths.entry(dispatcher) {
            Entry::Occupied(mut occupied) => {
                let epoch = occupied.get().lock().epoch + 1;
                occupied.insert(Arc::new(Mutex::new(PathState::new(
                    to,
                    from_ts,
                    epoch,
                    &self.buffer_config,
                ))));
                epoch
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(Mutex::new(PathState::new(
                    to,
                    from_ts,
                    1,
                    &self.buffer_config,
                ))));
                DISPATCHER_COUNT.inc();
                1
            }
        };
        debug!("dispatcher {} registered with epoch {}", dispatcher, epoch);
        epoch
    }

    /// Closes a dispatcher's path, dropping whatever it still buffered.
    #[autometrics(objective = API_SLO)]
    pub fn remove_dispatcher(&self, dispatcher: DispatcherId) -> bool {
        if self.paths.remove(&dispatcher).is_none() {
            return false;
        }
        DISPATCHER_COUNT.dec();
        let label = dispatcher.to_string();
        let _ = RESOLVED_TS_METRIC.remove_label_values(&[&label]);
        let _ = RESOLVED_TS_LAG_METRIC.remove_label_values(&[&label]);
        let _ = DROPPED_EVENT_COUNT.remove_label_values(&[&label]);
        debug!("dispatcher {} removed", dispatcher);
        true
    }

    /// Queues a scan signal for its dispatcher.
    ///
    /// # Errors
    /// Returns [`BrokerError::UnknownDispatcher`] when no path is registered
    /// for the task's dispatcher.
    #[autometrics(objective = API_SLO)]
    pub fn notify(&self, task: ScanTask) -> Result<()> {
        let path = self.path(task.dispatcher)?;
        let mut state = path.lock();
        let squeezed = !state.pending_scan.is_empty();
        state.pending_scan.push_back(task);
        if squeezed {
            DROP_SCAN_TASK_COUNT.inc();
        }
        Ok(())
    }

    /// Runs the pending scan for one dispatcher, if any; returns whether a
    /// scan actually hit the source.
    ///
    /// A signal whose watermark the path has already covered only advances
    /// the watermark. Otherwise the source is scanned batch by batch until
    /// it reports no backlog, flushing between batches so catch-up memory
    /// stays bounded by the buffer, not the backlog.
    #[autometrics(objective = API_SLO)]
    pub fn handle_scan_task(&self, dispatcher: DispatcherId) -> Result<bool> {
        let path = self.path(dispatcher)?;
        let mut state = path.lock();

        let task = match state.pending_scan.pop_front() {
            Some(task) => task,
            None => return Ok(false),
        };
        SCAN_TASK_QUEUE_DURATION_METRIC.observe((get_current_ms() - task.queued_at_ms).max(0.0));

        if task.notified_ts <= state.scanned_ts {
            self.advance_resolved(dispatcher, &mut state, task.notified_ts);
            return Ok(false);
        }

        loop {
            let started = Instant::now();
            let batch = self.source.scan(
                dispatcher,
                state.scanned_ts,
                self.broker_config.scan_batch_size,
            )?;
            SCAN_DURATION_METRIC.observe(started.elapsed().as_secs_f64() * 1000.0);

            self.buffer_events(dispatcher, &mut state, batch.events);
            state.scanned_ts = batch.resolved_ts;
            self.advance_resolved(dispatcher, &mut state, batch.resolved_ts);

            if !batch.has_more {
                return Ok(true);
            }
            self.flush_state(dispatcher, &mut state)?;
        }
    }

    /// Delivers buffered events for one dispatcher, block by block, oldest
    /// first; returns how many were delivered.
    ///
    /// On a write failure the delivered prefix leaves the buffer and the
    /// rest stays, so a sink outage degrades to retries instead of loss.
    #[autometrics(objective = API_SLO)]
    pub fn flush_path(&self, dispatcher: DispatcherId) -> Result<usize> {
        let path = self.path(dispatcher)?;
        let mut state = path.lock();
        self.flush_state(dispatcher, &mut state)
    }

    pub fn dispatcher_count(&self) -> usize {
        self.paths.len()
    }

    /// Watermark for one dispatcher, if registered.
    pub fn resolved_ts(&self, dispatcher: DispatcherId) -> Option<u64> {
        self.paths
            .get(&dispatcher)
            .map(|path| path.lock().resolved_ts)
    }

    /// Buffered undelivered events for one dispatcher, if registered.
    pub fn buffered_len(&self, dispatcher: DispatcherId) -> Option<usize> {
        self.paths
            .get(&dispatcher)
            .map(|path| path.lock().buffer.len())
    }

    /// Drives the broker from a notification stream until shutdown or the
    /// stream closes.
    ///
    /// Notifications are drained in bursts; each touched path gets one scan
    /// pass and one flush per burst no matter how many signals arrived for
    /// it in the meantime.
    pub async fn run(
        self: Arc<Self>,
        mut notifications: mpsc::Receiver<ScanTask>,
        mut shutdown: watch::Receiver<()>,
    ) -> Result<()> {
        info!("event broker started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("event broker received shutdown signal");
                    return Ok(());
                }
                maybe_task = notifications.recv() => {
                    match maybe_task {
                        Some(task) => {
                            let started = Instant::now();
                            let mut touched = Vec::new();
                            self.accept(task, &mut touched);
                            while let Ok(more) = notifications.try_recv() {
                                self.accept(more, &mut touched);
                            }
                            for dispatcher in touched {
                                if let Err(e) = self.handle_scan_task(dispatcher) {
                                    error!("scan failed for dispatcher {}: {:?}", dispatcher, e);
                                    continue;
                                }
                                if let Err(e) = self.flush_path(dispatcher) {
                                    error!("flush failed for dispatcher {}: {:?}", dispatcher, e);
                                }
                            }
                            HANDLE_DURATION_METRIC.observe(started.elapsed().as_secs_f64() * 1000.0);
                        }
                        None => {
                            debug!("notification channel closed, event broker stopping");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn accept(&self, task: ScanTask, touched: &mut Vec<DispatcherId>) {
        let dispatcher = task.dispatcher;
        match self.notify(task) {
            Ok(()) => {
                if !touched.contains(&dispatcher) {
                    touched.push(dispatcher);
                }
            }
            Err(e) => {
                DROP_NOTIFICATION_COUNT.inc();
                warn!("dropping notification for dispatcher {}: {:?}", dispatcher, e);
            }
        }
    }

    fn path(&self, dispatcher: DispatcherId) -> Result<Arc<Mutex<PathState>>> {
        match self.paths.get(&dispatcher) {
            Some(entry) => Ok(entry.value().clone()),
            None => Err(BrokerError::UnknownDispatcher(dispatcher.to_string()).into()),
        }
    }

    /// Wraps scanned events in envelopes and appends them to the path
    /// buffer, counting evictions when the bounded window pushes old events
    /// out.
    fn buffer_events(
        &self,
        dispatcher: DispatcherId,
        state: &mut PathState,
        events: Vec<DmlEvent>,
    ) {
        if events.is_empty() {
            return;
        }
        let mut evicted = 0u64;
        for event in events {
            state.sequence += 1;
            let message = TargetMessage {
                from: self.server_id,
                to: state.to,
                epoch: state.epoch,
                sequence: state.sequence,
                payload: Payload::Dml(event),
            };
            let before = state.buffer.len();
            state.buffer.push_back(message);
            if state.buffer.len() == before {
                evicted += 1;
            }
        }
        if evicted > 0 {
            DROPPED_EVENT_COUNT
                .with_label_values(&[&dispatcher.to_string()])
                .inc_by(evicted);
            warn!(
                "dispatcher {} buffer full, evicted {} oldest events",
                dispatcher, evicted
            );
        }
    }

    fn flush_state(&self, dispatcher: DispatcherId, state: &mut PathState) -> Result<usize> {
        if state.buffer.is_empty() {
            return Ok(0);
        }

        let mut delivered = 0;
        let mut failure = None;
        for batch in state.buffer.blocks() {
            let started = Instant::now();
            match self.writer.write_batch(batch) {
                Ok(()) => {
                    delivered += batch.len();
                    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                    for message in batch {
                        SEND_EVENT_COUNT
                            .with_label_values(&[&message.kind().to_string()])
                            .inc();
                    }
                    if let Some(first) = batch.first() {
                        SEND_EVENT_DURATION_METRIC
                            .with_label_values(&[&first.kind().to_string()])
                            .observe(elapsed_ms);
                    }
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        for _ in 0..delivered {
            state.buffer.pop_front();
        }
        debug!("dispatcher {} flushed {} events", dispatcher, delivered);

        match failure {
            Some(e) => {
                warn!(
                    "dispatcher {} flush interrupted after {} events: {:?}",
                    dispatcher, delivered, e
                );
                Err(e)
            }
            None => Ok(delivered),
        }
    }

    fn advance_resolved(&self, dispatcher: DispatcherId, state: &mut PathState, ts: u64) {
        if ts > state.resolved_ts {
            state.resolved_ts = ts;
        }
        let label = dispatcher.to_string();
        RESOLVED_TS_METRIC
            .with_label_values(&[&label])
            .set(state.resolved_ts as f64);
        RESOLVED_TS_LAG_METRIC
            .with_label_values(&[&label])
            .set((get_current_ms() - state.resolved_ts as f64).max(0.0));
    }
}
