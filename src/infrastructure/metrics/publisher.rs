//! Batched asynchronous metrics publisher
//!
//! Request handlers enqueue events into a bounded ring buffer under a
//! short-lived lock; flushing happens in batches on a small worker pool
//! so publish latency and sink failures never serialize the request
//! path. Metrics are best-effort throughout: overflow drops the oldest
//! events, and a failed publish is logged and discarded.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use crate::domain::metrics::{MetricEvent, MetricsSink};

/// Configuration for the metrics publisher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsPublisherConfig {
    /// Maximum buffered events; the oldest entry is dropped on overflow
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Buffer length that triggers an asynchronous flush, and the
    /// maximum events per publish call (the sink's batch cap)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Time since the last flush after which the next enqueue flushes
    /// regardless of buffer length
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,

    /// Concurrent publish dispatches allowed
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_capacity() -> usize {
    100
}

fn default_batch_size() -> usize {
    20
}

fn default_flush_interval_secs() -> u64 {
    10
}

fn default_max_concurrency() -> usize {
    2
}

impl Default for MetricsPublisherConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            batch_size: default_batch_size(),
            flush_interval_secs: default_flush_interval_secs(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl MetricsPublisherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval_secs = interval.as_secs();
        self
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

/// Tracks units of in-flight background work so a host runtime (or a
/// shutdown sequence) can observe outstanding publishes. Completion is
/// tied to guard drop, so a panicking or failing publish still
/// completes its unit.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    active: AtomicUsize,
    completed: AtomicU64,
}

impl TaskRegistry {
    pub fn register(self: &Arc<Self>) -> TaskGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            registry: Arc::clone(self),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

/// Guard representing one registered unit of background work
#[derive(Debug)]
pub struct TaskGuard {
    registry: Arc<TaskRegistry>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.registry.active.fetch_sub(1, Ordering::SeqCst);
        self.registry.completed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct BufferState {
    buffer: VecDeque<MetricEvent>,
    last_flush: Instant,
    dropped: u64,
}

/// Bounded, batching metrics publisher
#[derive(Debug)]
pub struct MetricsPublisher {
    sink: Arc<dyn MetricsSink>,
    state: Mutex<BufferState>,
    permits: Arc<Semaphore>,
    registry: Arc<TaskRegistry>,
    config: MetricsPublisherConfig,
}

impl MetricsPublisher {
    pub fn new(sink: Arc<dyn MetricsSink>, config: MetricsPublisherConfig) -> Self {
        Self {
            sink,
            state: Mutex::new(BufferState {
                buffer: VecDeque::with_capacity(config.capacity),
                last_flush: Instant::now(),
                dropped: 0,
            }),
            permits: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            registry: Arc::new(TaskRegistry::default()),
            config,
        }
    }

    /// Buffer an event for asynchronous publication.
    ///
    /// Holds the buffer lock only for the append and the trigger check;
    /// the flush itself is dispatched after the lock is released.
    pub fn enqueue(&self, event: MetricEvent) {
        let should_flush = {
            let mut state = self.lock_state();

            if state.buffer.len() >= self.config.capacity {
                state.buffer.pop_front();
                state.dropped += 1;
                if state.dropped == 1 || state.dropped % 100 == 0 {
                    warn!(
                        dropped = state.dropped,
                        "metrics buffer overflow, dropping oldest events"
                    );
                }
            }

            state.buffer.push_back(event);

            state.buffer.len() >= self.config.batch_size
                || state.last_flush.elapsed() > self.config.flush_interval()
        };

        if should_flush {
            self.flush_async();
        }
    }

    /// Extract one batch and dispatch it on the worker pool
    fn flush_async(&self) {
        let batch = {
            let mut state = self.lock_state();

            if state.buffer.is_empty() {
                return;
            }

            let take = self.config.batch_size.min(state.buffer.len());
            let batch: Vec<MetricEvent> = state.buffer.drain(..take).collect();
            state.last_flush = Instant::now();
            batch
        };

        let sink = Arc::clone(&self.sink);
        let permits = Arc::clone(&self.permits);
        let guard = self.registry.register();

        tokio::spawn(async move {
            // Guard completes the unit whatever happens below
            let _guard = guard;

            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            debug!(count = batch.len(), "publishing metrics batch");
            if let Err(e) = sink.publish(&batch).await {
                error!("Failed to publish metrics batch: {}", e);
            }
        });
    }

    /// Synchronously publish everything still buffered, bypassing the
    /// worker pool. For orderly shutdown; idempotent on an empty buffer.
    pub async fn drain(&self) {
        let events: Vec<MetricEvent> = {
            let mut state = self.lock_state();
            state.last_flush = Instant::now();
            state.buffer.drain(..).collect()
        };

        if events.is_empty() {
            return;
        }

        debug!(count = events.len(), "draining remaining metrics");
        for chunk in events.chunks(self.config.batch_size) {
            if let Err(e) = self.sink.publish(chunk).await {
                error!("Failed to flush remaining metrics: {}", e);
            }
        }
    }

    /// Current buffer length
    pub fn buffered(&self) -> usize {
        self.lock_state().buffer.len()
    }

    /// Events discarded to overflow since startup
    pub fn dropped(&self) -> u64 {
        self.lock_state().dropped
    }

    /// Registry tracking in-flight publish dispatches
    pub fn task_registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BufferState> {
        // Publisher state is plain data; a poisoned lock only means a
        // panic mid-append, so keep serving rather than spreading it
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
