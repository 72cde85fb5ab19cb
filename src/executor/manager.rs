use super::panic_handler::PanicHandler;
use super::task::{noop_handler, Handler, Task};
use super::worker::{Worker, WorkerId, WorkerState, WorkerStats};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::scheduler::PriorityLevels;
use crate::telemetry::{Metrics, MetricsSnapshot};
use crate::util::{AdmissionGate, WorkTokens};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// State shared between the manager handle and every worker.
pub(crate) struct Shared<T> {
    pub(crate) levels: PriorityLevels<T>,
    pub(crate) tokens: WorkTokens,
    pub(crate) handler: Handler<T>,
    pub(crate) panic_handler: PanicHandler,
    pub(crate) metrics: Metrics,
}

struct WorkerHandle {
    id: WorkerId,
    state: Arc<WorkerState>,
    thread: Option<JoinHandle<()>>,
}

/// Bounded, priority-ordered task scheduler over a fixed worker pool.
///
/// Tasks are pushed with an integer priority, 0 being the most urgent and
/// `max_priority` the least. Each level is a bounded FIFO queue. A separate
/// token pool, bounded by the same `max_pending_tasks`, counts payloads
/// resident across *all* levels, so the total outstanding work never exceeds
/// `max_pending_tasks` even though each level could hold that many alone.
///
/// Every worker blocks on a token, then takes the head of the most urgent
/// non-empty level and runs the shared handler on it. A push enqueues its
/// payload before emitting its token, so a worker holding a token always
/// finds a payload.
///
/// Workers run until [`shutdown`](TaskManager::shutdown) is called or the
/// manager is dropped.
pub struct TaskManager<T> {
    shared: Arc<Shared<T>>,
    workers: Mutex<Vec<WorkerHandle>>,
    gate: AdmissionGate,
    config: Config,
}

impl<T: Send + 'static> TaskManager<T> {
    /// Start a manager from raw limits.
    ///
    /// Limits below 1 are coerced to 1 and a missing handler becomes a no-op,
    /// so this never fails on its inputs.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to spawn a worker thread, like
    /// [`std::thread::spawn`]. Use [`with_config`](Self::with_config) to get
    /// that failure as an error instead.
    pub fn new(
        num_workers: isize,
        max_priority: isize,
        max_pending_tasks: isize,
        handler: Option<Handler<T>>,
    ) -> Self {
        let config = Config::from_limits(num_workers, max_priority, max_pending_tasks);
        Self::with_config(config, handler).expect("failed to spawn task manager workers")
    }

    pub fn with_config(config: Config, handler: Option<Handler<T>>) -> Result<Self> {
        let config = config.normalized();

        let shared = Arc::new(Shared {
            levels: PriorityLevels::new(config.max_priority, config.max_pending_tasks),
            tokens: WorkTokens::new(config.max_pending_tasks),
            handler: handler.unwrap_or_else(noop_handler),
            panic_handler: PanicHandler::new(config.panic_strategy),
            metrics: Metrics::new(config.levels()),
        });

        let gate = AdmissionGate::new();

        let mut handles: Vec<WorkerHandle> = Vec::with_capacity(config.num_workers);

        for id in 0..config.num_workers {
            let worker = Worker::new(id, shared.clone(), gate.drained().clone());
            let state = worker.state.clone();
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);

            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            match builder.spawn(move || worker.run()) {
                Ok(thread) => handles.push(WorkerHandle {
                    id,
                    state,
                    thread: Some(thread),
                }),
                Err(e) => {
                    // stop the workers that did start before reporting
                    gate.close();
                    for handle in &mut handles {
                        if let Some(thread) = handle.thread.take() {
                            let _ = thread.join();
                        }
                    }
                    return Err(Error::Spawn(e));
                }
            }
        }

        tracing::debug!(
            workers = config.num_workers,
            max_priority = config.max_priority,
            max_pending_tasks = config.max_pending_tasks,
            "task manager started"
        );

        Ok(Self {
            shared,
            workers: Mutex::new(handles),
            gate,
            config,
        })
    }
}

impl<T> TaskManager<T> {
    /// Submit `payload` at `priority`.
    ///
    /// The priority is clamped into `[0, max_priority]`. The payload is
    /// enqueued on its level first, blocking while that level is full, and
    /// then one work token is emitted, blocking while the global pending
    /// budget is exhausted. Returns once both steps are done; it never waits
    /// for the task to run.
    ///
    /// A push that starts after [`shutdown`](Self::shutdown) has begun drops
    /// its payload and returns immediately. A push already under way when
    /// shutdown begins completes normally and its task runs.
    pub fn push_task(&self, priority: isize, payload: T) {
        let Some(_admission) = self.gate.enter() else {
            tracing::debug!(priority, "task manager shut down, dropping task");
            return;
        };

        let level = self.shared.levels.clamp(priority);

        // payload first, then its token: a token holder always finds a payload
        self.shared.levels.push(Task::new(payload, level));
        self.shared.tokens.emit();

        self.shared.metrics.record_submitted();
    }

    /// Stop the workers and wait for them.
    ///
    /// New pushes are refused from here on. Pushes already under way finish
    /// (workers keep serving them, so backpressure still resolves), and workers
    /// exit only after running every accepted task. Calling this again is a
    /// no-op. When called from a handler, the calling worker is not joined; it
    /// exits on its own once the handler returns.
    pub fn shutdown(&self) -> Result<()> {
        if self.gate.close() {
            tracing::debug!(in_flight = self.gate.in_flight(), "task manager shutting down");
        }

        let current = thread::current().id();
        let to_join: Vec<(WorkerId, JoinHandle<()>)> = {
            let mut workers = self.workers.lock();
            workers
                .iter_mut()
                .filter(|h| {
                    h.thread
                        .as_ref()
                        .map_or(false, |t| t.thread().id() != current)
                })
                .filter_map(|h| h.thread.take().map(|t| (h.id, t)))
                .collect()
        };

        let mut result = Ok(());
        for (id, thread) in to_join {
            if thread.join().is_err() && result.is_ok() {
                result = Err(Error::worker_panic(format!("worker {} terminated abnormally", id)));
            }
        }

        result
    }

    pub fn is_shut_down(&self) -> bool {
        self.gate.is_closed()
    }

    pub fn num_workers(&self) -> usize {
        self.config.num_workers
    }

    pub fn max_priority(&self) -> usize {
        self.config.max_priority
    }

    pub fn max_pending_tasks(&self) -> usize {
        self.config.max_pending_tasks
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Work tokens emitted and not yet taken by a worker.
    pub fn pending_tasks(&self) -> usize {
        self.shared.tokens.outstanding()
    }

    /// Resident payloads per priority level.
    pub fn queue_lengths(&self) -> Vec<usize> {
        self.shared.levels.lengths()
    }

    pub fn worker_stats(&self) -> Vec<WorkerStats> {
        self.workers
            .lock()
            .iter()
            .map(|h| h.state.snapshot(h.id))
            .collect()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }
}

impl<T> Drop for TaskManager<T> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!(error = %e, "task manager shutdown failed");
        }
    }
}

impl<T> std::fmt::Debug for TaskManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager")
            .field("num_workers", &self.config.num_workers)
            .field("max_priority", &self.config.max_priority)
            .field("max_pending_tasks", &self.config.max_pending_tasks)
            .field("pending_tasks", &self.pending_tasks())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
