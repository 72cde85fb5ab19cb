// worker thread stuff
use super::manager::Shared;
use super::task::Task;
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub type WorkerId = usize;

// stats for each worker
#[derive(Debug)]
pub struct WorkerState {
    pub tasks_executed: AtomicU64,
    pub tasks_panicked: AtomicU64,
    pub last_panic: Mutex<Option<String>>,
}

impl WorkerState {
    fn new() -> Self {
        Self {
            tasks_executed: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            last_panic: Mutex::new(None),
        }
    }

    pub fn snapshot(&self, id: WorkerId) -> WorkerStats {
        WorkerStats {
            id,
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
            last_panic: self.last_panic.lock().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStats {
    pub id: WorkerId,
    pub tasks_executed: u64,
    pub tasks_panicked: u64,
    /// Message of the most recent handler panic on this worker
    pub last_panic: Option<String>,
}

pub(crate) struct Worker<T> {
    pub id: WorkerId,
    pub state: Arc<WorkerState>,
    shared: Arc<Shared<T>>,
    stop: Receiver<()>,
}

impl<T> Worker<T> {
    /// `stop` disconnects once no further token can be emitted.
    pub fn new(id: WorkerId, shared: Arc<Shared<T>>, stop: Receiver<()>) -> Self {
        Self {
            id,
            state: Arc::new(WorkerState::new()),
            shared,
            stop,
        }
    }

    // main loop
    pub fn run(self) {
        tracing::debug!(worker = self.id, "worker started");

        // waiting: the token is the only thing an idle worker blocks on
        while self.shared.tokens.acquire(&self.stop) {
            self.dispatch();
        }

        // every admitted push has emitted its token by now; run what is left
        let mut drained = 0usize;
        while self.shared.tokens.try_acquire() {
            self.dispatch();
            drained += 1;
        }

        tracing::debug!(worker = self.id, drained, "worker stopped");
    }

    /// Scan levels most-urgent first and run the first task found.
    ///
    /// Called only after a token has been consumed, so some queue holds a
    /// payload that no other worker holds a token for.
    fn dispatch(&self) {
        match self.shared.levels.pop() {
            Some(task) => self.execute_task(task),
            None => {
                self.shared.metrics.record_empty_scan();
                tracing::warn!(worker = self.id, "work token consumed but every queue was empty");
            }
        }
    }

    fn execute_task(&self, task: Task<T>) {
        let Task {
            payload,
            level,
            enqueued_at,
        } = task;
        let wait = enqueued_at.elapsed();
        let start = Instant::now();

        tracing::trace!(worker = self.id, level, "executing task");

        let handler = &*self.shared.handler;
        let result = self.shared.panic_handler.run(self.id, level, || handler(payload));

        if let Err(info) = result {
            self.state.tasks_panicked.fetch_add(1, Ordering::Relaxed);
            self.shared.metrics.record_panic(info.level);
            *self.state.last_panic.lock() = Some(info.message);
        }

        self.shared.metrics.record_execution(level, wait, start.elapsed());
        self.state.tasks_executed.fetch_add(1, Ordering::Relaxed);
    }
}
