//! Task envelope and handler type.

use std::sync::Arc;
use std::time::Instant;

/// Shared function invoked once per task on some worker thread.
pub type Handler<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// Wrap a closure as a [`Handler`].
pub fn handler<T, F>(f: F) -> Handler<T>
where
    F: Fn(T) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Handler used when none is configured; payloads are dropped after dequeue.
pub(crate) fn noop_handler<T: 'static>() -> Handler<T> {
    Arc::new(|_payload: T| {})
}

/// A payload resident in one priority queue
pub(crate) struct Task<T> {
    pub(crate) payload: T,
    pub(crate) level: usize,
    pub(crate) enqueued_at: Instant,
}

impl<T> Task<T> {
    pub fn new(payload: T, level: usize) -> Self {
        Task {
            payload,
            level,
            enqueued_at: Instant::now(),
        }
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("level", &self.level)
            .field("enqueued_at", &self.enqueued_at)
            .finish()
    }
}
