//! Per-call isolation around the task handler.

use super::worker::WorkerId;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// What a worker does when the handler panics on one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicStrategy {
    /// Abort the whole process.
    Abort,
    /// Swallow the panic silently and keep serving tasks.
    Isolate,
    /// Log the panic and keep serving tasks.
    #[default]
    LogAndContinue,
}

/// Message recovered from a handler panic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicInfo {
    pub worker: WorkerId,
    pub level: usize,
    pub message: String,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Runs handler calls so that one panicking task cannot take its worker
/// down with it. Queue and token state are never touched inside the guarded
/// call, so an unwind leaves them consistent.
#[derive(Debug)]
pub struct PanicHandler {
    strategy: PanicStrategy,
}

impl PanicHandler {
    pub fn new(strategy: PanicStrategy) -> Self {
        Self { strategy }
    }

    /// Run `f` for a task taken from `level` by `worker`.
    pub fn run<F>(&self, worker: WorkerId, level: usize, f: F) -> Result<(), PanicInfo>
    where
        F: FnOnce(),
    {
        let payload = match catch_unwind(AssertUnwindSafe(f)) {
            Ok(()) => return Ok(()),
            Err(payload) => payload,
        };

        let info = PanicInfo {
            worker,
            level,
            message: panic_message(payload.as_ref()),
        };

        match self.strategy {
            PanicStrategy::Abort => {
                tracing::error!(worker, level, panic = %info.message, "handler panicked, aborting");
                std::process::abort();
            }
            PanicStrategy::Isolate => {}
            PanicStrategy::LogAndContinue => {
                tracing::error!(worker, level, panic = %info.message, "handler panicked");
            }
        }

        Err(info)
    }

}

impl Default for PanicHandler {
    fn default() -> Self {
        Self::new(PanicStrategy::default())
    }
}
