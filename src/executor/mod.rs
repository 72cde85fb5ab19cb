//! Task execution infrastructure.
//!
//! This module provides the task manager, its worker threads, and the
//! per-task panic isolation around handler calls.

pub mod manager;
pub mod panic_handler;
pub mod task;
pub mod worker;

pub use manager::TaskManager;
pub use panic_handler::{PanicHandler, PanicInfo, PanicStrategy};
pub use task::{handler, Handler};
pub use worker::{WorkerId, WorkerStats};

pub(crate) use task::Task;
