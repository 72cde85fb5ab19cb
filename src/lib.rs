//! Bounded, priority-ordered task scheduling on a fixed worker pool.
//!
//! Producers push payloads tagged with an integer priority; a fixed set of
//! worker threads repeatedly takes the most urgent pending payload and runs
//! it through one shared handler.
//!
//! # Quick Start
//!
//! ```no_run
//! use priority_tasks::prelude::*;
//!
//! let manager = TaskManager::new(4, 2, 64, Some(handler(|job: String| {
//!     println!("running {}", job);
//! })));
//!
//! manager.push_task(0, "urgent".to_string());
//! manager.push_task(2, "whenever".to_string());
//!
//! manager.shutdown().unwrap();
//! ```
//!
//! # Scheduling
//!
//! - **Strict priority**: level 0 always runs before level 1 when both have
//!   work. Sustained urgent traffic can starve lower levels.
//! - **FIFO per level**: tasks at the same level run in push order.
//! - **Backpressure**: each level holds at most `max_pending_tasks`, and the
//!   total across all levels is capped by the same number. `push_task`
//!   blocks instead of rejecting.
//! - **Panic isolation**: a panicking handler call is caught and the worker
//!   keeps going (see [`PanicStrategy`]).
//!
//! Out-of-range priorities are clamped and out-of-range limits are coerced,
//! so neither construction nor submission reports errors.

#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod scheduler;
pub mod telemetry;
pub mod util;

// Re-export key types at crate root
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use executor::{handler, Handler, PanicStrategy, TaskManager};
pub use telemetry::MetricsSnapshot;
