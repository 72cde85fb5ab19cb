//! Priority scheduling.
//!
//! One bounded FIFO queue per priority level, scanned from the most urgent
//! level (0) to the least urgent (`max_priority`).

pub mod priority;

pub use priority::PriorityLevels;
