//! Runtime counters and latency histograms.
//!
//! Counters are always collected. Latency histograms need the `telemetry`
//! feature; without it the latency fields of a snapshot stay zero.

pub mod metrics;

pub use metrics::{Metrics, MetricsSnapshot};
