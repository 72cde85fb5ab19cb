use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[cfg(feature = "telemetry")]
use hdrhistogram::Histogram;
#[cfg(feature = "telemetry")]
use parking_lot::Mutex;

// 1 hour in nanoseconds
#[cfg(feature = "telemetry")]
const MAX_TRACKED_NS: u64 = 3_600_000_000_000;

#[cfg(feature = "telemetry")]
fn new_histogram() -> Mutex<Histogram<u64>> {
    let histogram = Histogram::new_with_max(MAX_TRACKED_NS, 3)
        .expect("Failed to create histogram");
    Mutex::new(histogram)
}

/// Task manager metrics collector
#[derive(Debug)]
pub struct Metrics {
    tasks_submitted: AtomicU64,
    tasks_executed: AtomicU64,
    tasks_panicked: AtomicU64,
    empty_scans: AtomicU64,
    executed_per_level: Vec<AtomicU64>,
    panicked_per_level: Vec<AtomicU64>,

    #[cfg(feature = "telemetry")]
    exec_histogram: Mutex<Histogram<u64>>,
    #[cfg(feature = "telemetry")]
    wait_histogram: Mutex<Histogram<u64>>,

    start_time: Instant,
}

impl Metrics {
    pub fn new(levels: usize) -> Self {
        Self {
            tasks_submitted: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            empty_scans: AtomicU64::new(0),
            executed_per_level: (0..levels).map(|_| AtomicU64::new(0)).collect(),
            panicked_per_level: (0..levels).map(|_| AtomicU64::new(0)).collect(),
            #[cfg(feature = "telemetry")]
            exec_histogram: new_histogram(),
            #[cfg(feature = "telemetry")]
            wait_histogram: new_histogram(),
            start_time: Instant::now(),
        }
    }

    pub fn record_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished handler call; `wait` is enqueue to dequeue.
    pub fn record_execution(&self, level: usize, wait: Duration, exec: Duration) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
        if let Some(counter) = self.executed_per_level.get(level) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        #[cfg(feature = "telemetry")]
        {
            let _ = self.wait_histogram.lock().record(clamp_ns(wait));
            let _ = self.exec_histogram.lock().record(clamp_ns(exec));
        }
        #[cfg(not(feature = "telemetry"))]
        let _ = (wait, exec);
    }

    pub fn record_panic(&self, level: usize) {
        self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
        if let Some(counter) = self.panicked_per_level.get(level) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_empty_scan(&self) {
        self.empty_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        #[cfg_attr(not(feature = "telemetry"), allow(unused_mut))]
        let mut snapshot = MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
            empty_scans: self.empty_scans.load(Ordering::Relaxed),
            executed_per_level: self
                .executed_per_level
                .iter()
                .map(|c| c.load(Ordering::Relaxed))
                .collect(),
            panicked_per_level: self
                .panicked_per_level
                .iter()
                .map(|c| c.load(Ordering::Relaxed))
                .collect(),
            ..MetricsSnapshot::default()
        };

        #[cfg(feature = "telemetry")]
        {
            let exec = self.exec_histogram.lock();
            if exec.len() > 0 {
                snapshot.avg_exec_ns = exec.mean() as u64;
                snapshot.p50_exec_ns = exec.value_at_quantile(0.50);
                snapshot.p99_exec_ns = exec.value_at_quantile(0.99);
            }
            drop(exec);

            let wait = self.wait_histogram.lock();
            if wait.len() > 0 {
                snapshot.avg_wait_ns = wait.mean() as u64;
                snapshot.p50_wait_ns = wait.value_at_quantile(0.50);
                snapshot.p99_wait_ns = wait.value_at_quantile(0.99);
            }
        }

        snapshot
    }
}

#[cfg(feature = "telemetry")]
fn clamp_ns(d: Duration) -> u64 {
    (d.as_nanos() as u64).min(MAX_TRACKED_NS)
}

/// Point-in-time view of [`Metrics`]
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub tasks_submitted: u64,
    pub tasks_executed: u64,
    pub tasks_panicked: u64,
    pub empty_scans: u64,
    pub executed_per_level: Vec<u64>,
    pub panicked_per_level: Vec<u64>,
    pub avg_exec_ns: u64,
    pub p50_exec_ns: u64,
    pub p99_exec_ns: u64,
    pub avg_wait_ns: u64,
    pub p50_wait_ns: u64,
    pub p99_wait_ns: u64,
}

impl MetricsSnapshot {
    /// Tasks accepted but not yet finished
    pub fn in_flight(&self) -> u64 {
        self.tasks_submitted.saturating_sub(self.tasks_executed)
    }
}
