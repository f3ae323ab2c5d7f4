//! Per-worker activity tracking with a sliding window
//!
//! Workers call `poke(worker_index)` whenever they do a unit of work - a
//! lock-free counter bump. The progress loop calls `tick()` on a fixed
//! interval; each tick snapshots the counters into a bounded ring and
//! reports what percentage of workers did at least one unit of work since
//! the oldest snapshot in the window.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub struct WorkerUtilization {
    hits: Vec<AtomicU64>,
    window: Mutex<SnapshotWindow>,
}

struct SnapshotWindow {
    history: VecDeque<Vec<u64>>,
    window_ticks: usize,
}

impl WorkerUtilization {
    /// Create a tracker for `workers` workers keeping `window_ticks`
    /// snapshots (e.g. 30 ticks ≈ 3 seconds at a 100ms tick).
    pub fn new(workers: usize, window_ticks: usize) -> Self {
        let workers = workers.max(1);
        let window_ticks = window_ticks.max(1);
        Self {
            hits: (0..workers).map(|_| AtomicU64::new(0)).collect(),
            window: Mutex::new(SnapshotWindow {
                history: VecDeque::with_capacity(window_ticks + 1),
                window_ticks,
            }),
        }
    }

    /// Record one unit of work for a worker. Lock-free; out-of-range
    /// indices are ignored.
    pub fn poke(&self, worker_index: usize) {
        if let Some(counter) = self.hits.get(worker_index) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Snapshot the counters, append to the window, and return the
    /// percentage of workers active within the window, rounded up to a
    /// whole percent. With fewer than two snapshots the fallback is the
    /// percentage of workers with any activity since start. Call from a
    /// single thread (the progress loop).
    pub fn tick(&self) -> u32 {
        let current: Vec<u64> = self
            .hits
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect();

        let mut window = self.window.lock().expect("utilization window poisoned");
        window.history.push_back(current.clone());
        if window.history.len() > window.window_ticks {
            window.history.pop_front();
        }

        let active = if window.history.len() >= 2 {
            let oldest = &window.history[0];
            current
                .iter()
                .zip(oldest.iter())
                .filter(|(now, then)| now > then)
                .count()
        } else {
            current.iter().filter(|c| **c > 0).count()
        };
        percent_ceil(active, self.hits.len())
    }

    /// Percentage of workers with at least one poke over the whole run,
    /// rounded up to a whole percent. Monotonically non-decreasing.
    pub fn utilized_percent_whole_run(&self) -> u32 {
        let active = self
            .hits
            .iter()
            .filter(|c| c.load(Ordering::Relaxed) > 0)
            .count();
        percent_ceil(active, self.hits.len())
    }

    pub fn worker_count(&self) -> usize {
        self.hits.len()
    }
}

fn percent_ceil(active: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((active * 100 + total - 1) / total) as u32
}
