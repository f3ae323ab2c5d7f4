//! Progress accounting and display
//!
//! Workers never send progress events; they bump atomic counters and poke
//! the utilization tracker. A single ticker thread reads the counters and
//! renders an indicatif spinner, so worker throughput is decoupled from the
//! UI rate.

use crate::utilization::WorkerUtilization;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Atomic counters for the compare phase, read by the progress loop and the
/// final summary with plain loads
#[derive(Debug)]
pub struct ProgressCounts {
    /// Pair jobs handed to the compare pool
    pub enqueued: AtomicU64,

    /// Pair jobs fully processed
    pub processed: AtomicU64,

    /// Total pairs that will be compared; set before workers start
    pub total_pairs: AtomicU64,

    /// Unix nanos of the first enqueue; 0 until work starts
    pub start_time_ns: AtomicU64,

    /// Per-worker completion counts
    per_worker: Vec<AtomicU64>,
}

impl ProgressCounts {
    pub fn new(workers: usize) -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            total_pairs: AtomicU64::new(0),
            start_time_ns: AtomicU64::new(0),
            per_worker: (0..workers).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    pub fn worker_processed(&self, worker_index: usize) -> u64 {
        self.per_worker
            .get(worker_index)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Min and max per-worker completion counts, for the summary.
    pub fn worker_spread(&self) -> (u64, u64) {
        let mut min = u64::MAX;
        let mut max = 0;
        for counter in &self.per_worker {
            let v = counter.load(Ordering::Relaxed);
            min = min.min(v);
            max = max.max(v);
        }
        if min == u64::MAX {
            min = 0;
        }
        (min, max)
    }
}

/// Records compare-worker completions: bumps `processed`, the per-worker
/// counter when in range, and pokes the utilization tracker
pub struct ProgressRecorder {
    counts: Arc<ProgressCounts>,
    utilization: Arc<WorkerUtilization>,
}

impl ProgressRecorder {
    pub fn new(counts: Arc<ProgressCounts>, utilization: Arc<WorkerUtilization>) -> Self {
        Self {
            counts,
            utilization,
        }
    }

    /// Record that a pair job was enqueued; the first call stamps the
    /// compare start time.
    pub fn record_enqueue(&self) {
        self.counts.enqueued.fetch_add(1, Ordering::Relaxed);
        let now_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let _ = self.counts.start_time_ns.compare_exchange(
            0,
            now_ns,
            Ordering::Relaxed,
            Ordering::Relaxed,
        );
    }

    /// Record that `worker_index` completed one pair comparison.
    pub fn record_completion(&self, worker_index: usize) {
        self.counts.processed.fetch_add(1, Ordering::Relaxed);
        if let Some(counter) = self.counts.per_worker.get(worker_index) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        self.utilization.poke(worker_index);
    }

    pub fn counts(&self) -> &ProgressCounts {
        &self.counts
    }
}

/// Extrapolate remaining time from elapsed time and the processed/pending
/// ratio. Returns None when there is nothing to extrapolate from.
pub fn estimate_remaining(elapsed: Duration, processed: u64, pending: u64) -> Option<Duration> {
    if processed == 0 || pending == 0 {
        return None;
    }
    let per_pair = elapsed / processed as u32;
    Some(per_pair * pending as u32)
}

/// Spinner-based progress display for both phases
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        Self { bar }
    }

    /// Scan-phase message: pair count plus walker utilization.
    pub fn update_scanning(&self, pairs: usize, workers: usize, windowed: u32, lifetime: u32) {
        self.bar.set_message(format!(
            "Scanning: {} file pairs found ({} workers) [utilization window: {}%, total: {}%]",
            format_number(pairs as u64),
            workers,
            windowed,
            lifetime,
        ));
        self.bar.tick();
    }

    /// Compare-phase message: processed/total plus an ETA when available.
    pub fn update_comparing(
        &self,
        processed: u64,
        total: u64,
        remaining: Option<Duration>,
        workers: usize,
        windowed: u32,
        lifetime: u32,
    ) {
        let eta = match remaining {
            Some(d) => format!(", ~{}s remaining", d.as_secs().max(1)),
            None => String::new(),
        };
        self.bar.set_message(format!(
            "Comparing: {} of {}{} ({} workers) [utilization window: {}%, total: {}%]",
            format_number(processed),
            format_number(total),
            eta,
            workers,
            windowed,
            lifetime,
        ));
        self.bar.tick();
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header at the start of the run
pub fn print_header(left: &str, right: &str, workers: usize, hash: &str) {
    eprintln!();
    eprintln!(
        "{} {}",
        style("ffd").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Left:").bold(), left);
    eprintln!("  {} {}", style("Right:").bold(), right);
    eprintln!("  {} {}", style("Workers:").bold(), workers);
    eprintln!("  {} {}", style("Hash:").bold(), hash);
    eprintln!();
}

/// Print the final summary of a completed run
#[allow(clippy::too_many_arguments)]
pub fn print_summary(
    total_compared: u64,
    left_only: u64,
    right_only: u64,
    different: u64,
    same: u64,
    bytes_hashed: u64,
    scan_duration: Duration,
    compare_duration: Duration,
    total_elapsed: Duration,
    workers_utilized_percent: u32,
) {
    let avg = if total_compared > 0 {
        total_elapsed / total_compared as u32
    } else {
        Duration::ZERO
    };

    eprintln!();
    eprintln!("{}", style("Summary").green().bold());
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!(
        "  {} {}",
        style("Total files compared:").bold(),
        format_number(total_compared)
    );
    eprintln!(
        "  {} {}",
        style("Files only on left:").bold(),
        format_number(left_only)
    );
    eprintln!(
        "  {} {}",
        style("Files only on right:").bold(),
        format_number(right_only)
    );
    eprintln!(
        "  {} {}",
        style("Files different:").bold(),
        format_number(different)
    );
    eprintln!(
        "  {} {}",
        style("Files same:").bold(),
        format_number(same)
    );
    if bytes_hashed > 0 {
        eprintln!(
            "  {} {}",
            style("Bytes hashed:").bold(),
            format_size(bytes_hashed, BINARY)
        );
    }
    eprintln!(
        "  {} {:.3}s",
        style("Scanning:").bold(),
        scan_duration.as_secs_f64()
    );
    eprintln!(
        "  {} {:.3}s",
        style("Comparing:").bold(),
        compare_duration.as_secs_f64()
    );
    eprintln!(
        "  {} {:.3}s",
        style("Total time:").bold(),
        total_elapsed.as_secs_f64()
    );
    eprintln!(
        "  {} {:?}",
        style("Average per comparison:").bold(),
        avg
    );
    eprintln!(
        "  {} {}%",
        style("Workers utilized:").bold(),
        workers_utilized_percent
    );
    eprintln!();
}
