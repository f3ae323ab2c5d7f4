//! Pipeline driver: sequences walk, classify, hash, and emit phases
//!
//! The driver owns every channel between components and streams records to
//! a caller-provided sink as they become available: synthetic `size
//! changed` records right after classification, compare outcomes while the
//! worker pool drains, and left-only / right-only records at the end.
//!
//! Phase transitions are published through a shared atomic so the external
//! progress loop can follow along without locks.

use crate::classify::{self, Classified};
use crate::compare::ComparePool;
use crate::discovered::DiscoveredSet;
use crate::error::Result;
use crate::logger::RunLogger;
use crate::model::{CompareOutcome, DiffRecord, FileMeta, Side};
use crate::progress::{ProgressCounts, ProgressRecorder};
use crate::utilization::WorkerUtilization;
use crate::walker::Discoverer;
use crate::DiffConfig;
use crossbeam_channel::bounded;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Result channel capacity; a slow consumer throttles hashing through this
/// bound.
const RESULT_CHANNEL_CAPACITY: usize = 256;

/// Pipeline phases in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Idle = 0,
    Walking = 1,
    Classifying = 2,
    Hashing = 3,
    Emitting = 4,
    Done = 5,
}

impl Phase {
    fn from_u8(v: u8) -> Phase {
        match v {
            1 => Phase::Walking,
            2 => Phase::Classifying,
            3 => Phase::Hashing,
            4 => Phase::Emitting,
            5 => Phase::Done,
            _ => Phase::Idle,
        }
    }
}

/// Shared, lock-free view of the current phase
pub struct PhaseCell(AtomicU8);

impl PhaseCell {
    fn new() -> Self {
        Self(AtomicU8::new(Phase::Idle as u8))
    }

    fn set(&self, phase: Phase) {
        self.0.store(phase as u8, Ordering::SeqCst);
        debug!(phase = ?phase, "phase transition");
    }

    pub fn get(&self) -> Phase {
        Phase::from_u8(self.0.load(Ordering::SeqCst))
    }
}

/// Shared state the progress loop reads while the pipeline runs
#[derive(Clone)]
pub struct PipelineHandles {
    pub set: Arc<DiscoveredSet>,
    pub counts: Arc<ProgressCounts>,
    pub walk_utilization: Arc<WorkerUtilization>,
    pub compare_utilization: Arc<WorkerUtilization>,
    pub phase: Arc<PhaseCell>,
}

/// Final accounting for a completed run
#[derive(Debug)]
pub struct PipelineSummary {
    /// Pairs discovered on both sides
    pub total_pairs: u64,

    /// Pairs that went through the hash workers
    pub hashed_pairs: u64,

    /// Non-identical findings among pairs (including hash/stat errors)
    pub different: u64,

    /// Pairs found identical (fast-skip or verified)
    pub same: u64,

    pub left_only: u64,
    pub right_only: u64,

    /// Bytes submitted to the hashers (both sides of every hashed pair)
    pub bytes_hashed: u64,

    pub scan_duration: Duration,
    pub compare_duration: Duration,

    /// Identical-pair records; populated only with --show-same
    pub identical: Vec<DiffRecord>,
}

/// Drives one comparison run end to end
pub struct DiffPipeline {
    config: Arc<DiffConfig>,
    logger: Arc<RunLogger>,
    handles: PipelineHandles,
}

impl DiffPipeline {
    pub fn new(config: DiffConfig, logger: Arc<RunLogger>) -> Self {
        let handles = PipelineHandles {
            set: Arc::new(DiscoveredSet::new()),
            counts: Arc::new(ProgressCounts::new(config.workers)),
            walk_utilization: Arc::new(WorkerUtilization::new(
                config.workers,
                config.util_window_ticks,
            )),
            compare_utilization: Arc::new(WorkerUtilization::new(
                config.workers,
                config.util_window_ticks,
            )),
            phase: Arc::new(PhaseCell::new()),
        };
        Self {
            config: Arc::new(config),
            logger,
            handles,
        }
    }

    /// Shared state for an external progress loop.
    pub fn handles(&self) -> PipelineHandles {
        self.handles.clone()
    }

    /// Run the full pipeline, streaming every difference record to `sink`.
    /// Ordering follows production, not path order; consumers that need
    /// determinism sort afterwards.
    pub fn run(self, sink: &mut dyn FnMut(DiffRecord)) -> Result<PipelineSummary> {
        let config = &self.config;
        let set = &self.handles.set;
        let phase = &self.handles.phase;

        // Walk both trees, draining file events into the discovered set.
        phase.set(Phase::Walking);
        let walk_start = Instant::now();
        let (discoverer, events) = Discoverer::spawn(
            config,
            Arc::clone(&self.logger),
            Arc::clone(&self.handles.walk_utilization),
        )?;
        for event in events.iter() {
            set.add(&event.rel, event.side, event.meta);
        }
        let queue_stats = discoverer.queue_stats();
        discoverer.join();
        let scan_duration = walk_start.elapsed();
        info!(
            pairs = set.pair_count(),
            left_only = set.left_only_count(),
            right_only = set.right_only_count(),
            inline_dirs = queue_stats.inline_count(),
            elapsed_ms = scan_duration.as_millis() as u64,
            "walk complete"
        );

        // Partition pairs; size mismatches are findings already.
        phase.set(Phase::Classifying);
        let Classified {
            size_changed,
            need_hash,
            same_fast,
        } = classify::classify_pairs(set);

        let total_pairs = set.pair_count() as u64;
        let mut different: u64 = 0;
        let mut same: u64 = same_fast.len() as u64;
        let mut identical: Vec<DiffRecord> = Vec::new();

        for record in size_changed {
            self.logger
                .info(format!("diff: {} {}", record.rel, record.reason));
            different += 1;
            sink(record);
        }
        if config.show_same {
            for rel in same_fast {
                identical.push(DiffRecord::identical(
                    rel,
                    crate::model::reason::SAME_SIZE_MTIME,
                ));
            }
        }

        let hashed_pairs = need_hash.len() as u64;
        let bytes_hashed: u64 = need_hash
            .iter()
            .map(|job| job.cached.left.size + job.cached.right.size)
            .sum();
        self.handles
            .counts
            .total_pairs
            .store(hashed_pairs, Ordering::Relaxed);

        // Hash the residual pairs.
        phase.set(Phase::Hashing);
        let compare_start = Instant::now();
        if !need_hash.is_empty() {
            let recorder = Arc::new(ProgressRecorder::new(
                Arc::clone(&self.handles.counts),
                Arc::clone(&self.handles.compare_utilization),
            ));
            let (job_tx, job_rx) = bounded(config.workers * 2);
            let (result_tx, result_rx) = bounded(RESULT_CHANNEL_CAPACITY);
            let pool = ComparePool::spawn(config, job_rx, result_tx, Arc::clone(&recorder))?;

            let feeder = {
                let recorder = Arc::clone(&recorder);
                thread::spawn(move || {
                    for job in need_hash {
                        recorder.record_enqueue();
                        if job_tx.send(job).is_err() {
                            break;
                        }
                    }
                })
            };

            for outcome in result_rx.iter() {
                match outcome {
                    CompareOutcome::Identical { rel, why } => {
                        same += 1;
                        if config.show_same {
                            identical.push(DiffRecord::identical(rel, why));
                        }
                    }
                    CompareOutcome::Different(record) => {
                        if record.reason.starts_with("hash ") || record.reason.starts_with("stat ")
                        {
                            self.logger
                                .error(format!("{}: {}", record.rel, record.reason));
                        } else {
                            self.logger
                                .info(format!("diff: {} {}", record.rel, record.reason));
                        }
                        different += 1;
                        sink(record);
                    }
                }
            }
            let _ = feeder.join();
            pool.join();
        }
        let compare_duration = compare_start.elapsed();

        // Left-only / right-only records, re-statted for fresh metadata.
        phase.set(Phase::Emitting);
        let mut left_only: u64 = 0;
        for rel in set.left_only_paths() {
            if let Some(record) = finalize_single(config, Side::Left, rel) {
                left_only += 1;
                sink(record);
            }
        }
        let mut right_only: u64 = 0;
        for rel in set.right_only_paths() {
            if let Some(record) = finalize_single(config, Side::Right, rel) {
                right_only += 1;
                sink(record);
            }
        }

        phase.set(Phase::Done);
        self.logger.flush();

        Ok(PipelineSummary {
            total_pairs,
            hashed_pairs,
            different,
            same,
            left_only,
            right_only,
            bytes_hashed,
            scan_duration,
            compare_duration,
            identical,
        })
    }
}

/// Build the record for a single-sided path, or None when the path is no
/// longer a regular file (a race with concurrent filesystem changes, not an
/// error).
fn finalize_single(
    config: &DiffConfig,
    side: Side,
    rel: std::sync::Arc<str>,
) -> Option<DiffRecord> {
    let root = match side {
        Side::Left => &config.left_root,
        Side::Right => &config.right_root,
    };
    let path = crate::paths::resolve_under(root, rel.as_ref())?;
    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() => {
            Some(DiffRecord::only_on(side, rel, FileMeta::from_fs(&meta)))
        }
        _ => None,
    }
}
