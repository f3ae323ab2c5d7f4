//! Directory work queue for the parallel discoverer
//!
//! Walk workers are both producers and consumers of this queue, so a full
//! bounded channel must never block a push: `try_push` hands the job back to
//! the caller, which processes it inline. Outstanding work is tracked with
//! an atomic counter - incremented before a job becomes visible, decremented
//! after its directory is fully processed - so quiescence ("counter is zero
//! and the queue is empty") is distinguishable from "queue momentarily
//! empty".

use crate::model::Side;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A directory to list on one side of the comparison
#[derive(Debug, Clone)]
pub struct DirJob {
    /// Root of the tree this job belongs to
    pub root: Arc<PathBuf>,

    /// Directory relative to the root; empty string for the root itself
    pub rel_dir: String,

    /// Which tree this job walks
    pub side: Side,
}

impl DirJob {
    pub fn root_job(root: Arc<PathBuf>, side: Side) -> Self {
        Self {
            root,
            rel_dir: String::new(),
            side,
        }
    }

    /// Absolute path of this job's directory.
    pub fn abs_path(&self) -> PathBuf {
        if self.rel_dir.is_empty() {
            self.root.as_ref().clone()
        } else {
            self.root.join(&self.rel_dir)
        }
    }
}

/// Statistics for the directory queue
#[derive(Debug, Default)]
pub struct DirQueueStats {
    /// Jobs that went through the channel
    pub enqueued: AtomicU64,

    /// Jobs taken from the channel
    pub dequeued: AtomicU64,

    /// Jobs processed inline because the channel was full
    pub inline_processed: AtomicU64,
}

impl DirQueueStats {
    pub fn inline_count(&self) -> u64 {
        self.inline_processed.load(Ordering::Relaxed)
    }
}

/// Bounded directory queue with an outstanding-job counter
pub struct DirQueue {
    sender: Sender<DirJob>,
    receiver: Receiver<DirJob>,
    outstanding: Arc<AtomicUsize>,
    stats: Arc<DirQueueStats>,
}

impl DirQueue {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            outstanding: Arc::new(AtomicUsize::new(0)),
            stats: Arc::new(DirQueueStats::default()),
        }
    }

    /// Seed the queue with a root job before any worker starts.
    pub fn seed(&self, job: DirJob) -> Result<(), TrySendError<DirJob>> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        match self.sender.try_send(job) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.outstanding.fetch_sub(1, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    pub fn handle(&self) -> DirQueueHandle {
        DirQueueHandle {
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
            outstanding: Arc::clone(&self.outstanding),
            stats: Arc::clone(&self.stats),
        }
    }

    pub fn stats(&self) -> Arc<DirQueueStats> {
        Arc::clone(&self.stats)
    }
}

/// Per-worker handle combining the producer and consumer ends
#[derive(Clone)]
pub struct DirQueueHandle {
    sender: Sender<DirJob>,
    receiver: Receiver<DirJob>,
    outstanding: Arc<AtomicUsize>,
    stats: Arc<DirQueueStats>,
}

impl DirQueueHandle {
    /// Register a sub-job and try to enqueue it. Returns the job back when
    /// the channel is full; the caller MUST then process it synchronously.
    /// The outstanding counter is bumped either way, before the job is
    /// visible to any other worker.
    pub fn try_push(&self, job: DirJob) -> Option<DirJob> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        match self.sender.try_send(job) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(TrySendError::Full(job)) => {
                self.stats.inline_processed.fetch_add(1, Ordering::Relaxed);
                Some(job)
            }
            Err(TrySendError::Disconnected(job)) => {
                // Only possible after the queue itself is dropped; treat as
                // inline so the counter still reaches zero.
                self.stats.inline_processed.fetch_add(1, Ordering::Relaxed);
                Some(job)
            }
        }
    }

    /// Take the next job, waiting up to `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DirJob> {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(job)
            }
            Err(_) => None,
        }
    }

    /// Mark one job (taken from the queue or processed inline) as complete.
    pub fn job_done(&self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }

    /// True once every registered job has completed. Because jobs are
    /// counted before they become visible, a zero here means the walk has
    /// truly quiesced, not that the queue is momentarily empty.
    pub fn is_quiescent(&self) -> bool {
        self.outstanding.load(Ordering::SeqCst) == 0
    }
}
