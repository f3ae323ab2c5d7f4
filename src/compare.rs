//! Compare worker pool: hash-based verification of residual pairs
//!
//! N worker threads draw pair jobs from a bounded channel, re-check each
//! pair with fresh stats (the filesystem may have changed since the walk),
//! hash both sides when still needed, and stream outcomes to the driver.
//! The result channel is bounded, so a slow consumer naturally throttles
//! hashing. It closes when all workers have exited.

use crate::config::HashAlgorithm;
use crate::error::WorkerError;
use crate::hash;
use crate::model::{
    reason, CompareOutcome, DiffRecord, FileMeta, PairInfo, PairJob,
};
use crate::progress::ProgressRecorder;
use crate::DiffConfig;
use crossbeam_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Handle over the running compare workers
pub struct ComparePool {
    workers: Vec<JoinHandle<()>>,
}

impl ComparePool {
    /// Spawn `config.workers` compare threads. Outcomes arrive on
    /// `results`; the channel disconnects once every worker is done.
    pub fn spawn(
        config: &DiffConfig,
        jobs: Receiver<PairJob>,
        results: Sender<CompareOutcome>,
        recorder: Arc<ProgressRecorder>,
    ) -> Result<ComparePool, WorkerError> {
        let mut workers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let jobs = jobs.clone();
            let results = results.clone();
            let recorder = Arc::clone(&recorder);
            let left_root = config.left_root.clone();
            let right_root = config.right_root.clone();
            let algorithm = config.hash;
            let threshold = config.hash_threshold;

            let join = thread::Builder::new()
                .name(format!("compare-{}", id))
                .spawn(move || {
                    worker_loop(
                        id, jobs, results, recorder, left_root, right_root, algorithm, threshold,
                    );
                })
                .map_err(|e| WorkerError::SpawnFailed {
                    id,
                    reason: e.to_string(),
                })?;
            workers.push(join);
        }
        Ok(ComparePool { workers })
    }

    /// Wait for every worker to exit.
    pub fn join(self) {
        for worker in self.workers {
            if worker.join().is_err() {
                warn!("compare worker panicked");
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    id: usize,
    jobs: Receiver<PairJob>,
    results: Sender<CompareOutcome>,
    recorder: Arc<ProgressRecorder>,
    left_root: PathBuf,
    right_root: PathBuf,
    algorithm: HashAlgorithm,
    threshold: usize,
) {
    debug!(worker = id, "compare worker starting");
    for job in jobs.iter() {
        let outcome = compare_pair(&left_root, &right_root, &job, algorithm, threshold);
        if results.send(outcome).is_err() {
            // Driver went away; nothing left to report to.
            break;
        }
        recorder.record_completion(id);
    }
    debug!(worker = id, "compare worker exiting");
}

/// Compare one pair end to end.
///
/// Fresh stats guard against files that changed between walk and compare:
/// a stat failure becomes a `stat left:`/`stat right:` record, a new size
/// difference becomes `size changed`, and mtimes that now match fast-skip.
/// Only pairs still in the "equal size, differing mtime" state get hashed.
fn compare_pair(
    left_root: &Path,
    right_root: &Path,
    job: &PairJob,
    algorithm: HashAlgorithm,
    threshold: usize,
) -> CompareOutcome {
    let rel = Arc::clone(&job.rel);
    let left_path = left_root.join(rel.as_ref());
    let right_path = right_root.join(rel.as_ref());

    let left_meta = match std::fs::metadata(&left_path) {
        Ok(m) => FileMeta::from_fs(&m),
        Err(e) => {
            return CompareOutcome::Different(DiffRecord::pair_error(
                rel,
                format!("{}{}", reason::STAT_LEFT_PREFIX, e),
                &job.cached,
            ));
        }
    };
    let right_meta = match std::fs::metadata(&right_path) {
        Ok(m) => FileMeta::from_fs(&m),
        Err(e) => {
            return CompareOutcome::Different(DiffRecord::pair_error(
                rel,
                format!("{}{}", reason::STAT_RIGHT_PREFIX, e),
                &job.cached,
            ));
        }
    };

    let fresh = PairInfo {
        left: left_meta,
        right: right_meta,
    };
    if left_meta.size != right_meta.size {
        return CompareOutcome::Different(DiffRecord::size_changed(rel, &fresh));
    }
    if left_meta.mtime == right_meta.mtime {
        return CompareOutcome::Identical {
            rel,
            why: reason::SAME_SIZE_MTIME,
        };
    }

    let left_hash = match hash::hash_file(&left_path, algorithm, threshold) {
        Ok(h) => h,
        Err(e) => {
            return CompareOutcome::Different(DiffRecord::pair_error(
                rel,
                format!("{}{}", reason::HASH_LEFT_PREFIX, e),
                &fresh,
            ));
        }
    };
    let right_hash = match hash::hash_file(&right_path, algorithm, threshold) {
        Ok(h) => h,
        Err(e) => {
            return CompareOutcome::Different(DiffRecord::pair_error(
                rel,
                format!("{}{}", reason::HASH_RIGHT_PREFIX, e),
                &fresh,
            ));
        }
    };

    if left_hash == right_hash {
        CompareOutcome::Identical {
            rel,
            why: reason::SAME_HASH,
        }
    } else {
        CompareOutcome::Different(DiffRecord::content_differs(
            rel, &fresh, left_hash, right_hash,
        ))
    }
}
