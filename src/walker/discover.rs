//! Parallel discoverer: walks both trees through the shared directory queue
//!
//! N worker threads take directory jobs, list them, push a sub-job per child
//! directory and emit a file event per regular file. Workers feed the queue
//! they consume from, so a full queue makes the pushing worker walk the
//! sub-directory inline instead of blocking (see `walker::queue`). The file
//! event channel closes once every worker has exited.

use crate::error::WorkerError;
use crate::logger::RunLogger;
use crate::model::{FileMeta, Side};
use crate::utilization::WorkerUtilization;
use crate::walker::list::{self, ListedEntry};
use crate::walker::queue::{DirJob, DirQueue, DirQueueHandle, DirQueueStats};
use crate::DiffConfig;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Poll interval while waiting for work; the quiescence counter is checked
/// after each timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One regular file observed during the walk
#[derive(Debug, Clone)]
pub struct FileEvent {
    /// Path relative to the side's root, forward-slash separated
    pub rel: String,

    /// Which tree it was seen on
    pub side: Side,

    /// Walk-time size and truncated mtime
    pub meta: FileMeta,
}

/// Handle over the running walk workers
pub struct Discoverer {
    workers: Vec<JoinHandle<()>>,
    stats: Arc<DirQueueStats>,
}

impl Discoverer {
    /// Spawn the walk workers over both roots. File events arrive on the
    /// returned channel, which disconnects when the walk has quiesced and
    /// every worker has exited.
    pub fn spawn(
        config: &DiffConfig,
        logger: Arc<RunLogger>,
        utilization: Arc<WorkerUtilization>,
    ) -> Result<(Discoverer, Receiver<FileEvent>), WorkerError> {
        let queue = DirQueue::new(config.workers * 4);
        let left_root = Arc::new(config.left_root.clone());
        let right_root = Arc::new(config.right_root.clone());
        for job in [
            DirJob::root_job(left_root, Side::Left),
            DirJob::root_job(right_root, Side::Right),
        ] {
            queue.seed(job).map_err(|_| WorkerError::SpawnFailed {
                id: 0,
                reason: "directory queue rejected a root job".into(),
            })?;
        }

        let (event_tx, event_rx) = unbounded();
        let stats = queue.stats();

        let mut workers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let handle = queue.handle();
            let events = event_tx.clone();
            let logger = Arc::clone(&logger);
            let utilization = Arc::clone(&utilization);
            let batch = config.dir_batch_size;

            let join = thread::Builder::new()
                .name(format!("walk-{}", id))
                .spawn(move || {
                    worker_loop(id, handle, events, logger, utilization, batch);
                })
                .map_err(|e| WorkerError::SpawnFailed {
                    id,
                    reason: e.to_string(),
                })?;
            workers.push(join);
        }
        // Workers hold the only remaining event senders; the channel
        // disconnects when the last worker exits.
        drop(event_tx);

        Ok((Discoverer { workers, stats }, event_rx))
    }

    /// Wait for every worker to exit.
    pub fn join(self) {
        for worker in self.workers {
            if worker.join().is_err() {
                warn!("walk worker panicked");
            }
        }
    }

    /// Queue statistics for diagnostics; stable once the walk quiesces.
    pub fn queue_stats(&self) -> Arc<DirQueueStats> {
        Arc::clone(&self.stats)
    }
}

fn worker_loop(
    id: usize,
    handle: DirQueueHandle,
    events: Sender<FileEvent>,
    logger: Arc<RunLogger>,
    utilization: Arc<WorkerUtilization>,
    batch: usize,
) {
    debug!(worker = id, "walk worker starting");
    loop {
        match handle.recv_timeout(POLL_INTERVAL) {
            Some(job) => process_dir_job(id, job, &handle, &events, &logger, &utilization, batch),
            None => {
                if handle.is_quiescent() {
                    break;
                }
            }
        }
    }
    debug!(worker = id, "walk worker exiting");
}

/// List one directory, emit its files, enqueue its subdirectories.
///
/// Called recursively when `try_push` bounces a sub-job off the full queue.
/// Pokes the utilization tracker at the start of the job and once per entry
/// so large directories do not read as idle workers.
fn process_dir_job(
    id: usize,
    job: DirJob,
    handle: &DirQueueHandle,
    events: &Sender<FileEvent>,
    logger: &Arc<RunLogger>,
    utilization: &Arc<WorkerUtilization>,
    batch: usize,
) {
    utilization.poke(id);
    let abs = job.abs_path();
    let entries = match list::list_directory(&abs, batch) {
        Ok(entries) => entries,
        Err(e) => {
            // The subtree is abandoned; other workers continue.
            warn!(worker = id, path = %abs.display(), error = %e, "directory listing failed");
            logger.error(format!("read dir {}: {}", abs.display(), e));
            handle.job_done();
            return;
        }
    };

    for entry in entries {
        utilization.poke(id);
        match entry {
            ListedEntry::Dir { name } => {
                let sub = DirJob {
                    root: Arc::clone(&job.root),
                    rel_dir: join_rel(&job.rel_dir, &name),
                    side: job.side,
                };
                if let Some(inline) = handle.try_push(sub) {
                    trace!(worker = id, dir = %inline.rel_dir, "queue full, walking inline");
                    process_dir_job(id, inline, handle, events, logger, utilization, batch);
                }
            }
            ListedEntry::File { name, meta } => {
                let event = FileEvent {
                    rel: join_rel(&job.rel_dir, &name),
                    side: job.side,
                    meta,
                };
                // The drainer outlives the walk; a send failure means the
                // run is being torn down.
                let _ = events.send(event);
            }
        }
    }
    handle.job_done();
}

fn join_rel(rel_dir: &str, name: &str) -> String {
    if rel_dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", rel_dir, name)
    }
}
