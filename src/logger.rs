//! Per-run log files behind a single writer thread
//!
//! Each run creates a directory under the system temp dir holding a main
//! log and a separate error log. One worker thread owns both files and
//! processes requests from a channel; callers block until their write is
//! acknowledged, so the interleave of info and error lines in the main log
//! is exactly the order they were reported.
//!
//! Info lines are buffered and written out at a 10 MiB threshold; error
//! lines flush the buffer first so ordering survives the buffering.

use crate::error::SetupError;
use chrono::Local;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

/// Buffered main-log bytes at which the buffer is written and synced
const MAIN_FLUSH_THRESHOLD: usize = 10 * 1024 * 1024;

enum LogRequest {
    Info(String, Sender<()>),
    Error(String, Sender<()>),
    ErrorCount(Sender<u64>),
    Flush(Sender<()>),
    Close(Sender<()>),
}

/// Append-only run logger; see module docs
pub struct RunLogger {
    requests: Sender<LogRequest>,
    dir: PathBuf,
    main_path: PathBuf,
    error_path: PathBuf,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RunLogger {
    /// Create the log directory and both files, and start the writer
    /// thread. Failure here is a fatal setup error (exit code 2).
    pub fn create() -> Result<Self, SetupError> {
        let date = Local::now().format("%Y%m%d");
        let base = std::env::temp_dir();
        // Distinguish concurrent runs by pid.
        let dir = base.join(format!("ffd-{}-{}", date, std::process::id()));
        std::fs::create_dir_all(&dir).map_err(|e| SetupError::LoggerCreate {
            reason: format!("create {}: {}", dir.display(), e),
        })?;

        let main_path = dir.join(format!("ffd-{}-main.log", date));
        let error_path = dir.join(format!("ffd-{}-errors.log", date));
        let main_file = File::create(&main_path).map_err(|e| SetupError::LoggerCreate {
            reason: format!("create {}: {}", main_path.display(), e),
        })?;
        let error_file = File::create(&error_path).map_err(|e| SetupError::LoggerCreate {
            reason: format!("create {}: {}", error_path.display(), e),
        })?;

        let (requests, receiver) = unbounded();
        let worker = thread::Builder::new()
            .name("run-logger".into())
            .spawn(move || writer_loop(receiver, main_file, error_file))
            .map_err(|e| SetupError::LoggerCreate {
                reason: format!("spawn writer thread: {}", e),
            })?;

        Ok(Self {
            requests,
            dir,
            main_path,
            error_path,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Append a line to the main log; blocks until acknowledged.
    pub fn info(&self, line: impl Into<String>) {
        self.roundtrip(|ack| LogRequest::Info(line.into(), ack));
    }

    /// Record an error: written to both logs, bumps the error counter.
    pub fn error(&self, message: impl Into<String>) {
        self.roundtrip(|ack| LogRequest::Error(message.into(), ack));
    }

    /// How many errors have been recorded so far.
    pub fn error_count(&self) -> u64 {
        let (tx, rx) = bounded(1);
        if self.requests.send(LogRequest::ErrorCount(tx)).is_err() {
            return 0;
        }
        rx.recv().unwrap_or(0)
    }

    /// Write and sync any buffered main-log lines.
    pub fn flush(&self) {
        self.roundtrip(LogRequest::Flush);
    }

    /// Flush and close both files. Idempotent; later calls are no-ops, as
    /// are info/error calls after close.
    pub fn close(&self) {
        self.roundtrip(LogRequest::Close);
        let handle = self.worker.lock().expect("logger handle poisoned").take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn main_log_path(&self) -> &PathBuf {
        &self.main_path
    }

    pub fn error_log_path(&self) -> &PathBuf {
        &self.error_path
    }

    /// Print both log paths to stderr so users know where to look.
    pub fn print_log_paths(&self) {
        eprintln!("Main log: {}", self.main_path.display());
        eprintln!("Error log: {}", self.error_path.display());
    }

    fn roundtrip(&self, make: impl FnOnce(Sender<()>) -> LogRequest) {
        let (ack_tx, ack_rx) = bounded(1);
        // A closed logger drops the receiver; both sends become no-ops.
        if self.requests.send(make(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

fn writer_loop(receiver: Receiver<LogRequest>, mut main_file: File, mut error_file: File) {
    let mut buffer: Vec<u8> = Vec::new();
    let mut error_count: u64 = 0;

    let flush_main = |buffer: &mut Vec<u8>, main_file: &mut File| {
        if !buffer.is_empty() {
            let _ = main_file.write_all(buffer);
            let _ = main_file.sync_all();
            buffer.clear();
        }
    };

    for request in receiver.iter() {
        match request {
            LogRequest::Info(line, ack) => {
                buffer.extend_from_slice(line.as_bytes());
                buffer.push(b'\n');
                if buffer.len() >= MAIN_FLUSH_THRESHOLD {
                    flush_main(&mut buffer, &mut main_file);
                }
                let _ = ack.send(());
            }
            LogRequest::Error(message, ack) => {
                error_count += 1;
                // Flush buffered info lines first so the error lands in
                // order in the main log.
                flush_main(&mut buffer, &mut main_file);
                let _ = writeln!(main_file, "error: {}", message);
                let _ = main_file.sync_all();
                let _ = writeln!(error_file, "{}", message);
                let _ = error_file.sync_all();
                let _ = ack.send(());
            }
            LogRequest::ErrorCount(resp) => {
                let _ = resp.send(error_count);
            }
            LogRequest::Flush(ack) => {
                flush_main(&mut buffer, &mut main_file);
                let _ = ack.send(());
            }
            LogRequest::Close(ack) => {
                flush_main(&mut buffer, &mut main_file);
                let _ = ack.send(());
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_and_error_ordering() {
        let logger = RunLogger::create().unwrap();
        logger.info("first");
        logger.error("boom");
        logger.info("second");
        logger.flush();

        let main = std::fs::read_to_string(logger.main_log_path()).unwrap();
        let lines: Vec<&str> = main.lines().collect();
        assert_eq!(lines, vec!["first", "error: boom", "second"]);

        let errors = std::fs::read_to_string(logger.error_log_path()).unwrap();
        assert_eq!(errors.trim(), "boom");

        logger.close();
        let _ = std::fs::remove_dir_all(logger.dir());
    }

    #[test]
    fn test_error_count() {
        let logger = RunLogger::create().unwrap();
        assert_eq!(logger.error_count(), 0);
        logger.error("one");
        logger.error("two");
        assert_eq!(logger.error_count(), 2);
        logger.close();
        let _ = std::fs::remove_dir_all(logger.dir());
    }

    #[test]
    fn test_close_is_idempotent() {
        let logger = RunLogger::create().unwrap();
        logger.info("line");
        logger.close();
        logger.close();
        // Logging after close is a silent no-op.
        logger.info("dropped");
        logger.error("dropped too");
        assert_eq!(logger.error_count(), 0);

        let main = std::fs::read_to_string(logger.main_log_path()).unwrap();
        assert_eq!(main.trim(), "line");
        let _ = std::fs::remove_dir_all(logger.dir());
    }

    #[test]
    fn test_concurrent_writers() {
        use std::sync::Arc;

        let logger = Arc::new(RunLogger::create().unwrap());
        let mut handles = Vec::new();
        for t in 0..4 {
            let logger = Arc::clone(&logger);
            handles.push(thread::spawn(move || {
                for i in 0..25 {
                    logger.info(format!("t{} line {}", t, i));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        logger.flush();

        let main = std::fs::read_to_string(logger.main_log_path()).unwrap();
        assert_eq!(main.lines().count(), 100);
        logger.close();
        let _ = std::fs::remove_dir_all(logger.dir());
    }
}
