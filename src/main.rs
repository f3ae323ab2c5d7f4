//! ffd - Fast File Diff
//!
//! Entry point for the CLI application. Owns exit-code mapping, the
//! progress loop, report rendering, and the final summary; the comparison
//! itself lives in the library's pipeline.

use clap::error::ErrorKind;
use clap::Parser;
use ffd::config::{CliArgs, DiffConfig};
use ffd::logger::RunLogger;
use ffd::output;
use ffd::paths::ensure_dir;
use ffd::pipeline::{DiffPipeline, Phase, PipelineHandles};
use ffd::progress::{
    estimate_remaining, print_header, print_summary, ProgressReporter,
};
use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: u8 = 0;
const EXIT_USAGE: u8 = 1;
const EXIT_FATAL: u8 = 2;
const EXIT_NON_FATAL: u8 = 3;

fn main() -> ExitCode {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_USAGE,
            };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    setup_logging(args.verbose);

    let config = match DiffConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match run(config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(config: DiffConfig) -> anyhow::Result<ExitCode> {
    // Root validation and logger creation are the fatal setup phase; fail
    // here and nothing has started yet.
    if let Err(e) = ensure_dir("left", &config.left_root) {
        eprintln!("{}", e);
        return Ok(ExitCode::from(EXIT_FATAL));
    }
    if let Err(e) = ensure_dir("right", &config.right_root) {
        eprintln!("{}", e);
        return Ok(ExitCode::from(EXIT_FATAL));
    }
    let logger = match RunLogger::create() {
        Ok(logger) => Arc::new(logger),
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::from(EXIT_FATAL));
        }
    };
    logger.info("started comparison");

    if !config.quiet {
        print_header(
            &config.left_root.display().to_string(),
            &config.right_root.display().to_string(),
            config.workers,
            config.hash.as_str(),
        );
    }

    let total_start = Instant::now();
    let pipeline = DiffPipeline::new(config.clone(), Arc::clone(&logger));
    let handles = pipeline.handles();

    let stop = Arc::new(AtomicBool::new(false));
    let ui = if config.quiet {
        None
    } else {
        Some(spawn_progress_loop(
            handles.clone(),
            config.workers,
            Arc::clone(&stop),
        ))
    };

    let mut records = Vec::new();
    let summary = pipeline.run(&mut |record| records.push(record))?;

    stop.store(true, Ordering::SeqCst);
    if let Some(ui) = ui {
        let _ = ui.join();
    }

    // Render once, then send the same bytes to stdout and the main log.
    let mut identical = summary.identical.clone();
    let mut rendered = Vec::new();
    output::write_report(config.format, &mut records, &mut identical, &mut rendered)?;
    std::io::stdout().write_all(&rendered)?;
    let report_text = String::from_utf8_lossy(&rendered);
    if !report_text.trim().is_empty() {
        logger.info(report_text.trim_end().to_string());
    }

    if !config.quiet {
        print_summary(
            summary.total_pairs,
            summary.left_only,
            summary.right_only,
            summary.different,
            summary.same,
            summary.bytes_hashed,
            summary.scan_duration,
            summary.compare_duration,
            total_start.elapsed(),
            handles.compare_utilization.utilized_percent_whole_run(),
        );
        logger.print_log_paths();
    }

    logger.flush();
    let errors = logger.error_count();
    logger.close();

    if errors > 0 {
        if !config.quiet {
            eprintln!("Errors occurred; check the error log for details.");
        }
        return Ok(ExitCode::from(EXIT_NON_FATAL));
    }
    Ok(ExitCode::from(EXIT_SUCCESS))
}

/// Ticker thread: reads the shared counters every 100ms and renders the
/// phase-appropriate message. Workers never touch the UI.
fn spawn_progress_loop(
    handles: PipelineHandles,
    workers: usize,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let reporter = ProgressReporter::new();
        while !stop.load(Ordering::SeqCst) {
            match handles.phase.get() {
                Phase::Walking => {
                    let windowed = handles.walk_utilization.tick();
                    let lifetime = handles.walk_utilization.utilized_percent_whole_run();
                    reporter.update_scanning(
                        handles.set.pair_count(),
                        workers,
                        windowed,
                        lifetime,
                    );
                }
                Phase::Hashing => {
                    let processed = handles.counts.processed.load(Ordering::Relaxed);
                    let total = handles.counts.total_pairs.load(Ordering::Relaxed);
                    let windowed = handles.compare_utilization.tick();
                    let lifetime = handles.compare_utilization.utilized_percent_whole_run();
                    let remaining = compare_eta(&handles, processed, total);
                    reporter.update_comparing(
                        processed, total, remaining, workers, windowed, lifetime,
                    );
                }
                Phase::Done => break,
                _ => {}
            }
            thread::sleep(Duration::from_millis(100));
        }
        reporter.finish_and_clear();
    })
}

fn compare_eta(handles: &PipelineHandles, processed: u64, total: u64) -> Option<Duration> {
    let start_ns = handles.counts.start_time_ns.load(Ordering::Relaxed);
    if start_ns == 0 {
        return None;
    }
    let now_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let elapsed = Duration::from_nanos(now_ns.saturating_sub(start_ns));
    estimate_remaining(elapsed, processed, total.saturating_sub(processed))
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ffd=debug")
    } else {
        EnvFilter::new("ffd=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
