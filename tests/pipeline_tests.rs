//! End-to-end pipeline tests over real directory trees
//!
//! Each test builds two scratch trees with controlled contents and mtimes,
//! runs the full pipeline, and checks the emitted records and summary.

use ffd::config::{DiffConfig, HashAlgorithm, OutputFormat};
use ffd::logger::RunLogger;
use ffd::model::DiffRecord;
use ffd::pipeline::{DiffPipeline, PipelineSummary};
use std::fs::{self, File};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

fn test_config(left: &Path, right: &Path) -> DiffConfig {
    DiffConfig {
        left_root: left.to_path_buf(),
        right_root: right.to_path_buf(),
        workers: 4,
        dir_batch_size: 4096,
        hash: HashAlgorithm::Xxhash,
        hash_threshold: 10 * 1024 * 1024,
        format: OutputFormat::Text,
        util_window_ticks: 30,
        show_same: false,
        quiet: true,
    }
}

/// Create a file with explicit contents and mtime (truncated seconds).
fn put_file(root: &Path, rel: &str, contents: &[u8], mtime_secs: u64) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    let file = File::options().write(true).open(&path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(mtime_secs))
        .unwrap();
}

fn run_diff(config: DiffConfig) -> (Vec<DiffRecord>, PipelineSummary) {
    let logger = Arc::new(RunLogger::create().unwrap());
    let pipeline = DiffPipeline::new(config, Arc::clone(&logger));
    let mut records = Vec::new();
    let summary = pipeline.run(&mut |rec| records.push(rec)).unwrap();
    logger.close();
    let _ = fs::remove_dir_all(logger.dir());
    (records, summary)
}

#[test]
fn identical_trees_emit_nothing() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    put_file(left.path(), "a", b"x", 1_000_000);
    put_file(left.path(), "b/c", b"yy", 1_000_000);
    put_file(right.path(), "a", b"x", 1_000_000);
    put_file(right.path(), "b/c", b"yy", 1_000_000);

    let (records, summary) = run_diff(test_config(left.path(), right.path()));

    assert!(records.is_empty(), "unexpected records: {:?}", records);
    assert_eq!(summary.total_pairs, 2);
    assert_eq!(summary.different, 0);
    assert_eq!(summary.same, 2);
    assert_eq!(summary.hashed_pairs, 0);
}

#[test]
fn size_difference_reported_without_hashing() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    put_file(left.path(), "a", b"xy", 1_000_000);
    put_file(right.path(), "a", b"xyz", 1_000_000);

    let (records, summary) = run_diff(test_config(left.path(), right.path()));

    assert_eq!(records.len(), 1);
    let rec = &records[0];
    assert_eq!(rec.rel.as_ref(), "a");
    assert_eq!(rec.reason, "size changed");
    assert_eq!(rec.left_size, Some(2));
    assert_eq!(rec.right_size, Some(3));
    assert!(rec.left_hash.is_none());
    assert!(rec.right_hash.is_none());
    assert_eq!(summary.hashed_pairs, 0);
    assert_eq!(summary.different, 1);
}

#[test]
fn content_difference_reported_with_hashes() {
    for (algorithm, hex_len) in [
        (HashAlgorithm::Xxhash, 16),
        (HashAlgorithm::Sha256, 64),
        (HashAlgorithm::Md5, 32),
    ] {
        let left = tempfile::tempdir().unwrap();
        let right = tempfile::tempdir().unwrap();
        put_file(left.path(), "a", b"hello", 1_000_000);
        put_file(right.path(), "a", b"world", 2_000_000);

        let mut config = test_config(left.path(), right.path());
        config.hash = algorithm;
        let (records, summary) = run_diff(config);

        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.reason, "content differs");
        let left_hash = rec.left_hash.as_deref().unwrap();
        let right_hash = rec.right_hash.as_deref().unwrap();
        assert_ne!(left_hash, right_hash);
        assert_eq!(left_hash.len(), hex_len);
        assert_eq!(right_hash.len(), hex_len);
        assert!(left_hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(summary.hashed_pairs, 1);
    }
}

#[test]
fn equal_content_different_mtime_is_silent() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    put_file(left.path(), "a", b"same contents here", 1_000_000);
    put_file(right.path(), "a", b"same contents here", 2_000_000);

    let (records, summary) = run_diff(test_config(left.path(), right.path()));

    assert!(records.is_empty());
    assert_eq!(summary.hashed_pairs, 1);
    assert_eq!(summary.same, 1);
}

#[test]
fn one_sided_files_reported() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    put_file(left.path(), "a", b"hi", 1_000_000);
    put_file(left.path(), "only_left", b"x", 1_000_000);
    put_file(right.path(), "a", b"hi", 1_000_000);
    put_file(right.path(), "only_right", b"y", 1_000_000);

    let (records, summary) = run_diff(test_config(left.path(), right.path()));

    assert_eq!(records.len(), 2);
    let left_rec = records.iter().find(|r| r.reason == "left only").unwrap();
    assert_eq!(left_rec.rel.as_ref(), "only_left");
    assert!(left_rec.left_only);
    assert_eq!(left_rec.left_size, Some(1));

    let right_rec = records.iter().find(|r| r.reason == "right only").unwrap();
    assert_eq!(right_rec.rel.as_ref(), "only_right");
    assert!(!right_rec.left_only);
    assert_eq!(right_rec.right_size, Some(1));

    assert_eq!(summary.left_only, 1);
    assert_eq!(summary.right_only, 1);
    assert_eq!(summary.different, 0);
}

#[test]
fn swapping_roots_mirrors_the_report() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    put_file(a.path(), "common", b"zz", 1_000_000);
    put_file(a.path(), "mine", b"m", 1_000_000);
    put_file(b.path(), "common", b"zz", 1_000_000);
    put_file(b.path(), "yours/deep", b"y", 1_000_000);

    let (mut fwd, fwd_summary) = run_diff(test_config(a.path(), b.path()));
    let (mut rev, rev_summary) = run_diff(test_config(b.path(), a.path()));

    assert_eq!(fwd_summary.left_only, rev_summary.right_only);
    assert_eq!(fwd_summary.right_only, rev_summary.left_only);
    assert_eq!(fwd_summary.total_pairs, rev_summary.total_pairs);
    assert_eq!(fwd.len(), rev.len());

    fwd.sort_by(|x, y| x.rel.cmp(&y.rel));
    rev.sort_by(|x, y| x.rel.cmp(&y.rel));
    for (f, r) in fwd.iter().zip(rev.iter()) {
        assert_eq!(f.rel, r.rel);
        assert_eq!(f.left_only, !r.left_only);
        assert_eq!(f.left_size, r.right_size);
        assert_eq!(f.right_size, r.left_size);
    }
}

#[test]
fn two_empty_trees() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();

    let (records, summary) = run_diff(test_config(left.path(), right.path()));

    assert!(records.is_empty());
    assert_eq!(summary.total_pairs, 0);
    assert_eq!(summary.left_only, 0);
    assert_eq!(summary.right_only, 0);
}

#[test]
fn empty_files_with_equal_mtime() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    put_file(left.path(), "empty", b"", 1_000_000);
    put_file(right.path(), "empty", b"", 1_000_000);

    let (records, summary) = run_diff(test_config(left.path(), right.path()));
    assert!(records.is_empty());
    assert_eq!(summary.hashed_pairs, 0);
    assert_eq!(summary.same, 1);
}

#[test]
fn empty_files_with_different_mtimes_hash_identical() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    put_file(left.path(), "empty", b"", 1_000_000);
    put_file(right.path(), "empty", b"", 2_000_000);

    let (records, summary) = run_diff(test_config(left.path(), right.path()));
    assert!(records.is_empty());
    assert_eq!(summary.hashed_pairs, 1);
    assert_eq!(summary.same, 1);
}

#[test]
fn file_just_over_threshold_streams_and_matches() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    let threshold = 1024;
    let contents: Vec<u8> = (0..threshold + 1).map(|i| (i % 256) as u8).collect();
    put_file(left.path(), "big", &contents, 1_000_000);
    put_file(right.path(), "big", &contents, 2_000_000);

    let mut config = test_config(left.path(), right.path());
    config.hash_threshold = threshold;
    let (records, summary) = run_diff(config);

    assert!(records.is_empty());
    assert_eq!(summary.hashed_pairs, 1);
    assert_eq!(summary.same, 1);
}

#[cfg(unix)]
#[test]
fn symlink_on_one_side_never_appears() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    put_file(left.path(), "real", b"x", 1_000_000);
    put_file(right.path(), "real", b"x", 1_000_000);
    std::os::unix::fs::symlink(left.path().join("real"), left.path().join("link")).unwrap();

    let (records, summary) = run_diff(test_config(left.path(), right.path()));

    assert!(records.is_empty());
    assert_eq!(summary.left_only, 0);
    assert_eq!(summary.total_pairs, 1);
}

#[test]
fn large_identical_tree() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    for i in 0..10_000 {
        let rel = format!("dir/sub-{:02}/file-{:05}", i % 50, i);
        put_file(left.path(), &rel, b"payload", 1_000_000);
        put_file(right.path(), &rel, b"payload", 1_000_000);
    }

    let config = test_config(left.path(), right.path());
    let workers = config.workers;
    let logger = Arc::new(RunLogger::create().unwrap());
    let pipeline = DiffPipeline::new(config, Arc::clone(&logger));
    let handles = pipeline.handles();
    let mut records = Vec::new();
    let summary = pipeline.run(&mut |rec| records.push(rec)).unwrap();

    assert!(records.is_empty());
    assert_eq!(summary.total_pairs, 10_000);
    assert_eq!(summary.same, 10_000);

    // At least one walk worker did work: lifetime utilization is at least
    // ceil(100 / workers) percent.
    let min_percent = (100 + workers as u32 - 1) / workers as u32;
    assert!(handles.walk_utilization.utilized_percent_whole_run() >= min_percent);

    logger.close();
    let _ = fs::remove_dir_all(logger.dir());
}

#[test]
fn processed_matches_total_after_run() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    for i in 0..20 {
        let rel = format!("f-{}", i);
        put_file(left.path(), &rel, b"equal-size-a", 1_000_000);
        put_file(right.path(), &rel, b"equal-size-b", 2_000_000);
    }

    let config = test_config(left.path(), right.path());
    let logger = Arc::new(RunLogger::create().unwrap());
    let pipeline = DiffPipeline::new(config, Arc::clone(&logger));
    let handles = pipeline.handles();
    let mut records = Vec::new();
    let summary = pipeline.run(&mut |rec| records.push(rec)).unwrap();

    assert_eq!(summary.hashed_pairs, 20);
    assert_eq!(
        handles.counts.processed.load(Ordering::Relaxed),
        handles.counts.total_pairs.load(Ordering::Relaxed)
    );
    assert_eq!(records.len(), 20);
    assert!(records.iter().all(|r| r.reason == "content differs"));

    logger.close();
    let _ = fs::remove_dir_all(logger.dir());
}

#[test]
fn show_same_collects_identical_records() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    // One fast-skip pair, one hash-verified pair.
    put_file(left.path(), "fast", b"aa", 1_000_000);
    put_file(right.path(), "fast", b"aa", 1_000_000);
    put_file(left.path(), "hashed", b"bb", 1_000_000);
    put_file(right.path(), "hashed", b"bb", 2_000_000);

    let mut config = test_config(left.path(), right.path());
    config.show_same = true;
    let (records, summary) = run_diff(config);

    assert!(records.is_empty());
    assert_eq!(summary.identical.len(), 2);
    let reasons: Vec<&str> = {
        let mut v: Vec<(&str, &str)> = summary
            .identical
            .iter()
            .map(|r| (r.rel.as_ref(), r.reason.as_str()))
            .collect();
        v.sort();
        v.into_iter().map(|(_, reason)| reason).collect()
    };
    assert_eq!(reasons, vec!["same size and mtime", "same hash"]);
}

#[test]
fn mixed_tree_end_to_end() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    put_file(left.path(), "same", b"s", 1_000_000);
    put_file(right.path(), "same", b"s", 1_000_000);
    put_file(left.path(), "sized", b"aa", 1_000_000);
    put_file(right.path(), "sized", b"aaa", 1_000_000);
    put_file(left.path(), "changed", b"old!", 1_000_000);
    put_file(right.path(), "changed", b"new!", 2_000_000);
    put_file(left.path(), "gone", b"g", 1_000_000);
    put_file(right.path(), "added/new", b"n", 1_000_000);

    let (mut records, summary) = run_diff(test_config(left.path(), right.path()));
    ffd::output::sort_by_path(&mut records);

    let reasons: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.rel.as_ref(), r.reason.as_str()))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("added/new", "right only"),
            ("changed", "content differs"),
            ("gone", "left only"),
            ("sized", "size changed"),
        ]
    );
    assert_eq!(summary.total_pairs, 3);
    assert_eq!(summary.different, 2);
    assert_eq!(summary.same, 1);
}
