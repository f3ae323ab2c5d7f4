//! Benchmarks for ffd hot paths
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::time::Duration;

fn benchmark_queue_operations(c: &mut Criterion) {
    use ffd::model::Side;
    use ffd::walker::queue::{DirJob, DirQueue};
    use std::path::PathBuf;

    c.bench_function("queue_push_recv", |b| {
        let queue = DirQueue::new(10_000);
        let handle = queue.handle();
        let root = Arc::new(PathBuf::from("/bench/root"));

        b.iter(|| {
            let job = DirJob {
                root: Arc::clone(&root),
                rel_dir: "sub/dir".into(),
                side: Side::Left,
            };
            assert!(handle.try_push(job).is_none());
            let received = handle.recv_timeout(Duration::from_millis(10)).unwrap();
            handle.job_done();
            black_box(received);
        })
    });
}

fn benchmark_path_interning(c: &mut Criterion) {
    use ffd::paths::PathInterner;

    c.bench_function("intern_repeated_path", |b| {
        let interner = PathInterner::new();
        b.iter(|| {
            let handle = interner.intern(black_box("some/deeply/nested/path/file.dat"));
            black_box(handle);
        })
    });

    c.bench_function("intern_distinct_paths", |b| {
        let interner = PathInterner::new();
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let handle = interner.intern(black_box(&format!("dir/file-{}", i)));
            black_box(handle);
        })
    });
}

fn benchmark_hashing(c: &mut Criterion) {
    use ffd::config::HashAlgorithm;
    use ffd::hash::hash_bytes;

    let data = vec![0xA5u8; 1024 * 1024];
    for (name, algorithm) in [
        ("hash_1mib_xxhash", HashAlgorithm::Xxhash),
        ("hash_1mib_sha256", HashAlgorithm::Sha256),
        ("hash_1mib_md5", HashAlgorithm::Md5),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| black_box(hash_bytes(black_box(&data), algorithm)))
        });
    }
}

fn benchmark_discovered_set(c: &mut Criterion) {
    use ffd::discovered::DiscoveredSet;
    use ffd::model::{FileMeta, Side};

    c.bench_function("discovered_set_pair_add", |b| {
        let set = DiscoveredSet::new();
        let meta = FileMeta { size: 100, mtime: 1 };
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let rel = format!("dir/file-{}", i);
            set.add(&rel, Side::Left, meta);
            black_box(set.add(&rel, Side::Right, meta));
        })
    });
}

criterion_group!(
    benches,
    benchmark_queue_operations,
    benchmark_path_interning,
    benchmark_hashing,
    benchmark_discovered_set
);
criterion_main!(benches);
