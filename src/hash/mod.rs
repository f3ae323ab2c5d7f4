//! Content hashing with a size-adaptive read strategy
//!
//! Files below the configured threshold are read whole and hashed in one
//! shot; files at or above it are streamed through a pooled buffer so memory
//! stays bounded no matter how large the file is. Both paths produce the
//! same digest for the same bytes.
//!
//! Digest encodings: xxhash64 is 16 lowercase hex chars (zero-padded),
//! sha256 is 64, md5 is 32.

pub mod pool;

use crate::config::HashAlgorithm;
use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;
use xxhash_rust::xxh64::{xxh64, Xxh64};

/// Floor for the streaming chunk size so tiny thresholds still read in sane
/// units instead of degenerating into a byte-at-a-time loop.
const MIN_STREAM_CHUNK: usize = 64 * 1024;

/// Hash the file at `path`, choosing the read strategy by size.
///
/// I/O failures propagate unchanged; the caller decides whether they are
/// fatal or become a `hash left:` / `hash right:` record.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm, threshold: usize) -> io::Result<String> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    if size < threshold as u64 {
        hash_full(&mut file, algorithm, size as usize)
    } else {
        hash_stream(&mut file, algorithm, threshold.max(MIN_STREAM_CHUNK))
    }
}

/// Hash a byte slice in one shot.
pub fn hash_bytes(data: &[u8], algorithm: HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Xxhash => format!("{:016x}", xxh64(data, 0)),
        HashAlgorithm::Sha256 => hex_string(&Sha256::digest(data)),
        HashAlgorithm::Md5 => hex_string(&Md5::digest(data)),
    }
}

/// Small-file path: one exact-sized read, one-shot digest. Avoids pool
/// traffic for the common case.
fn hash_full(file: &mut File, algorithm: HashAlgorithm, size: usize) -> io::Result<String> {
    let mut data = vec![0u8; size];
    file.read_exact(&mut data)?;
    Ok(hash_bytes(&data, algorithm))
}

/// Streaming path: successive chunk-sized reads through a pooled buffer,
/// feeding the digest incrementally.
fn hash_stream<R: Read>(reader: &mut R, algorithm: HashAlgorithm, chunk: usize) -> io::Result<String> {
    let mut pooled = pool::checkout(chunk);
    let buf = pooled.as_mut_slice();
    let mut digest = StreamDigest::new(algorithm);
    loop {
        match reader.read(buf) {
            Ok(0) => return Ok(digest.finalize_hex()),
            Ok(n) => digest.update(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Incremental digest state, one variant per supported algorithm
enum StreamDigest {
    Xxh64(Xxh64),
    Sha256(Sha256),
    Md5(Md5),
}

impl StreamDigest {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Xxhash => StreamDigest::Xxh64(Xxh64::new(0)),
            HashAlgorithm::Sha256 => StreamDigest::Sha256(Sha256::new()),
            HashAlgorithm::Md5 => StreamDigest::Md5(Md5::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            StreamDigest::Xxh64(state) => state.update(data),
            StreamDigest::Sha256(state) => state.update(data),
            StreamDigest::Md5(state) => state.update(data),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            StreamDigest::Xxh64(state) => format!("{:016x}", state.digest()),
            StreamDigest::Sha256(state) => hex_string(&state.finalize()),
            StreamDigest::Md5(state) => hex_string(&state.finalize()),
        }
    }
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}
