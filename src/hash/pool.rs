//! Process-wide pool of streaming-hash buffers
//!
//! Large files are hashed in threshold-sized reads. Allocating a fresh
//! multi-megabyte buffer per file collapses throughput under allocator
//! pressure, so workers borrow a buffer from this pool and return it via the
//! guard's Drop. Memory per compare worker is bounded at one pool buffer
//! regardless of file size.

use std::sync::{LazyLock, Mutex};

/// Retain at most this many idle buffers; anything beyond is freed on return.
const MAX_POOLED: usize = 32;

static POOL: LazyLock<BufferPool> = LazyLock::new(BufferPool::new);

/// Borrow a buffer of at least `len` bytes from the global pool.
pub fn checkout(len: usize) -> PooledBuffer {
    POOL.checkout(len)
}

pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    fn new() -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
        }
    }

    fn checkout(&'static self, len: usize) -> PooledBuffer {
        let mut data = self
            .buffers
            .lock()
            .expect("buffer pool poisoned")
            .pop()
            .unwrap_or_default();
        if data.len() < len {
            data.resize(len, 0);
        }
        PooledBuffer {
            data,
            len,
            pool: self,
        }
    }

    fn put_back(&self, data: Vec<u8>) {
        let mut buffers = self.buffers.lock().expect("buffer pool poisoned");
        if buffers.len() < MAX_POOLED {
            buffers.push(data);
        }
    }

    #[cfg(test)]
    fn idle_count(&self) -> usize {
        self.buffers.lock().unwrap().len()
    }
}

/// A borrowed buffer; returns itself to the pool on drop
pub struct PooledBuffer {
    data: Vec<u8>,
    len: usize,
    pool: &'static BufferPool,
}

impl PooledBuffer {
    /// The borrowed region, exactly the requested length.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.put_back(std::mem::take(&mut self.data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_length() {
        let mut buf = checkout(1024);
        assert_eq!(buf.as_mut_slice().len(), 1024);
    }

    #[test]
    fn test_buffer_reuse() {
        {
            let mut buf = checkout(4096);
            buf.as_mut_slice()[0] = 0xAB;
        }
        let before = POOL.idle_count();
        assert!(before >= 1);

        // The returned buffer should satisfy the next same-size checkout.
        let _buf = checkout(4096);
        assert_eq!(POOL.idle_count(), before - 1);
    }

    #[test]
    fn test_buffer_grows_for_larger_request() {
        {
            let _small = checkout(16);
        }
        let mut big = checkout(1 << 20);
        assert_eq!(big.as_mut_slice().len(), 1 << 20);
    }

    #[test]
    fn test_zero_length_checkout() {
        let mut buf = checkout(0);
        assert!(buf.as_mut_slice().is_empty());
    }
}
