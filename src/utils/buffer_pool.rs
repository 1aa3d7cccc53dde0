//! # Buffer Pool
//!
//! Pool of send buffers so a steady stream of datagrams does not allocate per send.
//!
//! A rented buffer is sized exactly to the requested length and zeroed, so nothing a
//! previous send wrote can leak into the next payload. It goes back to the pool when
//! dropped, which the sender does only after the OS has accepted the datagram.
//!
//! ## Usage
//! ```rust
//! use sacn_transport::utils::buffer_pool::BufferPool;
//!
//! let pool = BufferPool::new(4);
//! let buffer = pool.rent(638);
//! assert_eq!(buffer.len(), 638);
//! // Buffer automatically returned to pool on drop
//! ```

use std::sync::{Arc, Mutex};

/// Largest buffer capacity kept in the pool
const MAX_POOLED_BUFFER_SIZE: usize = 4096;

/// Capacity of pre-allocated buffers, enough for a full data packet
const DEFAULT_BUFFER_CAPACITY: usize = 638;

/// A rented buffer that returns itself to the pool when dropped
pub struct PooledBuffer {
    buffer: Vec<u8>,
    pool: Arc<Mutex<Vec<Vec<u8>>>>,
    max_size: usize,
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if self.buffer.capacity() <= MAX_POOLED_BUFFER_SIZE {
            self.buffer.clear();
            if let Ok(mut pool) = self.pool.lock() {
                // buffers allocated during a burst are freed once the pool is full
                if pool.len() < self.max_size {
                    pool.push(std::mem::take(&mut self.buffer));
                }
            }
        }
    }
}

impl std::ops::Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl std::ops::DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

/// Thread-safe pool of send buffers
#[derive(Clone)]
pub struct BufferPool {
    pool: Arc<Mutex<Vec<Vec<u8>>>>,
    max_size: usize,
}

impl BufferPool {
    /// Create a pool with `pool_size` pre-allocated buffers.
    ///
    /// The pool never holds more than `pool_size` idle buffers.
    pub fn new(pool_size: usize) -> Self {
        let pool = (0..pool_size)
            .map(|_| Vec::with_capacity(DEFAULT_BUFFER_CAPACITY))
            .collect();

        Self {
            pool: Arc::new(Mutex::new(pool)),
            max_size: pool_size,
        }
    }

    /// Rent a zeroed buffer of exactly `len` bytes (or allocate one if the pool is empty)
    pub fn rent(&self, len: usize) -> PooledBuffer {
        let mut buffer = self
            .pool
            .lock()
            .ok()
            .and_then(|mut pool| pool.pop())
            .unwrap_or_else(|| Vec::with_capacity(len.max(DEFAULT_BUFFER_CAPACITY)));
        buffer.resize(len, 0);

        PooledBuffer {
            buffer,
            pool: self.pool.clone(),
            max_size: self.max_size,
        }
    }

    /// Number of idle buffers in the pool
    pub fn available(&self) -> usize {
        self.pool.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(16)
    }
}
