// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reusable record buffers.
//!
//! Every record is assembled in a buffer checked out of the pool, so steady-state logging
//! does not allocate. The pool has its own lock, distinct from the logger's write lock, and
//! holds it only to push or pop one buffer.

use std::mem;
use std::ops::Deref;
use std::ops::DerefMut;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Capacity given to freshly allocated buffers.
const INITIAL_CAPACITY: usize = 64;

/// Buffers that grew past this capacity are dropped instead of pooled.
pub(crate) const MAX_POOLED_CAPACITY: usize = 256;

/// Point-in-time counters of a [`BufferPool`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers handed out from the free list.
    pub hits: u64,
    /// Buffers allocated because the free list was empty.
    pub misses: u64,
    /// Oversized buffers released back and dropped.
    pub drops: u64,
}

#[derive(Debug, Default)]
pub(crate) struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    drops: AtomicU64,
}

impl BufferPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn free(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        self.free.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Check out an empty buffer; it goes back to the pool when the guard drops.
    pub(crate) fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self.free().pop();
        let buf = match buf {
            Some(mut buf) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                buf.clear();
                buf
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Vec::with_capacity(INITIAL_CAPACITY)
            }
        };

        PooledBuffer {
            pool: self,
            buf,
        }
    }

    pub(crate) fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_POOLED_CAPACITY {
            self.drops.fetch_add(1, Ordering::Relaxed);
            return;
        }

        buf.clear();
        self.free().push(buf);
    }

    #[cfg(test)]
    pub(crate) fn available(&self) -> usize {
        self.free().len()
    }

    pub(crate) fn stats(&self) -> PoolStats {
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }
}

/// A buffer checked out of a [`BufferPool`], owned by exactly one caller.
#[derive(Debug)]
pub(crate) struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_acquire_from_empty_pool_allocates() {
        let pool = BufferPool::new();
        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= INITIAL_CAPACITY);
        assert_eq!(
            pool.stats(),
            PoolStats {
                hits: 0,
                misses: 1,
                drops: 0
            }
        );
    }

    #[test]
    fn test_released_buffer_is_reset_and_reused() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(b"hello world");
        }
        assert_eq!(pool.available(), 1);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert_eq!(pool.stats().hits, 1);
        assert_eq!(pool.stats().misses, 1);
    }

    #[test]
    fn test_oversized_buffer_is_dropped() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(&[b'x'; MAX_POOLED_CAPACITY + 1]);
        }
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.stats().drops, 1);

        pool.release(Vec::with_capacity(MAX_POOLED_CAPACITY));
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_allocations_stabilize_under_reuse() {
        let pool = BufferPool::new();
        for _ in 0..1000 {
            let mut a = pool.acquire();
            let mut b = pool.acquire();
            a.extend_from_slice(b"first record\n");
            b.extend_from_slice(b"second record\n");
        }
        let stats = pool.stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 1998);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = Arc::new(BufferPool::new());
        let threads = 8;
        let rounds = 500;

        let handles = (0..threads)
            .map(|i| {
                let pool = pool.clone();
                thread::spawn(move || {
                    for n in 0..rounds {
                        let mut buf = pool.acquire();
                        assert!(buf.is_empty());
                        buf.extend_from_slice(format!("thread {i} round {n}").as_bytes());
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = pool.stats();
        assert_eq!(stats.hits + stats.misses, threads * rounds);
        assert!(stats.misses <= threads);
        assert_eq!(pool.available() as u64, stats.misses);
    }
}
