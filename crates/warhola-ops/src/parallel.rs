//! Row-partitioned parallel execution.
//!
//! An [`Executor`] splits `rows` into chunks of
//! `max(1, rows / (workers * 10))` rows. Every worker repeatedly claims the
//! next chunk from a shared atomic counter until none are left; the call
//! returns once all chunks are done. With one worker the closure is called
//! once, directly, over the whole range.
//!
//! Workers always write disjoint rows, so results do not depend on the
//! worker count.
//!
//! # Example
//!
//! ```rust
//! use warhola_ops::parallel::Executor;
//!
//! let exec = Executor::new(4).unwrap();
//! let mut dst = vec![0u8; 8 * 100];
//! exec.rows(&mut dst, 8, 100, |y, row| row.fill(y as u8));
//! assert_eq!(dst[8 * 42], 42);
//! ```

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::trace;

use crate::{OpsError, OpsResult};

#[derive(Clone)]
enum Pool {
    Inline,
    Global,
    Dedicated(Arc<ThreadPool>),
}

/// Fixed-size worker pool for row-parallel operators.
#[derive(Clone)]
pub struct Executor {
    workers: usize,
    pool: Pool,
}

impl Executor {
    /// Creates an executor with a dedicated pool of `workers` threads.
    ///
    /// One worker runs everything on the calling thread.
    pub fn new(workers: usize) -> OpsResult<Self> {
        match workers {
            0 => Err(OpsError::InvalidParameter("executor needs at least one worker".into())),
            1 => Ok(Self::inline()),
            n => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("warhola-worker-{i}"))
                    .build()
                    .map_err(|e| OpsError::InvalidParameter(format!("thread pool: {e}")))?;
                Ok(Self {
                    workers: n,
                    pool: Pool::Dedicated(Arc::new(pool)),
                })
            }
        }
    }

    /// Executor running on the calling thread only.
    pub fn inline() -> Self {
        Self {
            workers: 1,
            pool: Pool::Inline,
        }
    }

    /// Number of workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Rows per claimed chunk for a job of `rows` rows.
    pub fn chunk_size(&self, rows: usize) -> usize {
        (rows / (self.workers * 10)).max(1)
    }

    fn broadcast<F: Fn() + Sync>(&self, f: F) {
        match &self.pool {
            Pool::Inline => f(),
            Pool::Global => {
                rayon::broadcast(|_| f());
            }
            Pool::Dedicated(pool) => {
                pool.broadcast(|_| f());
            }
        }
    }

    /// Calls `f(start, end)` over chunks covering `0..rows`.
    pub fn run<F>(&self, rows: usize, f: F)
    where
        F: Fn(usize, usize) + Sync,
    {
        if rows == 0 {
            return;
        }
        if self.workers == 1 {
            f(0, rows);
            return;
        }

        let chunk = self.chunk_size(rows);
        trace!(rows, chunk, workers = self.workers, "parallel run");
        let next = AtomicUsize::new(0);
        self.broadcast(|| {
            loop {
                let start = next.fetch_add(chunk, Ordering::Relaxed);
                if start >= rows {
                    break;
                }
                f(start, (start + chunk).min(rows));
            }
        });
    }

    /// Calls `f(y, row)` for each of the first `rows` rows of `dst`, where
    /// rows are `stride` bytes apart.
    ///
    /// Chunks of rows are handed out as disjoint mutable slices.
    pub fn rows<F>(&self, dst: &mut [u8], stride: usize, rows: usize, f: F)
    where
        F: Fn(usize, &mut [u8]) + Sync,
    {
        if rows == 0 || stride == 0 {
            return;
        }
        let len = (rows * stride).min(dst.len());
        let dst = &mut dst[..len];

        if self.workers == 1 {
            for (y, row) in dst.chunks_mut(stride).enumerate() {
                f(y, row);
            }
            return;
        }

        let chunk = self.chunk_size(rows);
        let slots: Vec<Mutex<Option<&mut [u8]>>> =
            dst.chunks_mut(chunk * stride).map(|c| Mutex::new(Some(c))).collect();
        trace!(rows, chunk, workers = self.workers, "parallel rows");

        let next = AtomicUsize::new(0);
        self.broadcast(|| {
            loop {
                let i = next.fetch_add(1, Ordering::Relaxed);
                if i >= slots.len() {
                    break;
                }
                let claimed = slots[i].lock().ok().and_then(|mut slot| slot.take());
                if let Some(block) = claimed {
                    for (j, row) in block.chunks_mut(stride).enumerate() {
                        f(i * chunk + j, row);
                    }
                }
            }
        });
    }
}

impl Default for Executor {
    /// Uses the global rayon pool, one worker per rayon thread.
    fn default() -> Self {
        match rayon::current_num_threads() {
            0 | 1 => Self::inline(),
            n => Self {
                workers: n,
                pool: Pool::Global,
            },
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor").field("workers", &self.workers).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_chunk_size() {
        let exec = Executor::new(4).unwrap();
        assert_eq!(exec.chunk_size(1000), 25);
        assert_eq!(exec.chunk_size(10), 1);
        assert_eq!(Executor::inline().chunk_size(5), 1);
        assert!(Executor::new(0).is_err());
    }

    #[test]
    fn test_run_covers_every_row_once() {
        for workers in [1, 2, 3, 8] {
            let exec = Executor::new(workers).unwrap();
            let hits: Vec<AtomicU64> = (0..257).map(|_| AtomicU64::new(0)).collect();
            exec.run(hits.len(), |start, end| {
                for h in &hits[start..end] {
                    h.fetch_add(1, Ordering::Relaxed);
                }
            });
            assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1), "workers={workers}");
        }
    }

    #[test]
    fn test_rows_are_disjoint() {
        for workers in [1, 2, 7] {
            let exec = Executor::new(workers).unwrap();
            let mut dst = vec![0u8; 3 * 123];
            exec.rows(&mut dst, 3, 123, |y, row| {
                for b in row.iter_mut() {
                    *b += (y % 251) as u8 + 1;
                }
            });
            for (y, row) in dst.chunks(3).enumerate() {
                assert!(row.iter().all(|&b| b == (y % 251) as u8 + 1));
            }
        }
    }

    #[test]
    fn test_empty_job() {
        let exec = Executor::default();
        exec.run(0, |_, _| panic!("no rows to run"));
        exec.rows(&mut [], 4, 0, |_, _| panic!("no rows to run"));
    }
}
