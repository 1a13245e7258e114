//! # Parallel column evaluation
//!
//! Binning is embarrassingly parallel across columns: each task needs only
//! its own column's raw data plus the shared immutable axis/tolerance/
//! combiner configuration. This module provides the execution strategy for
//! such batches: a [`Backend`] selected by configuration, never hard-coded,
//! and an order-preserving [`map_columns`] that reports errors per item so
//! one failing column cannot abort or corrupt the rest of the batch.
//!
//! ## Example
//!
//! ```rust
//! use peakbin::parallel::{map_columns, Backend};
//!
//! let backend = Backend::Rayon { threads: Some(2) };
//! let results: Vec<Result<usize, std::io::Error>> =
//!     map_columns(&backend, 4, |i| Ok(i * i));
//! assert_eq!(results.len(), 4);
//! assert_eq!(*results[3].as_ref().unwrap(), 9);
//! ```

use log::warn;
use rayon::prelude::*;

/// Execution strategy for per-column batches
///
/// `Sequential` runs tasks inline on the caller's thread; `Rayon` fans out
/// over a work-stealing thread pool. The enum is non-exhaustive so further
/// topologies (process pools, networked workers) can be added without
/// breaking callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Backend {
    /// Run every task on the calling thread, in order
    Sequential,
    /// Fan out over a Rayon thread pool
    Rayon {
        /// Pool size; `None` uses the global pool, `Some(0 | 1)` falls back
        /// to sequential execution
        threads: Option<usize>,
    },
}

impl Default for Backend {
    fn default() -> Self {
        Self::Rayon { threads: None }
    }
}

/// Apply `f` to every index in `0..count`, one `Result` per item
///
/// Output order always matches input order regardless of backend. A failure
/// in one item is recorded in its slot; all other items still run to
/// completion. If a dedicated thread pool cannot be built the batch falls
/// back to sequential execution rather than failing.
pub fn map_columns<T, E, F>(backend: &Backend, count: usize, f: F) -> Vec<Result<T, E>>
where
    T: Send,
    E: Send,
    F: Fn(usize) -> Result<T, E> + Send + Sync,
{
    match backend {
        Backend::Sequential => (0..count).map(f).collect(),
        Backend::Rayon { threads: None } => (0..count).into_par_iter().map(f).collect(),
        Backend::Rayon {
            threads: Some(threads),
        } => {
            if *threads <= 1 {
                return (0..count).map(f).collect();
            }
            match rayon::ThreadPoolBuilder::new().num_threads(*threads).build() {
                Ok(pool) => pool.install(|| (0..count).into_par_iter().map(f).collect()),
                Err(err) => {
                    warn!("failed to build thread pool ({}), running sequentially", err);
                    (0..count).map(f).collect()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(i: usize) -> Result<usize, String> {
        Ok(i * i)
    }

    #[test]
    fn sequential_preserves_order() {
        let results: Vec<Result<usize, String>> = map_columns(&Backend::Sequential, 5, square);
        let values: Vec<usize> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![0, 1, 4, 9, 16]);
    }

    #[test]
    fn rayon_preserves_order() {
        let backend = Backend::Rayon { threads: None };
        let results: Vec<Result<usize, String>> = map_columns(&backend, 100, square);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(*result.as_ref().unwrap(), i * i);
        }
    }

    #[test]
    fn dedicated_pool_preserves_order() {
        let backend = Backend::Rayon { threads: Some(3) };
        let results: Vec<Result<usize, String>> = map_columns(&backend, 32, square);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(*result.as_ref().unwrap(), i * i);
        }
    }

    #[test]
    fn single_thread_falls_back_to_sequential() {
        let backend = Backend::Rayon { threads: Some(1) };
        let results: Vec<Result<usize, String>> = map_columns(&backend, 4, square);
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn one_failure_does_not_poison_the_batch() {
        let backend = Backend::Rayon { threads: Some(2) };
        let results: Vec<Result<usize, String>> = map_columns(&backend, 5, |i| {
            if i == 2 {
                Err("boom".to_string())
            } else {
                Ok(i)
            }
        });
        assert!(results[2].is_err());
        for (i, result) in results.iter().enumerate() {
            if i != 2 {
                assert_eq!(*result.as_ref().unwrap(), i);
            }
        }
    }

    #[test]
    fn empty_batch_is_empty() {
        let results: Vec<Result<usize, String>> = map_columns(&Backend::default(), 0, square);
        assert!(results.is_empty());
    }
}
