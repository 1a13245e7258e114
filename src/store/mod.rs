//! # Binned Sparse Matrix Store
//!
//! [`PeakMatrix`] exposes a dense-matrix-shaped read interface over two
//! parallel ragged keyed collections: per-column key sequences (e.g. m/z
//! coordinates) and per-column value sequences (e.g. intensities). The row
//! axis is a sorted set of bin centers; cell `(r, c)` is the combiner
//! applied to every value in column `c` whose key lies within `tolerance`
//! of center `r`, or `None` when no key qualifies.
//!
//! Nothing is materialized up front: a cell or column is computed when it
//! is requested and forgotten afterwards, unless the caller opts into
//! [`MemoColumns`]. The store is immutable after construction, so
//! concurrent reads need no locking.
//!
//! ## Windowing semantics
//!
//! The tolerance window is inclusive on both sides. A key at distance
//! exactly `tolerance` from two adjacent bin centers contributes to both
//! bins; aggregate totals across the axis are therefore not conserved when
//! windows overlap. This is intended behavior, not a bug.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use peakbin::axis::BinAxis;
//! use peakbin::collection::MemoryColumns;
//! use peakbin::combine::Combiner;
//! use peakbin::store::PeakMatrix;
//!
//! let keys = Arc::new(MemoryColumns::new(vec![vec![1.0, 2.0, 3.0]]));
//! let values = Arc::new(MemoryColumns::new(vec![vec![10.0, 20.0, 30.0]]));
//! let axis = BinAxis::from_centers(vec![1.5, 2.5])?;
//!
//! let matrix = PeakMatrix::new(keys, values, axis, 0.5, Combiner::Sum)?;
//! assert_eq!(matrix.column(0)?, vec![Some(30.0), Some(50.0)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cache;
mod config;
mod error;


pub use cache::MemoColumns;
pub use config::StoreConfig;
pub use error::{Dimension, StoreError};

use std::sync::Arc;

use log::debug;

use crate::axis::BinAxis;
use crate::collection::KeyedCollection;
use crate::combine::{Accumulator, Combiner};
use crate::parallel::{map_columns, Backend};

/// Lazy `(bins x columns)` matrix over ragged keyed columns
///
/// See the [module docs](self) for semantics. Construction validates shape
/// eagerly; reads are pure functions of the stored data and configuration.
pub struct PeakMatrix {
    keys: Arc<dyn KeyedCollection>,
    values: Arc<dyn KeyedCollection>,
    axis: BinAxis,
    tolerance: f64,
    combiner: Combiner,
}

impl std::fmt::Debug for PeakMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeakMatrix")
            .field("columns", &self.keys.len())
            .field("axis", &self.axis)
            .field("tolerance", &self.tolerance)
            .field("combiner", &self.combiner)
            .finish_non_exhaustive()
    }
}

impl PeakMatrix {
    /// Build a store over parallel key and value collections
    ///
    /// Validates that both collections have the same column count and that
    /// every column's key and value sequences have equal length; for
    /// file-backed collections this costs one pass over the data. Fails
    /// with [`StoreError::NegativeTolerance`] for a negative or non-finite
    /// tolerance. The axis was already validated at [`BinAxis`]
    /// construction.
    pub fn new(
        keys: Arc<dyn KeyedCollection>,
        values: Arc<dyn KeyedCollection>,
        axis: BinAxis,
        tolerance: f64,
        combiner: Combiner,
    ) -> Result<Self, StoreError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(StoreError::NegativeTolerance { tolerance });
        }
        if keys.len() != values.len() {
            return Err(StoreError::CollectionMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let store = Self {
            keys,
            values,
            axis,
            tolerance,
            combiner,
        };
        for column in 0..store.num_columns() {
            store.fetch_pair(column)?;
        }
        debug!(
            "constructed {}x{} peak matrix (tolerance {}, combiner {})",
            store.num_bins(),
            store.num_columns(),
            store.tolerance,
            store.combiner
        );
        Ok(store)
    }

    /// Number of bins (rows), `R`
    pub fn num_bins(&self) -> usize {
        self.axis.len()
    }

    /// Number of columns, `C`
    pub fn num_columns(&self) -> usize {
        self.keys.len()
    }

    /// The bin axis
    pub fn axis(&self) -> &BinAxis {
        &self.axis
    }

    /// Inclusion half-width around each bin center
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Reduction applied within each bin
    pub fn combiner(&self) -> Combiner {
        self.combiner
    }

    /// Compute a single cell
    ///
    /// Returns `None` when no key of column `c` lies within tolerance of
    /// bin center `r` (the empty sentinel, a data result, not an error).
    pub fn cell(&self, r: usize, c: usize) -> Result<Option<f64>, StoreError> {
        let center = self.axis.center(r).ok_or(StoreError::IndexOutOfRange {
            dimension: Dimension::Row,
            index: r,
            len: self.num_bins(),
        })?;
        let (keys, values) = self.fetch_pair(c)?;

        let mut acc = self.combiner.accumulator();
        for (key, value) in keys.iter().zip(values.iter()) {
            if (key - center).abs() <= self.tolerance {
                acc.push(*value);
            }
        }
        Ok(acc.finish())
    }

    /// Compute the full binned vector (length `R`) for one column
    ///
    /// Single pass over the column's pairs: each key is mapped to its
    /// window of bin indices (direct index arithmetic on an evenly spaced
    /// axis, binary search otherwise) and the true distance is re-checked
    /// against the tolerance before the value is folded in. Cost is
    /// `O(len(column) + R)` rather than `O(len(column) * R)`.
    pub fn column(&self, c: usize) -> Result<Vec<Option<f64>>, StoreError> {
        let (keys, values) = self.fetch_pair(c)?;

        let mut bins = vec![self.combiner.accumulator(); self.num_bins()];
        let even = self.axis.is_even();
        for (key, value) in keys.iter().copied().zip(values.iter().copied()) {
            let window = if even {
                self.axis.candidate_bins(key, self.tolerance)
            } else {
                self.axis.window_bins(key, self.tolerance)
            };
            let Some(window) = window else { continue };
            for r in window {
                // Candidates are index-rounded; only true distance decides.
                let center = self.axis.centers()[r];
                if (key - center).abs() <= self.tolerance {
                    bins[r].push(value);
                }
            }
        }
        Ok(bins.into_iter().map(Accumulator::finish).collect())
    }

    /// Compute one bin across all columns (length `C`)
    ///
    /// Touches every column, so this is the expensive orientation; prefer
    /// [`column`](Self::column) when iterating the whole matrix.
    pub fn row(&self, r: usize) -> Result<Vec<Option<f64>>, StoreError> {
        if r >= self.num_bins() {
            return Err(StoreError::IndexOutOfRange {
                dimension: Dimension::Row,
                index: r,
                len: self.num_bins(),
            });
        }
        (0..self.num_columns()).map(|c| self.cell(r, c)).collect()
    }

    /// Materialize every column sequentially
    ///
    /// Convenience for small matrices; the result is `C` vectors of length
    /// `R`. For large matrices prefer [`columns_with`](Self::columns_with)
    /// on a parallel backend, or iterate columns yourself.
    pub fn dense(&self) -> Result<Vec<Vec<Option<f64>>>, StoreError> {
        (0..self.num_columns()).map(|c| self.column(c)).collect()
    }

    /// Materialize every column on the given execution backend
    ///
    /// One `Result` per column, in column order; a failure in one column
    /// does not abort the others.
    pub fn columns_with(&self, backend: &Backend) -> Vec<Result<Vec<Option<f64>>, StoreError>> {
        map_columns(backend, self.num_columns(), |c| self.column(c))
    }

    /// Bin every column, then apply an opaque per-column transform
    ///
    /// The transform (smoothing, baseline removal, peak picking, ...) is
    /// never inspected by the store; it sees one materialized binned column
    /// at a time and its outputs are returned in column order.
    pub fn map_columns_with<T, F>(
        &self,
        backend: &Backend,
        transform: F,
    ) -> Vec<Result<T, StoreError>>
    where
        T: Send,
        F: Fn(&[Option<f64>]) -> T + Send + Sync,
    {
        map_columns(backend, self.num_columns(), |c| {
            let column = self.column(c)?;
            Ok(transform(&column))
        })
    }

    /// Fetch the (keys, values) pair for one column, verifying shape
    fn fetch_pair(&self, c: usize) -> Result<(Vec<f64>, Vec<f64>), StoreError> {
        if c >= self.num_columns() {
            return Err(StoreError::IndexOutOfRange {
                dimension: Dimension::Column,
                index: c,
                len: self.num_columns(),
            });
        }
        let keys = self.keys.column(c)?;
        let values = self.values.column(c)?;
        if keys.len() != values.len() {
            return Err(StoreError::ShapeMismatch {
                column: c,
                keys_len: keys.len(),
                values_len: values.len(),
            });
        }
        Ok((keys, values))
    }
}
