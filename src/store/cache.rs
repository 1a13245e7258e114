use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{PeakMatrix, StoreError};

/// Caller-controlled memoization of computed columns
///
/// The store itself never caches: every read is a pure function of the
/// stored data, which keeps behavior predictable under parallel access.
/// Wrap the matrix in `MemoColumns` to keep computed columns around
/// explicitly. Recomputation under a lost race is harmless because column
/// results are deterministic.
///
/// ```rust
/// use std::sync::Arc;
/// use peakbin::axis::BinAxis;
/// use peakbin::collection::MemoryColumns;
/// use peakbin::combine::Combiner;
/// use peakbin::store::{MemoColumns, PeakMatrix};
///
/// let keys = Arc::new(MemoryColumns::new(vec![vec![1.0, 2.0]]));
/// let values = Arc::new(MemoryColumns::new(vec![vec![5.0, 7.0]]));
/// let axis = BinAxis::from_range(1.0, 2.0, 1.0)?;
/// let matrix = PeakMatrix::new(keys, values, axis, 0.0, Combiner::Sum)?;
///
/// let memo = MemoColumns::new(Arc::new(matrix));
/// let first = memo.column(0)?;
/// let again = memo.column(0)?;
/// assert!(Arc::ptr_eq(&first, &again));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MemoColumns {
    matrix: Arc<PeakMatrix>,
    cache: RwLock<HashMap<usize, Arc<Vec<Option<f64>>>>>,
}

impl MemoColumns {
    /// Wrap a matrix with an empty column cache
    pub fn new(matrix: Arc<PeakMatrix>) -> Self {
        Self {
            matrix,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped matrix
    pub fn matrix(&self) -> &PeakMatrix {
        &self.matrix
    }

    /// Compute or recall the binned vector for column `c`
    ///
    /// Errors are not cached; a failed column is retried on the next call.
    pub fn column(&self, c: usize) -> Result<Arc<Vec<Option<f64>>>, StoreError> {
        if let Ok(cache) = self.cache.read() {
            if let Some(column) = cache.get(&c) {
                return Ok(Arc::clone(column));
            }
        }

        let column = Arc::new(self.matrix.column(c)?);
        if let Ok(mut cache) = self.cache.write() {
            // First writer wins so all readers share one allocation.
            return Ok(Arc::clone(
                cache.entry(c).or_insert_with(|| Arc::clone(&column)),
            ));
        }
        Ok(column)
    }

    /// Number of columns currently memoized
    pub fn cached_columns(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Drop every memoized column
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }
}
