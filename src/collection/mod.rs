//! # Keyed Collections
//!
//! A keyed collection is an ordered set of independent ragged columns: each
//! column is a sequence of `f64` scalars, columns may have different lengths,
//! and a column is fetched by position without touching its neighbors. Two
//! parallel collections (one of keys, one of values) feed a
//! [`PeakMatrix`](crate::store::PeakMatrix).
//!
//! Two backends are provided:
//!
//! - [`MemoryColumns`]: plain in-memory `Vec<Vec<f64>>`, for small data and
//!   tests.
//! - [`ParquetColumns`]: file-backed, opened lazily. Each logical column is
//!   one `List<Float64>` row in its own Parquet row group, so fetching a
//!   column reads exactly one row group. A [`ParquetHandle`] is a cheap
//!   serializable reference for reopening the same data in another process.
//!
//! Collections are read-only and safe for concurrent access; the trait
//! requires `Send + Sync`.

mod error;
mod memory;
mod parquet;
mod writer;

pub use error::CollectionError;
pub use memory::MemoryColumns;
pub use parquet::{ParquetColumns, ParquetHandle};
pub use writer::{ColumnSetWriter, CompressionType, WriterConfig, WriterStats};

/// Column name used by the ragged Parquet layout
pub const LIST_COLUMN: &str = "values";

/// Random access to independent ragged columns of `f64`
pub trait KeyedCollection: Send + Sync {
    /// Number of columns in the collection
    fn len(&self) -> usize;

    /// `true` when the collection has no columns
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch column `index` without loading any other column
    ///
    /// Fails with [`CollectionError::NotFound`] when `index` is out of
    /// range, and with a backend error when the underlying storage cannot
    /// be read.
    fn column(&self, index: usize) -> Result<Vec<f64>, CollectionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_object_access() {
        let columns: Box<dyn KeyedCollection> =
            Box::new(MemoryColumns::new(vec![vec![1.0, 2.0], vec![]]));
        assert_eq!(columns.len(), 2);
        assert!(!columns.is_empty());
        assert_eq!(columns.column(1).unwrap(), Vec::<f64>::new());
    }
}
