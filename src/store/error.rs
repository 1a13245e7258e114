use crate::axis::AxisError;
use crate::collection::CollectionError;

/// Dimension named by an out-of-range index error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Bin axis (row) dimension
    Row,
    /// Column dimension
    Column,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Row => write!(f, "row"),
            Dimension::Column => write!(f, "column"),
        }
    }
}

/// Errors raised by the binned sparse matrix store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Key and value collections disagree on column count
    #[error("collections disagree on column count: {keys} key columns vs {values} value columns")]
    CollectionMismatch {
        /// Columns in the key collection
        keys: usize,
        /// Columns in the value collection
        values: usize,
    },

    /// A column's key and value sequences have different lengths
    #[error("column {column} length mismatch: {keys_len} keys vs {values_len} values")]
    ShapeMismatch {
        /// The offending column
        column: usize,
        /// Length of the key sequence
        keys_len: usize,
        /// Length of the value sequence
        values_len: usize,
    },

    /// Tolerance is negative or non-finite
    #[error("tolerance must be finite and >= 0, got {tolerance}")]
    NegativeTolerance {
        /// The offending tolerance
        tolerance: f64,
    },

    /// A row or column index is out of bounds
    #[error("{dimension} index {index} out of range [0, {len})")]
    IndexOutOfRange {
        /// Which dimension the index addressed
        dimension: Dimension,
        /// The offending index
        index: usize,
        /// Extent of that dimension
        len: usize,
    },

    /// Bin axis construction failed
    #[error("invalid bin axis: {0}")]
    InvalidBinAxis(#[from] AxisError),

    /// The underlying keyed collection failed
    #[error("collection error: {0}")]
    Collection(#[from] CollectionError),

    /// Store configuration (de)serialization failed
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error reading or writing a store configuration file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
