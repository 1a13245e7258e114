/// Errors that can occur while reading a keyed collection
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// Requested column index does not exist in the collection
    #[error("column {index} not found (collection has {len} columns)")]
    NotFound {
        /// Requested column index
        index: usize,
        /// Number of columns actually present
        len: usize,
    },

    /// I/O error from the backing file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// Backing file does not have the expected ragged-column layout
    #[error("invalid column-set format: {0}")]
    InvalidFormat(String),
}
