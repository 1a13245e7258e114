//! # peakbin - Out-of-Core Binned Sparse Peak Matrices
//!
//! `peakbin` exposes ragged, keyed instrument data — independent columns of
//! (coordinate, intensity) pairs with different lengths and unaligned
//! coordinate sets — as a lazy dense-shaped matrix: rows are bin centers,
//! columns are the original data columns, and each cell aggregates every
//! value whose key falls within a tolerance window of the bin center.
//!
//! ## Key Features
//!
//! - **On-access evaluation**: no cell, column, or row is computed until it
//!   is requested, and nothing is cached unless the caller opts into
//!   [`store::MemoColumns`]. Reads are pure functions of immutable inputs.
//!
//! - **Out-of-core storage**: columns live in Apache Parquet files
//!   (`List<Float64>`, one row group per column) and are fetched one at a
//!   time by random access; a serializable handle crosses process
//!   boundaries instead of the data.
//!
//! - **Single-pass binning**: on an evenly spaced axis each key maps
//!   directly to its candidate bin window by index arithmetic, keeping a
//!   full-column materialization at `O(len(column) + bins)`.
//!
//! - **Embarrassingly parallel batches**: per-column work fans out over a
//!   configurable execution backend with order-preserved, per-item error
//!   reporting.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use peakbin::prelude::*;
//!
//! // Two ragged columns of (m/z, intensity) pairs.
//! let keys = Arc::new(MemoryColumns::new(vec![
//!     vec![100.02, 100.55, 101.30],
//!     vec![100.48],
//! ]));
//! let values = Arc::new(MemoryColumns::new(vec![
//!     vec![250.0, 900.0, 40.0],
//!     vec![1200.0],
//! ]));
//!
//! let axis = BinAxis::from_range(100.0, 101.5, 0.5)?;
//! let matrix = PeakMatrix::new(keys, values, axis, 0.25, Combiner::Sum)?;
//!
//! assert_eq!(matrix.num_bins(), 4);
//! assert_eq!(matrix.num_columns(), 2);
//! assert_eq!(matrix.column(1)?, vec![None, Some(1200.0), None, None]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## File-Backed Columns
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use peakbin::prelude::*;
//!
//! let keys = Arc::new(ParquetColumns::open("run/keys.parquet")?);
//! let values = Arc::new(ParquetColumns::open("run/values.parquet")?);
//! let axis = BinAxis::from_range(100.0, 1600.0, 0.01)?;
//! let matrix = PeakMatrix::new(keys, values, axis, 0.005, Combiner::Max)?;
//!
//! // Materialize all columns in parallel; one Result per column.
//! for result in matrix.columns_with(&Backend::default()) {
//!     let column = result?;
//!     println!("{} occupied bins", column.iter().flatten().count());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`axis`]: bin axis construction, validation, and candidate windows
//! - [`combine`]: per-bin reduction functions and their accumulators
//! - [`collection`]: ragged keyed collections, in memory or in Parquet
//! - [`store`]: the lazy binned sparse matrix itself
//! - [`parallel`]: execution backends for per-column batches
//!
//! ## Windowing Semantics
//!
//! The tolerance window is inclusive on both sides: a key at distance
//! exactly `tolerance` from two adjacent centers contributes to both bins,
//! so aggregate totals are not conserved when windows overlap. Candidate
//! bins found by index rounding are always re-checked against the true
//! distance before a value is included. The empty bin sentinel is `None`,
//! never a silent zero.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod axis;
pub mod collection;
pub mod combine;
pub mod parallel;
pub mod store;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::axis::{AxisError, AxisSpec, BinAxis};
    pub use crate::collection::{
        CollectionError, ColumnSetWriter, CompressionType, KeyedCollection, MemoryColumns,
        ParquetColumns, ParquetHandle, WriterConfig, WriterStats,
    };
    pub use crate::combine::Combiner;
    pub use crate::parallel::{map_columns, Backend};
    pub use crate::store::{MemoColumns, PeakMatrix, StoreConfig, StoreError};
}
