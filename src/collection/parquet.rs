use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{Array, Float64Array, ListArray};
use arrow::datatypes::DataType;
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};

use super::{CollectionError, KeyedCollection, LIST_COLUMN};

/// File-backed keyed collection over a ragged Parquet layout
///
/// The layout is a single `List<Float64>` column: logical column `i` of the
/// collection is row `i` of the file. Files written by
/// [`ColumnSetWriter`](super::ColumnSetWriter) place one row per row group,
/// so fetching a column decompresses exactly one row group; files produced
/// by other tools with larger row groups are still readable through a
/// streaming fallback.
///
/// Opening is lazy: the constructor only inspects the footer (schema and
/// row count). Every `column` call reopens the file, which keeps the
/// collection free of shared mutable state and safe for concurrent reads.
#[derive(Debug, Clone)]
pub struct ParquetColumns {
    path: PathBuf,
    column_name: String,
    len: usize,
    one_row_per_group: bool,
}

impl ParquetColumns {
    /// Open a ragged column set, expecting the default `values` list column
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CollectionError> {
        Self::open_with_column(path, LIST_COLUMN)
    }

    /// Open a ragged column set with a custom list column name
    pub fn open_with_column<P: AsRef<Path>>(
        path: P,
        column_name: &str,
    ) -> Result<Self, CollectionError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

        let field = builder
            .schema()
            .field_with_name(column_name)
            .map_err(|_| {
                CollectionError::InvalidFormat(format!(
                    "{}: missing list column {:?}",
                    path.display(),
                    column_name
                ))
            })?;
        let item_ok = match field.data_type() {
            DataType::List(item) | DataType::LargeList(item) => {
                matches!(item.data_type(), DataType::Float64)
            }
            _ => false,
        };
        if !item_ok {
            return Err(CollectionError::InvalidFormat(format!(
                "{}: column {:?} is not List<Float64>, got {}",
                path.display(),
                column_name,
                field.data_type()
            )));
        }

        let metadata = builder.metadata();
        let num_rows = metadata.file_metadata().num_rows();
        if num_rows < 0 {
            return Err(CollectionError::InvalidFormat(format!(
                "{}: negative row count in footer",
                path.display()
            )));
        }
        let len = num_rows as usize;
        let one_row_per_group = metadata.num_row_groups() == len;

        debug!(
            "opened column set {} ({} columns, row-group random access: {})",
            path.display(),
            len,
            one_row_per_group
        );

        Ok(Self {
            path,
            column_name: column_name.to_string(),
            len,
            one_row_per_group,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cheap serializable reference to this collection
    pub fn handle(&self) -> ParquetHandle {
        ParquetHandle {
            path: self.path.clone(),
            column: self.column_name.clone(),
        }
    }

    fn read_row(&self, index: usize) -> Result<Vec<f64>, CollectionError> {
        let file = File::open(&self.path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

        // One row group per row: read only that group, the row is its first.
        let (reader, mut remaining) = if self.one_row_per_group {
            (builder.with_row_groups(vec![index]).build()?, 0usize)
        } else {
            (builder.build()?, index)
        };

        for batch in reader {
            let batch = batch?;
            if remaining >= batch.num_rows() {
                remaining -= batch.num_rows();
                continue;
            }
            let list = batch
                .column_by_name(&self.column_name)
                .ok_or_else(|| {
                    CollectionError::InvalidFormat(format!(
                        "batch is missing column {:?}",
                        self.column_name
                    ))
                })?
                .as_any()
                .downcast_ref::<ListArray>()
                .ok_or_else(|| {
                    CollectionError::InvalidFormat(format!(
                        "column {:?} is not a ListArray",
                        self.column_name
                    ))
                })?;
            if list.is_null(remaining) {
                // A null list row is an absent column, not an empty one.
                return Err(CollectionError::NotFound {
                    index,
                    len: self.len,
                });
            }
            let values = list.value(remaining);
            let floats = values
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| {
                    CollectionError::InvalidFormat(format!(
                        "column {:?} items are not Float64",
                        self.column_name
                    ))
                })?;
            return Ok(floats.iter().map(|v| v.unwrap_or(f64::NAN)).collect());
        }

        // Footer promised more rows than the data pages delivered.
        Err(CollectionError::InvalidFormat(format!(
            "{}: file truncated, row {} missing",
            self.path.display(),
            index
        )))
    }
}

impl KeyedCollection for ParquetColumns {
    fn len(&self) -> usize {
        self.len
    }

    fn column(&self, index: usize) -> Result<Vec<f64>, CollectionError> {
        if index >= self.len {
            return Err(CollectionError::NotFound {
                index,
                len: self.len,
            });
        }
        self.read_row(index)
    }
}

/// Serializable reference to a [`ParquetColumns`] backing file
///
/// Handles are what crosses process boundaries: workers receive the path
/// and column name, not the data, and reopen the collection locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParquetHandle {
    /// Path to the Parquet file
    pub path: PathBuf,
    /// Name of the `List<Float64>` column
    pub column: String,
}

impl ParquetHandle {
    /// Reopen the collection this handle refers to
    pub fn open(&self) -> Result<ParquetColumns, CollectionError> {
        ParquetColumns::open_with_column(&self.path, &self.column)
    }
}
