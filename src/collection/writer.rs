use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};

use super::{CollectionError, LIST_COLUMN};

/// Compression options for ragged column-set files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// ZSTD compression (recommended, best compression ratio)
    Zstd(i32),
    /// Snappy compression (faster, slightly larger files)
    Snappy,
    /// No compression (fastest write, largest files)
    Uncompressed,
}

impl Default for CompressionType {
    fn default() -> Self {
        // ZSTD level 3 is a good balance of speed and compression
        Self::Zstd(3)
    }
}

/// Configuration for [`ColumnSetWriter`]
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression type to use
    pub compression: CompressionType,

    /// Whether to write statistics for columns
    pub write_statistics: bool,

    /// Name of the `List<Float64>` column in the output file
    pub column_name: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: CompressionType::default(),
            write_statistics: true,
            column_name: LIST_COLUMN.to_string(),
        }
    }
}

impl WriterConfig {
    fn to_writer_properties(&self) -> WriterProperties {
        let compression = match self.compression {
            CompressionType::Zstd(level) => {
                Compression::ZSTD(ZstdLevel::try_new(level).unwrap_or(ZstdLevel::default()))
            }
            CompressionType::Snappy => Compression::SNAPPY,
            CompressionType::Uncompressed => Compression::UNCOMPRESSED,
        };
        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        WriterProperties::builder()
            .set_compression(compression)
            .set_statistics_enabled(statistics)
            // One logical column per row group: random access to a column
            // reads exactly one group.
            .set_max_row_group_size(1)
            .build()
    }

    fn to_schema(&self) -> SchemaRef {
        Arc::new(Schema::new(vec![Field::new_list(
            self.column_name.as_str(),
            Field::new_list_field(DataType::Float64, true),
            false,
        )]))
    }
}

/// Statistics from a completed column-set write
#[derive(Debug, Clone)]
pub struct WriterStats {
    /// Number of logical columns written
    pub columns_written: u64,
    /// Total number of scalar values written
    pub values_written: u64,
    /// Size of the output file in bytes
    pub file_size_bytes: u64,
}

impl std::fmt::Display for WriterStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Wrote {} columns ({} values, {} bytes)",
            self.columns_written, self.values_written, self.file_size_bytes
        )
    }
}

/// Writer for the ragged column-set Parquet layout
///
/// Streams logical columns into a Parquet file readable by
/// [`ParquetColumns`](super::ParquetColumns); each column becomes one
/// `List<Float64>` row in its own row group.
///
/// # Example
///
/// ```rust,no_run
/// use peakbin::collection::{ColumnSetWriter, WriterConfig};
///
/// let mut writer = ColumnSetWriter::create("keys.parquet", WriterConfig::default())?;
/// writer.write_column(&[100.02, 100.55, 101.30])?;
/// writer.write_column(&[100.48])?;
/// let stats = writer.finish()?;
/// println!("{}", stats);
/// # Ok::<(), peakbin::collection::CollectionError>(())
/// ```
pub struct ColumnSetWriter {
    writer: ArrowWriter<File>,
    schema: SchemaRef,
    path: PathBuf,
    columns_written: u64,
    values_written: u64,
}

impl ColumnSetWriter {
    /// Create a new column-set file at `path`
    pub fn create<P: AsRef<Path>>(path: P, config: WriterConfig) -> Result<Self, CollectionError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let schema = config.to_schema();
        let writer = ArrowWriter::try_new(file, schema.clone(), Some(config.to_writer_properties()))?;
        Ok(Self {
            writer,
            schema,
            path,
            columns_written: 0,
            values_written: 0,
        })
    }

    /// Append one logical column (may be empty)
    pub fn write_column(&mut self, column: &[f64]) -> Result<(), CollectionError> {
        let mut builder = ListBuilder::new(Float64Builder::with_capacity(column.len()))
            .with_field(Field::new_list_field(DataType::Float64, true));
        builder.values().append_slice(column);
        builder.append(true);
        let array: ArrayRef = Arc::new(builder.finish());

        let batch = RecordBatch::try_new(self.schema.clone(), vec![array])?;
        self.writer.write(&batch)?;

        self.columns_written += 1;
        self.values_written += column.len() as u64;
        Ok(())
    }

    /// Append every column of a ragged set, in order
    pub fn write_columns<'a, I>(&mut self, columns: I) -> Result<(), CollectionError>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        for column in columns {
            self.write_column(column)?;
        }
        Ok(())
    }

    /// Finalize the file and return write statistics
    pub fn finish(self) -> Result<WriterStats, CollectionError> {
        self.writer.close()?;
        let file_size_bytes = std::fs::metadata(&self.path)?.len();
        debug!(
            "finished column set {} ({} columns, {} values)",
            self.path.display(),
            self.columns_written,
            self.values_written
        );
        Ok(WriterStats {
            columns_written: self.columns_written,
            values_written: self.values_written,
            file_size_bytes,
        })
    }

    /// Write an entire ragged set to `path` in one call
    pub fn write_all<P: AsRef<Path>>(
        path: P,
        columns: &[Vec<f64>],
        config: WriterConfig,
    ) -> Result<WriterStats, CollectionError> {
        let mut writer = Self::create(path, config)?;
        writer.write_columns(columns.iter().map(Vec::as_slice))?;
        writer.finish()
    }
}
