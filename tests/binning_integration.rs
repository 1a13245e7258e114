//! End-to-end test: write a ragged run to Parquet, rebuild the store from a
//! persisted configuration, and check parallel binning against an
//! in-memory reference.

use std::sync::Arc;

use peakbin::axis::{AxisSpec, BinAxis};
use peakbin::collection::{ColumnSetWriter, MemoryColumns, ParquetColumns, WriterConfig};
use peakbin::combine::Combiner;
use peakbin::parallel::Backend;
use peakbin::store::{PeakMatrix, StoreConfig};
use tempfile::tempdir;

fn synthetic_run(columns: usize) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut keys = Vec::with_capacity(columns);
    let mut values = Vec::with_capacity(columns);
    for c in 0..columns {
        let len = (c * 13) % 37; // ragged, includes an empty column at c = 0
        let column_keys: Vec<f64> = (0..len)
            .map(|p| 100.0 + ((c * 31 + p * 17) % 500) as f64 / 10.0)
            .collect();
        let column_values: Vec<f64> = (0..len).map(|p| (p + c) as f64).collect();
        keys.push(column_keys);
        values.push(column_values);
    }
    (keys, values)
}

#[test]
fn parquet_run_matches_in_memory_reference() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let keys_path = dir.path().join("keys.parquet");
    let values_path = dir.path().join("values.parquet");

    let (key_columns, value_columns) = synthetic_run(12);
    ColumnSetWriter::write_all(&keys_path, &key_columns, WriterConfig::default())?;
    ColumnSetWriter::write_all(&values_path, &value_columns, WriterConfig::default())?;

    let axis = BinAxis::from_range(100.0, 150.0, 0.5)?;
    let tolerance = 0.25;

    let file_matrix = PeakMatrix::new(
        Arc::new(ParquetColumns::open(&keys_path)?),
        Arc::new(ParquetColumns::open(&values_path)?),
        axis.clone(),
        tolerance,
        Combiner::Sum,
    )?;
    let memory_matrix = PeakMatrix::new(
        Arc::new(MemoryColumns::new(key_columns)),
        Arc::new(MemoryColumns::new(value_columns)),
        axis,
        tolerance,
        Combiner::Sum,
    )?;

    assert_eq!(file_matrix.num_columns(), 12);
    assert_eq!(file_matrix.num_bins(), memory_matrix.num_bins());

    let backend = Backend::Rayon { threads: Some(4) };
    let from_file = file_matrix.columns_with(&backend);
    let reference = memory_matrix.dense()?;
    for (c, result) in from_file.into_iter().enumerate() {
        assert_eq!(result?, reference[c], "column {}", c);
    }

    // The empty column is all sentinel.
    assert!(reference[0].iter().all(Option::is_none));
    Ok(())
}

#[test]
fn store_config_round_trip_rebuilds_the_matrix() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let keys_path = dir.path().join("keys.parquet");
    let values_path = dir.path().join("values.parquet");
    let config_path = dir.path().join("store.json");

    ColumnSetWriter::write_all(
        &keys_path,
        &[vec![1.0, 2.0, 3.0]],
        WriterConfig::default(),
    )?;
    ColumnSetWriter::write_all(
        &values_path,
        &[vec![10.0, 20.0, 30.0]],
        WriterConfig::default(),
    )?;

    let config = StoreConfig {
        keys: ParquetColumns::open(&keys_path)?.handle(),
        values: ParquetColumns::open(&values_path)?.handle(),
        axis: AxisSpec::Centers(vec![1.5, 2.5]),
        tolerance: 0.5,
        combiner: Combiner::Sum,
    };
    config.save(&config_path)?;

    let reloaded = StoreConfig::load(&config_path)?;
    assert_eq!(reloaded, config);

    let matrix = reloaded.build()?;
    assert_eq!(matrix.column(0)?, vec![Some(30.0), Some(50.0)]);
    Ok(())
}

#[test]
fn shape_mismatch_detected_on_file_backed_pairs() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let keys_path = dir.path().join("keys.parquet");
    let values_path = dir.path().join("values.parquet");

    // Value column 1 is shorter than its key column; construction must
    // refuse the pair.
    ColumnSetWriter::write_all(
        &keys_path,
        &[vec![1.0], vec![1.0, 2.0]],
        WriterConfig::default(),
    )?;
    ColumnSetWriter::write_all(
        &values_path,
        &[vec![5.0], vec![5.0]],
        WriterConfig::default(),
    )?;

    let axis = BinAxis::from_range(0.0, 3.0, 1.0)?;
    let err = PeakMatrix::new(
        Arc::new(ParquetColumns::open(&keys_path)?),
        Arc::new(ParquetColumns::open(&values_path)?),
        axis,
        0.5,
        Combiner::Sum,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        peakbin::store::StoreError::ShapeMismatch { column: 1, .. }
    ));
    Ok(())
}
