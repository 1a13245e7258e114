//! # peakbin CLI
//!
//! A command-line tool for working with ragged column sets and binned
//! sparse peak matrices.
//!
//! ## Usage
//!
//! ```bash
//! # Generate a synthetic ragged run (keys.parquet + values.parquet)
//! peakbin demo run/
//!
//! # Inspect a column set pair
//! peakbin info run/
//!
//! # Bin the run onto an even axis and print the dense matrix
//! peakbin bin run/ --start 100 --stop 110 --step 0.5 --tolerance 0.25 --combiner sum
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use peakbin::axis::{AxisSpec, BinAxis};
use peakbin::collection::{ColumnSetWriter, KeyedCollection, ParquetColumns, WriterConfig};
use peakbin::combine::Combiner;
use peakbin::parallel::Backend;
use peakbin::store::{PeakMatrix, StoreConfig};

/// peakbin - Out-of-Core Binned Sparse Peak Matrices
#[derive(Parser)]
#[command(name = "peakbin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic ragged run for experimentation
    Demo {
        /// Output directory for keys.parquet and values.parquet
        #[arg(value_name = "DIR", default_value = "demo_run")]
        dir: PathBuf,

        /// Number of columns (e.g. spectra) to generate
        #[arg(short = 'n', long, default_value = "8")]
        columns: usize,
    },

    /// Print column count and per-column lengths of a run
    Info {
        /// Directory holding keys.parquet and values.parquet
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Bin a run onto an axis and print the dense matrix as CSV
    Bin {
        /// Directory holding keys.parquet and values.parquet
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// First bin center (defaults to the smallest key in the run)
        #[arg(long)]
        start: Option<f64>,

        /// Upper bound for the last bin center (defaults to the largest key)
        #[arg(long)]
        stop: Option<f64>,

        /// Distance between adjacent bin centers
        #[arg(long, default_value = "1.0")]
        step: f64,

        /// Inclusion half-width around each bin center
        #[arg(short, long, default_value = "0.5")]
        tolerance: f64,

        /// Reduction per bin: sum, mean, min, max, or count
        #[arg(short, long, default_value = "sum")]
        combiner: Combiner,

        /// Worker threads (0 = sequential, unset = all cores)
        #[arg(long)]
        threads: Option<usize>,

        /// Also write the store configuration as JSON to this path
        #[arg(long, value_name = "FILE")]
        save_config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Demo { dir, columns } => run_demo(dir, columns),
        Commands::Info { dir } => run_info(dir),
        Commands::Bin {
            dir,
            start,
            stop,
            step,
            tolerance,
            combiner,
            threads,
            save_config,
        } => run_bin(dir, start, stop, step, tolerance, combiner, threads, save_config),
    }
}

fn open_run(dir: &PathBuf) -> Result<(ParquetColumns, ParquetColumns)> {
    let keys = ParquetColumns::open(dir.join("keys.parquet"))
        .with_context(|| format!("opening {}/keys.parquet", dir.display()))?;
    let values = ParquetColumns::open(dir.join("values.parquet"))
        .with_context(|| format!("opening {}/values.parquet", dir.display()))?;
    Ok((keys, values))
}

fn run_demo(dir: PathBuf, columns: usize) -> Result<()> {
    if columns == 0 {
        bail!("demo run needs at least one column");
    }
    std::fs::create_dir_all(&dir)?;

    // Deterministic pseudo-random peaks so demo runs are reproducible.
    let mut state: u64 = 0x5eed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    let mut key_columns = Vec::with_capacity(columns);
    let mut value_columns = Vec::with_capacity(columns);
    for _ in 0..columns {
        let peaks = 20 + (next() * 60.0) as usize;
        let mut keys: Vec<f64> = (0..peaks).map(|_| 100.0 + next() * 50.0).collect();
        keys.sort_by(|a, b| a.total_cmp(b));
        let values: Vec<f64> = (0..peaks).map(|_| (next() * 10_000.0).round()).collect();
        key_columns.push(keys);
        value_columns.push(values);
    }

    let key_stats =
        ColumnSetWriter::write_all(dir.join("keys.parquet"), &key_columns, WriterConfig::default())?;
    let value_stats = ColumnSetWriter::write_all(
        dir.join("values.parquet"),
        &value_columns,
        WriterConfig::default(),
    )?;
    info!("keys: {}", key_stats);
    info!("values: {}", value_stats);

    println!(
        "Wrote {} columns ({} peaks) to {}",
        columns, key_stats.values_written, dir.display()
    );
    Ok(())
}

fn run_info(dir: PathBuf) -> Result<()> {
    let (keys, values) = open_run(&dir)?;
    if keys.len() != values.len() {
        bail!(
            "column count mismatch: {} key columns vs {} value columns",
            keys.len(),
            values.len()
        );
    }

    println!("Run: {}", dir.display());
    println!("Columns: {}", keys.len());
    let mut total = 0usize;
    for c in 0..keys.len() {
        let len = keys.column(c)?.len();
        total += len;
        println!("  column {:>4}: {:>8} peaks", c, len);
    }
    println!("Total peaks: {}", total);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_bin(
    dir: PathBuf,
    start: Option<f64>,
    stop: Option<f64>,
    step: f64,
    tolerance: f64,
    combiner: Combiner,
    threads: Option<usize>,
    save_config: Option<PathBuf>,
) -> Result<()> {
    let (keys, values) = open_run(&dir)?;

    let axis = match (start, stop) {
        (Some(start), Some(stop)) => BinAxis::from_range(start, stop, step)?,
        _ => {
            // Derive the span from the data: one pass over all key columns.
            info!("deriving bin axis span from {} key columns", keys.len());
            let mut all_keys = Vec::new();
            for c in 0..keys.len() {
                all_keys.extend(keys.column(c)?);
            }
            let derived = BinAxis::spanning(all_keys, step)?;
            BinAxis::from_range(
                start.unwrap_or_else(|| derived.centers()[0]),
                stop.unwrap_or_else(|| derived.centers()[derived.len() - 1]),
                step,
            )?
        }
    };
    info!("bin axis: {} centers, step {}", axis.len(), step);

    if let Some(path) = &save_config {
        let config = StoreConfig {
            keys: keys.handle(),
            values: values.handle(),
            axis: AxisSpec::from(&axis),
            tolerance,
            combiner,
        };
        config.save(path)?;
        info!("wrote store config to {}", path.display());
    }

    let centers: Vec<f64> = axis.centers().to_vec();
    let matrix = PeakMatrix::new(Arc::new(keys), Arc::new(values), axis, tolerance, combiner)?;

    let backend = match threads {
        Some(0) => Backend::Sequential,
        threads => Backend::Rayon { threads },
    };
    let columns: Vec<Vec<Option<f64>>> = matrix
        .columns_with(&backend)
        .into_iter()
        .enumerate()
        .map(|(c, result)| result.with_context(|| format!("binning column {}", c)))
        .collect::<Result<_>>()?;

    // Header, then one line per bin.
    let header: Vec<String> = (0..columns.len()).map(|c| format!("col{}", c)).collect();
    println!("bin,{}", header.join(","));
    for (r, center) in centers.iter().enumerate() {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| column[r].map(|v| v.to_string()).unwrap_or_default())
            .collect();
        println!("{},{}", center, cells.join(","));
    }
    Ok(())
}
