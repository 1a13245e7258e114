use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{PeakMatrix, StoreError};
use crate::axis::AxisSpec;
use crate::collection::ParquetHandle;
use crate::combine::Combiner;

/// Persistable recipe for rebuilding a file-backed [`PeakMatrix`]
///
/// The store itself defines no persistence format; what is persisted is
/// only how to rebuild it: handles to the two column-set files, the axis
/// recipe, the tolerance, and the combiner identifier. The JSON form is
/// what travels to isolated worker processes.
///
/// ```rust,no_run
/// use peakbin::store::StoreConfig;
///
/// let config = StoreConfig::load("run42.peakbin.json")?;
/// let matrix = config.build()?;
/// println!("{} bins x {} columns", matrix.num_bins(), matrix.num_columns());
/// # Ok::<(), peakbin::store::StoreError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Handle to the key column set
    pub keys: ParquetHandle,
    /// Handle to the value column set
    pub values: ParquetHandle,
    /// Bin axis recipe
    pub axis: AxisSpec,
    /// Inclusion half-width around each bin center
    pub tolerance: f64,
    /// Reduction applied within each bin
    pub combiner: Combiner,
}

impl StoreConfig {
    /// Open both collections and construct the store
    pub fn build(&self) -> Result<PeakMatrix, StoreError> {
        let keys = Arc::new(self.keys.open()?);
        let values = Arc::new(self.values.open()?);
        let axis = self.axis.build()?;
        PeakMatrix::new(keys, values, axis, self.tolerance, self.combiner)
    }

    /// Read a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
