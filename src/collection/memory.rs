use super::{CollectionError, KeyedCollection};

/// In-memory keyed collection backed by `Vec<Vec<f64>>`
///
/// The simplest backend: columns live on the heap and `column` clones the
/// requested one. Suitable for tests and data that fits comfortably in
/// memory; use [`ParquetColumns`](super::ParquetColumns) for out-of-core
/// data.
#[derive(Debug, Clone, Default)]
pub struct MemoryColumns {
    columns: Vec<Vec<f64>>,
}

impl MemoryColumns {
    /// Wrap a set of ragged columns
    pub fn new(columns: Vec<Vec<f64>>) -> Self {
        Self { columns }
    }

    /// Borrow a column without cloning, or `None` when out of range
    pub fn get(&self, index: usize) -> Option<&[f64]> {
        self.columns.get(index).map(Vec::as_slice)
    }
}

impl From<Vec<Vec<f64>>> for MemoryColumns {
    fn from(columns: Vec<Vec<f64>>) -> Self {
        Self::new(columns)
    }
}

impl KeyedCollection for MemoryColumns {
    fn len(&self) -> usize {
        self.columns.len()
    }

    fn column(&self, index: usize) -> Result<Vec<f64>, CollectionError> {
        self.columns
            .get(index)
            .cloned()
            .ok_or(CollectionError::NotFound {
                index,
                len: self.columns.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_columns_keep_their_lengths() {
        let columns = MemoryColumns::new(vec![vec![1.0, 2.0, 3.0], vec![9.0], vec![]]);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns.column(0).unwrap().len(), 3);
        assert_eq!(columns.column(1).unwrap(), vec![9.0]);
        assert!(columns.column(2).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_is_not_found() {
        let columns = MemoryColumns::new(vec![vec![1.0]]);
        let err = columns.column(5).unwrap_err();
        assert!(matches!(
            err,
            CollectionError::NotFound { index: 5, len: 1 }
        ));
    }
}
