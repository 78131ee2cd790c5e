//! Column-oriented numeric data sets.

use crate::error::{EstimatorError, Result};

/// Named `f64` columns sharing one row count. Discrete variables are stored
/// as their numeric state codes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    columns: Vec<(String, Vec<f64>)>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a data set from `(name, values)` pairs.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut data = Self::new();
        for (name, values) in columns {
            data.push_column(name, values)?;
        }
        Ok(data)
    }

    /// Appends a column. The first column fixes the row count.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if self.columns.iter().any(|(existing, _)| *existing == name) {
            return Err(EstimatorError::DuplicateColumn(name));
        }
        if let Some((_, first)) = self.columns.first() {
            if first.len() != values.len() {
                return Err(EstimatorError::RaggedColumns {
                    column: name,
                    expected: first.len(),
                    actual: values.len(),
                });
            }
        }
        self.columns.push((name, values));
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |(_, values)| values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
            .ok_or_else(|| EstimatorError::UnknownColumn(name.to_string()))
    }

    /// Distinct values of a column in ascending order.
    pub fn states(&self, name: &str) -> Result<Vec<f64>> {
        let mut states = self.column(name)?.to_vec();
        states.sort_by(|a, b| a.total_cmp(b));
        states.dedup_by(|a, b| a.total_cmp(b).is_eq());
        Ok(states)
    }
}
