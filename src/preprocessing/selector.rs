use tracing::debug;

use crate::dataset::{Table, Value};
use crate::error::{Error, Result};

/// Label and timestamp columns that never act as clustering features.
pub const DEFAULT_DROP_COLUMNS: &[&str] = &["Class", "Time"];

#[derive(Clone, Debug)]
pub struct FeatureSelector {
    drop_columns: Vec<String>,
}

impl FeatureSelector {
    pub fn new() -> Self {
        Self {
            drop_columns: DEFAULT_DROP_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Replace the exact, case-sensitive names removed before selection.
    pub fn drop_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = names.into_iter().map(Into::into).collect();
        self
    }

    /// Remove the named non-feature columns, leaving everything else untouched.
    pub fn drop_named(&self, table: &Table) -> Table {
        let keep: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, name)| !self.drop_columns.contains(name))
            .map(|(i, _)| i)
            .collect();

        table.select_columns(&keep)
    }

    /// Reduce a table to complete, purely numeric feature columns.
    pub fn select(&self, table: &Table) -> Result<Table> {
        let named = self.drop_named(table);

        let mut keep = Vec::new();
        let mut dropped: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| self.drop_columns.contains(c))
            .cloned()
            .collect();

        for (idx, name) in named.columns().iter().enumerate() {
            if is_numeric_column(&named, idx) {
                keep.push(idx);
            } else {
                dropped.push(name.clone());
            }
        }

        if keep.is_empty() {
            return Err(Error::NoFeatures { dropped });
        }

        let mut selected = named.select_columns(&keep);
        let before = selected.n_rows();
        selected.retain_rows(|row| !row.iter().any(Value::is_missing));

        debug!(
            kept = ?selected.columns(),
            dropped = ?dropped,
            rows_removed = before - selected.n_rows(),
            "feature selection"
        );

        if selected.n_rows() == 0 {
            return Err(Error::NoSamples);
        }

        Ok(selected)
    }
}

impl Default for FeatureSelector {
    fn default() -> Self {
        Self::new()
    }
}

// A column holding nothing but missing cells carries no feature.
fn is_numeric_column(table: &Table, idx: usize) -> bool {
    let mut seen_number = false;
    for value in table.column(idx) {
        match value {
            Value::Number(_) => seen_number = true,
            Value::Missing => {}
            Value::Text(_) => return false,
        }
    }
    seen_number
}
