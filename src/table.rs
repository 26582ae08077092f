//! Labeled numeric tables and missing-label filtering
//!
//! A [`Table`] is a set of named `f64` columns sharing one row index, stored
//! as an `ndarray::Array2` (rows x columns). Missing values are NaN.

use crate::errors::{ClimDiagError, Result};
use crate::reporting::Reporter;
use ndarray::{Array1, Array2, ArrayView1};

/// Named columns over a shared row index
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl Table {
    /// Create a table from column names and a rows x columns array
    ///
    /// # Errors
    ///
    /// Fails if the number of names does not match the number of columns or
    /// a name is repeated.
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if columns.len() != values.ncols() {
            return Err(ClimDiagError::TableShape(format!(
                "{} column names given for {} columns",
                columns.len(),
                values.ncols()
            )));
        }
        for (idx, name) in columns.iter().enumerate() {
            if columns[..idx].contains(name) {
                return Err(ClimDiagError::TableShape(format!(
                    "duplicate column '{name}'"
                )));
            }
        }
        Ok(Self { columns, values })
    }

    /// Create a table from `(name, values)` pairs
    ///
    /// # Errors
    ///
    /// Fails if the columns differ in length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, |(_, v)| v.len());
        let mut values = Array2::<f64>::zeros((n_rows, columns.len()));
        let mut names = Vec::with_capacity(columns.len());

        for (idx, (name, data)) in columns.into_iter().enumerate() {
            let name = name.into();
            if data.len() != n_rows {
                return Err(ClimDiagError::TableShape(format!(
                    "column '{name}' has {} rows, expected {n_rows}",
                    data.len()
                )));
            }
            values.column_mut(idx).assign(&Array1::from(data));
            names.push(name);
        }

        Self::new(names, values)
    }

    /// Single-column table
    #[must_use]
    pub fn single(name: impl Into<String>, data: Vec<f64>) -> Self {
        let values = Array2::from_shape_fn((data.len(), 1), |(row, _)| data[row]);
        Self {
            columns: vec![name.into()],
            values,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// Values of a column by name
    ///
    /// # Errors
    ///
    /// Returns [`ClimDiagError::ColumnNotFound`] if no such column exists.
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ClimDiagError::ColumnNotFound {
                column: name.to_string(),
            })?;
        Ok(self.values.column(idx))
    }

    /// New table containing the given rows, in the given order
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            values: Array2::from_shape_fn((rows.len(), self.n_cols()), |(row, col)| {
                self.values[[rows[row], col]]
            }),
        }
    }

    /// Whether any value is NaN
    #[must_use]
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }
}

/// Tables are equal when columns and shape match and values agree, with NaN
/// positions treated as equal
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
            && self.values.shape() == other.values.shape()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

/// Output of [`remove_missing_labels`]
pub type FilteredTables = (Option<Table>, Table, Option<Table>);

/// Drop rows whose label is missing from data, label and weights together
///
/// The label table's first (and by convention only) column decides which
/// rows are kept. New tables are returned; the inputs are never touched.
/// When rows are removed, one info diagnostic with their count is reported.
///
/// # Panics
///
/// `data` and `weights`, when given, must have the same number of rows as
/// `label`. Debug builds assert this; release builds panic during row
/// selection when a table is shorter and silently drop trailing rows when
/// it is longer.
pub fn remove_missing_labels(
    data: Option<&Table>,
    label: &Table,
    weights: Option<&Table>,
    reporter: &dyn Reporter,
) -> FilteredTables {
    debug_assert!(data.map_or(true, |d| d.n_rows() == label.n_rows()));
    debug_assert!(weights.map_or(true, |w| w.n_rows() == label.n_rows()));

    let keep: Vec<usize> = if label.n_cols() == 0 {
        (0..label.n_rows()).collect()
    } else {
        label
            .values
            .column(0)
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(|(idx, _)| idx)
            .collect()
    };

    let removed = label.n_rows() - keep.len();
    if removed > 0 {
        reporter.info(&format!(
            "Removed {removed} data point(s) where labels were missing"
        ));
    }

    (
        data.map(|d| d.select_rows(&keep)),
        label.select_rows(&keep),
        weights.map(|w| w.select_rows(&keep)),
    )
}
