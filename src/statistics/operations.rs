//! Core statistical operations and traits
//!
//! This module defines the fundamental types and traits for statistical operations.

use crate::errors::{ClimDiagError, Result};
use ndarray::ArrayD;

/// Supported statistical operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatOperation {
    /// Arithmetic mean
    Mean,
    /// Sample standard deviation (one delta degree of freedom)
    StdDev,
}

impl StatOperation {
    /// Get the string representation of the operation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::StdDev => "standard_deviation",
        }
    }
}

/// Trait for types that can perform statistical reductions along an axis
pub trait StatisticalReduction<T> {
    /// Perform a statistical reduction along the specified axis
    ///
    /// # Errors
    ///
    /// Returns an error if the axis is out of bounds for the array.
    fn reduce_along_axis(&self, axis: usize, operation: StatOperation) -> Result<ArrayD<T>>;
}

impl StatisticalReduction<f64> for ArrayD<f64> {
    fn reduce_along_axis(&self, axis: usize, operation: StatOperation) -> Result<ArrayD<f64>> {
        if axis >= self.ndim() {
            return Err(ClimDiagError::StatisticsError(format!(
                "Axis {axis} is out of bounds for array with {} dimensions",
                self.ndim()
            )));
        }

        match operation {
            StatOperation::Mean => super::parallel::parallel_mean_axis(self, axis),
            StatOperation::StdDev => super::parallel::parallel_std_dev_axis(self, axis),
        }
    }
}
