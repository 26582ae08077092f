//! Statistical computations over gridded fields
//!
//! This module provides the reductions, correlations and filters the
//! diagnostics are built from. Fields are `ndarray::ArrayD<f64>` with time
//! as the leading axis; NaN marks missing values.
//!
//! # Organization
//!
//! - [`operations`]: statistical operations and the reduction trait
//! - [`parallel`]: parallel per-lane implementations (mean, std dev, Pearson)
//! - [`lanczos`]: Lanczos low-pass filter weights and filtering
//! - [`time`]: time series with calendar-aware aggregation and seasons

pub mod lanczos;
pub mod operations;
pub mod parallel;
pub mod time;

pub use lanczos::{filter_weights, lanczos_filter, low_pass_weights, steps_per_day};
pub use operations::{StatOperation, StatisticalReduction};
pub use parallel::{parallel_mean_axis, parallel_std_dev_axis, pearson_along_axis};
pub use time::{season_months, AnnualSeries, MonthlyClimatology, TimeSeries};
