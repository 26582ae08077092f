//! Parallel computation implementations for statistical operations
//!
//! Each output element is computed from one lane of the input along the
//! reduced axis; lanes are distributed over the rayon thread pool with
//! `ndarray::Zip`. Non-finite values are skipped.

use crate::errors::{ClimDiagError, Result};
use ndarray::{ArrayD, ArrayView1, Axis, RemoveAxis, Zip};

fn check_axis(data: &ArrayD<f64>, axis: usize) -> Result<()> {
    if axis >= data.ndim() {
        return Err(ClimDiagError::StatisticsError(format!(
            "Axis {axis} is out of bounds for array with {} dimensions",
            data.ndim()
        )));
    }
    Ok(())
}

fn reduced(data: &ArrayD<f64>, axis: usize) -> ArrayD<f64> {
    ArrayD::zeros(data.raw_dim().remove_axis(Axis(axis)))
}

/// Mean of the finite values in a lane, NaN if there are none
#[allow(clippy::cast_precision_loss)]
fn lane_mean(lane: ArrayView1<'_, f64>) -> f64 {
    let (sum, count) = lane
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0_usize), |(s, c), v| (s + v, c + 1));
    if count > 0 {
        sum / count as f64
    } else {
        f64::NAN
    }
}

/// Sample standard deviation of the finite values, NaN below two values
fn lane_std_dev(lane: ArrayView1<'_, f64>) -> f64 {
    let finite: Vec<f64> = lane.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return f64::NAN;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let ss: f64 = finite.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (n - 1.0)).sqrt()
}

/// Pearson correlation over the positions where both lanes are finite
fn lane_pearson(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom > 0.0 {
        cov / denom
    } else {
        f64::NAN
    }
}

/// Computes mean along an axis using parallel processing
///
/// # Errors
///
/// Returns an error if the axis is invalid.
pub fn parallel_mean_axis(data: &ArrayD<f64>, axis: usize) -> Result<ArrayD<f64>> {
    check_axis(data, axis)?;
    let mut result = reduced(data, axis);
    Zip::from(&mut result)
        .and(data.lanes(Axis(axis)))
        .par_for_each(|out, lane| *out = lane_mean(lane));
    Ok(result)
}

/// Computes the sample standard deviation along an axis using parallel processing
///
/// # Errors
///
/// Returns an error if the axis is invalid.
pub fn parallel_std_dev_axis(data: &ArrayD<f64>, axis: usize) -> Result<ArrayD<f64>> {
    check_axis(data, axis)?;
    let mut result = reduced(data, axis);
    Zip::from(&mut result)
        .and(data.lanes(Axis(axis)))
        .par_for_each(|out, lane| *out = lane_std_dev(lane));
    Ok(result)
}

/// Pearson correlation coefficient between two fields along an axis
///
/// Only positions where both fields are finite contribute. Lanes with fewer
/// than two such positions, or zero variance, yield NaN.
///
/// # Errors
///
/// Returns an error if the shapes differ or the axis is invalid.
pub fn pearson_along_axis(a: &ArrayD<f64>, b: &ArrayD<f64>, axis: usize) -> Result<ArrayD<f64>> {
    if a.shape() != b.shape() {
        return Err(ClimDiagError::StatisticsError(format!(
            "Cannot correlate fields of shapes {:?} and {:?}",
            a.shape(),
            b.shape()
        )));
    }
    check_axis(a, axis)?;

    let mut result = reduced(a, axis);
    Zip::from(&mut result)
        .and(a.lanes(Axis(axis)))
        .and(b.lanes(Axis(axis)))
        .par_for_each(|out, lane_a, lane_b| *out = lane_pearson(lane_a, lane_b));
    Ok(result)
}
