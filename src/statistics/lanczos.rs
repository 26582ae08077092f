//! Lanczos low-pass filtering along the time axis

use crate::errors::{ClimDiagError, Result};
use ndarray::{ArrayD, Axis, IxDyn, Slice};
use std::f64::consts::PI;

/// Lanczos low-pass filter weights
///
/// `window` is the filter length in time steps and `cutoff` the cutoff
/// frequency in inverse time steps. The returned weights have odd length
/// and are normalised to sum to one.
///
/// # Errors
///
/// Fails for an empty window, a window too large to allocate, a cutoff
/// outside `(0, 0.5]`, or weights that cannot be normalised.
#[allow(clippy::cast_precision_loss)]
pub fn low_pass_weights(window: usize, cutoff: f64) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(ClimDiagError::StatisticsError(
            "Lanczos window must contain at least one time step".to_string(),
        ));
    }
    if !(cutoff > 0.0 && cutoff <= 0.5) {
        return Err(ClimDiagError::StatisticsError(format!(
            "Lanczos cutoff must lie in (0, 0.5], got {cutoff}"
        )));
    }

    let order = ((window - 1) / 2) + 1;
    let nwts = order
        .checked_mul(2)
        .and_then(|w| w.checked_add(1))
        .ok_or_else(|| window_too_large(window))?;
    let n = nwts / 2;
    let mut weights: Vec<f64> = Vec::new();
    weights
        .try_reserve_exact(nwts)
        .map_err(|_| window_too_large(window))?;
    weights.resize(nwts, 0.0);
    weights[n] = 2.0 * cutoff;

    for k in 1..n {
        let kf = k as f64;
        let nf = n as f64;
        let sigma = (PI * kf / nf).sin() * nf / (PI * kf);
        let first_factor = (2.0 * PI * cutoff * kf).sin() / (PI * kf);
        weights[n - k] = first_factor * sigma;
        weights[n + k] = first_factor * sigma;
    }

    // the outermost weights are zero by construction
    let mut weights = weights[1..nwts - 1].to_vec();
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(ClimDiagError::StatisticsError(format!(
            "Lanczos weights sum to {total}, cannot normalise"
        )));
    }
    for w in &mut weights {
        *w /= total;
    }
    Ok(weights)
}

fn window_too_large(window: usize) -> ClimDiagError {
    ClimDiagError::StatisticsError(format!("Lanczos window of {window} is too large"))
}

/// Number of time steps per day for a dataset frequency
///
/// # Errors
///
/// Returns an error for sub-daily frequencies not listed here or for
/// frequencies coarser than a day.
pub fn steps_per_day(frequency: &str) -> Result<usize> {
    match frequency {
        "day" => Ok(1),
        "6hr" | "6hrPt" => Ok(4),
        "3hr" | "3hrPt" => Ok(8),
        "1hr" | "1hrPt" => Ok(24),
        other => Err(ClimDiagError::StatisticsError(format!(
            "Unsupported frequency '{other}' for Lanczos filtering"
        ))),
    }
}

/// Filter weights for a window given in days
///
/// The cutoff is one cycle per window.
///
/// # Errors
///
/// See [`steps_per_day`] and [`low_pass_weights`].
pub fn filter_weights(window_days: usize, frequency: &str) -> Result<Vec<f64>> {
    let steps = window_days
        .checked_mul(steps_per_day(frequency)?)
        .ok_or_else(|| window_too_large(window_days))?;
    #[allow(clippy::cast_precision_loss)]
    let cutoff = 1.0 / steps.max(2) as f64;
    low_pass_weights(steps, cutoff)
}

/// Apply weights as a rolling window along the leading axis
///
/// The output is shorter than the input by `weights.len() - 1` steps; output
/// step `t` is `sum_k weights[k] * data[t + k]`.
///
/// # Errors
///
/// Fails if `data` has no axes, `weights` is empty, or the time axis is
/// shorter than the window.
pub fn lanczos_filter(data: &ArrayD<f64>, weights: &[f64]) -> Result<ArrayD<f64>> {
    if data.ndim() == 0 {
        return Err(ClimDiagError::StatisticsError(
            "Cannot filter a scalar field".to_string(),
        ));
    }
    if weights.is_empty() {
        return Err(ClimDiagError::StatisticsError(
            "No filter weights given".to_string(),
        ));
    }
    let n_times = data.len_of(Axis(0));
    if n_times < weights.len() {
        return Err(ClimDiagError::StatisticsError(format!(
            "Time axis of length {n_times} is shorter than the filter window {}",
            weights.len()
        )));
    }

    let out_len = n_times - weights.len() + 1;
    let mut shape = data.shape().to_vec();
    shape[0] = out_len;
    let mut filtered = ArrayD::<f64>::zeros(IxDyn(&shape));

    for (k, &weight) in weights.iter().enumerate() {
        let window = data.slice_axis(Axis(0), Slice::from(k..k + out_len));
        filtered.scaled_add(weight, &window);
    }
    Ok(filtered)
}
