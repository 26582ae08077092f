//! Time series with calendar-aware aggregation
//!
//! A [`TimeSeries`] pairs a field whose leading axis is time with one
//! timestamp per step.

use super::parallel::parallel_mean_axis;
use crate::errors::{ClimDiagError, Result};
use chrono::{Datelike, NaiveDateTime};
use ndarray::{stack, ArrayD, ArrayView, Axis, IxDyn, Slice};
use std::collections::BTreeMap;

const MONTH_INITIALS: &str = "JFMAMJJASONDJFMAMJJASOND";

/// Months (1-12) of a season given by consecutive month initials, e.g. `JJA`
///
/// # Errors
///
/// Fails if the initials do not spell 2 to 12 consecutive months.
pub fn season_months(season: &str) -> Result<Vec<u32>> {
    let upper = season.to_uppercase();
    let invalid = || ClimDiagError::TimeAxis(format!("Invalid season '{season}'"));
    if !(2..=12).contains(&upper.len()) {
        return Err(invalid());
    }
    let start = MONTH_INITIALS.find(&upper).ok_or_else(invalid)?;
    #[allow(clippy::cast_possible_truncation)]
    let months = (start..start + upper.len())
        .map(|i| (i % 12) as u32 + 1)
        .collect();
    Ok(months)
}

/// Field with a leading time axis
#[derive(Debug, Clone)]
pub struct TimeSeries {
    times: Vec<NaiveDateTime>,
    data: ArrayD<f64>,
}

/// Mean per calendar month, months in order of first appearance
#[derive(Debug, Clone)]
pub struct MonthlyClimatology {
    pub months: Vec<u32>,
    pub data: ArrayD<f64>,
}

/// One value per (season) year, years ascending
#[derive(Debug, Clone)]
pub struct AnnualSeries {
    pub years: Vec<i32>,
    pub data: ArrayD<f64>,
}

impl TimeSeries {
    /// # Errors
    ///
    /// Fails if `data` has no time axis or its length differs from `times`.
    pub fn new(times: Vec<NaiveDateTime>, data: ArrayD<f64>) -> Result<Self> {
        if data.ndim() == 0 {
            return Err(ClimDiagError::TimeAxis(
                "Field has no leading time axis".to_string(),
            ));
        }
        if data.len_of(Axis(0)) != times.len() {
            return Err(ClimDiagError::TimeAxis(format!(
                "{} time points given for a time axis of length {}",
                times.len(),
                data.len_of(Axis(0))
            )));
        }
        Ok(Self { times, data })
    }

    #[must_use]
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    #[must_use]
    pub const fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Same time axis, new data
    ///
    /// # Errors
    ///
    /// Fails if the new data does not match the time axis.
    pub fn with_data(&self, data: ArrayD<f64>) -> Result<Self> {
        Self::new(self.times.clone(), data)
    }

    /// Drop `steps` time steps from both ends
    ///
    /// # Errors
    ///
    /// Fails if nothing would remain.
    pub fn trim(&self, steps: usize) -> Result<Self> {
        if 2 * steps >= self.len() {
            return Err(ClimDiagError::TimeAxis(format!(
                "Cannot trim {steps} steps from both ends of {} time points",
                self.len()
            )));
        }
        let range = steps..self.len() - steps;
        Ok(Self {
            times: self.times[range.clone()].to_vec(),
            data: self.data.slice_axis(Axis(0), Slice::from(range)).to_owned(),
        })
    }

    /// Element-wise combination of two series on the same time axis
    ///
    /// # Errors
    ///
    /// Fails if the time axes or shapes differ.
    pub fn combine<F>(&self, other: &Self, f: F) -> Result<Self>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_aligned(other)?;
        let mut data = self.data.clone();
        data.zip_mut_with(&other.data, |a, &b| *a = f(*a, b));
        Ok(Self {
            times: self.times.clone(),
            data,
        })
    }

    /// Ensure both series share time points and shape
    ///
    /// # Errors
    ///
    /// Returns [`ClimDiagError::TimeAxis`] on mismatch.
    pub fn check_aligned(&self, other: &Self) -> Result<()> {
        if self.times != other.times {
            return Err(ClimDiagError::TimeAxis(
                "Time coordinates of the two fields differ".to_string(),
            ));
        }
        if self.data.shape() != other.data.shape() {
            return Err(ClimDiagError::TimeAxis(format!(
                "Field shapes {:?} and {:?} differ",
                self.data.shape(),
                other.data.shape()
            )));
        }
        Ok(())
    }

    fn select_steps(&self, steps: &[usize]) -> Self {
        Self {
            times: steps.iter().map(|&i| self.times[i]).collect(),
            data: self.data.select(Axis(0), steps),
        }
    }

    /// Mean over all steps falling in the same calendar month
    ///
    /// # Errors
    ///
    /// Fails on an empty series.
    pub fn aggregate_by_month(&self) -> Result<MonthlyClimatology> {
        if self.is_empty() {
            return Err(ClimDiagError::TimeAxis(
                "Cannot aggregate an empty time series".to_string(),
            ));
        }

        let mut months: Vec<u32> = Vec::new();
        let mut steps: Vec<Vec<usize>> = Vec::new();
        for (idx, time) in self.times.iter().enumerate() {
            let month = time.month();
            match months.iter().position(|&m| m == month) {
                Some(pos) => steps[pos].push(idx),
                None => {
                    months.push(month);
                    steps.push(vec![idx]);
                }
            }
        }

        let means = steps
            .iter()
            .map(|s| parallel_mean_axis(&self.data.select(Axis(0), s), 0))
            .collect::<Result<Vec<_>>>()?;
        Ok(MonthlyClimatology {
            months,
            data: stack_steps(&means)?,
        })
    }

    /// Steps whose month lies in `season`
    ///
    /// # Errors
    ///
    /// Fails for an invalid season or if no step falls in it.
    pub fn extract_season(&self, season: &str) -> Result<Self> {
        let months = season_months(season)?;
        let steps: Vec<usize> = self
            .times
            .iter()
            .enumerate()
            .filter(|(_, t)| months.contains(&t.month()))
            .map(|(i, _)| i)
            .collect();
        if steps.is_empty() {
            return Err(ClimDiagError::TimeAxis(format!(
                "No time points fall in season '{season}'"
            )));
        }
        Ok(self.select_steps(&steps))
    }

    /// Mean over `season` for each season year
    ///
    /// Seasons that wrap the calendar year (e.g. `DJF`) are assigned to the
    /// year in which they end.
    ///
    /// # Errors
    ///
    /// Fails for an invalid season or if no step falls in it.
    pub fn seasonal_means(&self, season: &str) -> Result<AnnualSeries> {
        let months = season_months(season)?;
        let first = months[0];
        let wraps = months.windows(2).any(|w| w[1] < w[0]);

        let mut by_year: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (idx, time) in self.times.iter().enumerate() {
            let month = time.month();
            if !months.contains(&month) {
                continue;
            }
            let year = if wraps && month >= first {
                time.year() + 1
            } else {
                time.year()
            };
            by_year.entry(year).or_default().push(idx);
        }
        if by_year.is_empty() {
            return Err(ClimDiagError::TimeAxis(format!(
                "No time points fall in season '{season}'"
            )));
        }

        let means = by_year
            .values()
            .map(|s| parallel_mean_axis(&self.data.select(Axis(0), s), 0))
            .collect::<Result<Vec<_>>>()?;
        Ok(AnnualSeries {
            years: by_year.keys().copied().collect(),
            data: stack_steps(&means)?,
        })
    }
}

impl AnnualSeries {
    /// Restrict two series to their common years
    ///
    /// # Errors
    ///
    /// Fails if the series share no year.
    pub fn align(&self, other: &Self) -> Result<(Vec<i32>, ArrayD<f64>, ArrayD<f64>)> {
        let mut years = Vec::new();
        let mut left = Vec::new();
        let mut right = Vec::new();
        for (i, year) in self.years.iter().enumerate() {
            if let Some(j) = other.years.iter().position(|y| y == year) {
                years.push(*year);
                left.push(i);
                right.push(j);
            }
        }
        if years.is_empty() {
            return Err(ClimDiagError::TimeAxis(
                "Annual series have no year in common".to_string(),
            ));
        }
        Ok((
            years,
            self.data.select(Axis(0), &left),
            other.data.select(Axis(0), &right),
        ))
    }
}

/// Stack per-step fields into a new leading axis
fn stack_steps(fields: &[ArrayD<f64>]) -> Result<ArrayD<f64>> {
    let views: Vec<ArrayView<'_, f64, IxDyn>> = fields.iter().map(ArrayD::view).collect();
    Ok(stack(Axis(0), &views)?)
}
