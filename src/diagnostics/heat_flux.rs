//! Eddy heat flux diagnostic
//!
//! For every dataset the transient eddy heat flux V'T' is computed from
//! northward wind and air temperature: both are high-pass filtered (series
//! minus its Lanczos low-pass), multiplied, low-pass filtered again, and
//! averaged by calendar month.

use super::{variable_record, FieldSource, OutputField};
use crate::config::{DiagnosticConfig, HeatFluxConfig};
use crate::errors::{ClimDiagError, Result};
use crate::metadata::{group_metadata, require_attribute, Record};
use crate::reporting::Reporter;
use crate::statistics::{filter_weights, lanczos_filter, TimeSeries};
use crate::units::Unit;
use std::path::PathBuf;

const WIND: &str = "northward_wind";
const TEMPERATURE: &str = "air_temperature";
const WEIGHT_SUM_TOLERANCE: f64 = 1e-8;

/// Monthly eddy heat flux climatology of one dataset
#[derive(Debug, Clone)]
pub struct HeatFluxOutput {
    pub alias: String,
    /// Calendar months of the leading axis of `field.data`
    pub months: Vec<u32>,
    pub field: OutputField,
    /// Where the result is to be saved
    pub path: PathBuf,
}

/// Eddy heat flux diagnostic
#[derive(Debug, Clone)]
pub struct HeatFlux {
    window: usize,
    work_dir: PathBuf,
}

impl HeatFlux {
    /// # Errors
    ///
    /// Fails if the settings lack a valid `window`.
    pub fn new(config: &DiagnosticConfig) -> Result<Self> {
        let options: HeatFluxConfig = config.script_options()?;
        if options.window == 0 {
            return Err(ClimDiagError::Config(
                "heat flux 'window' must be at least one day".to_string(),
            ));
        }
        Ok(Self {
            window: options.window,
            work_dir: config.work_dir.clone(),
        })
    }

    /// Filter window in days
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Run the diagnostic for every alias in `records`
    ///
    /// # Errors
    ///
    /// Fails if a dataset lacks wind or temperature, its frequency is not
    /// supported, or its fields cannot be loaded or combined.
    pub fn compute(
        &self,
        records: &[Record],
        source: &dyn FieldSource,
        reporter: &dyn Reporter,
    ) -> Result<Vec<HeatFluxOutput>> {
        let mut outputs = Vec::new();
        for (alias, group) in group_metadata(records, "alias") {
            reporter.info(&format!("Processing {alias}"));
            let vars = group_metadata(&group, "standard_name");
            let va_record = variable_record(&vars, WIND, &alias)?;
            let ta_record = variable_record(&vars, TEMPERATURE, &alias)?;
            let va = source.load(va_record)?;
            let ta = source.load(ta_record)?;

            let weights = filter_weights(self.window, require_attribute(va_record, "frequency")?)?;
            let total: f64 = weights.iter().sum();
            if (total - 1.0).abs() >= WEIGHT_SUM_TOLERANCE {
                return Err(ClimDiagError::StatisticsError(format!(
                    "Lanczos weights sum to {total}, expected 1"
                )));
            }

            reporter.info("Calculating eddy heat flux");
            let heat_flux = self.eddy_heat_flux(&va, &ta, &weights)?;
            let climatology = heat_flux.aggregate_by_month()?;

            let mut field = OutputField::new("Eddy Heat Flux (V'T')", climatology.data);
            field.var_name = Some("vptp".to_string());
            field.units = Some(Unit::parse("K m s-1")?);
            field.attributes.insert(
                "filtering".to_string(),
                format!(
                    "Lanczos filtering with window width={} ({} days)",
                    weights.len(),
                    self.window
                ),
            );

            outputs.push(HeatFluxOutput {
                path: self.work_dir.join(format!("heatflux_{alias}.nc")),
                alias,
                months: climatology.months,
                field,
            });
        }
        Ok(outputs)
    }

    /// Eddy heat flux time series from wind and temperature
    ///
    /// `weights` must have odd length `2h + 1`; the result loses `2h` steps
    /// at each end of the time axis.
    ///
    /// # Errors
    ///
    /// Fails if the series are not aligned or too short for the filter.
    pub fn eddy_heat_flux(
        &self,
        va: &TimeSeries,
        ta: &TimeSeries,
        weights: &[f64],
    ) -> Result<TimeSeries> {
        va.check_aligned(ta)?;
        if weights.len() % 2 == 0 {
            return Err(ClimDiagError::StatisticsError(format!(
                "Lanczos filter needs an odd number of weights, got {}",
                weights.len()
            )));
        }
        let half_window = weights.len() / 2;

        let va_trimmed = va.trim(half_window)?;
        let ta_trimmed = ta.trim(half_window)?;
        let va_high = va_trimmed.data() - &lanczos_filter(va.data(), weights)?;
        let ta_high = ta_trimmed.data() - &lanczos_filter(ta.data(), weights)?;

        let flux = lanczos_filter(&(&ta_high * &va_high), weights)?;
        va_trimmed.trim(half_window)?.with_data(flux)
    }
}
