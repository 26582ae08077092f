//! Land-atmosphere interaction diagnostic
//!
//! Computes, per dataset, the climatology and interannual variability of
//! the evaporative fraction and a set of correlation metrics between surface
//! fluxes, radiation, cloud cover, temperature and soil moisture.

use super::{variable_record, FieldSource, OutputField};
use crate::config::DiagnosticConfig;
use crate::errors::Result;
use crate::metadata::{group_metadata, require_attribute, Record};
use crate::reporting::Reporter;
use crate::statistics::{
    parallel_mean_axis, parallel_std_dev_axis, pearson_along_axis, TimeSeries,
};
use std::path::PathBuf;

/// Named collection of output fields saved to one file
#[derive(Debug, Clone)]
pub struct OutputSet {
    pub output_name: String,
    pub path: PathBuf,
    pub fields: Vec<OutputField>,
}

/// Results for one dataset
#[derive(Debug, Clone)]
pub struct LandAtmosOutput {
    pub alias: String,
    pub evaporative_fraction: OutputSet,
    pub correlation_metrics: OutputSet,
}

/// Land-atmosphere interaction diagnostic
#[derive(Debug, Clone)]
pub struct LandAtmosInteractions {
    detrended: bool,
    work_dir: PathBuf,
}

/// Output file name `{project}_{dataset}_{exp}_{output}_{start}_{end}.nc`
///
/// # Errors
///
/// Fails if the record lacks one of the attributes.
pub fn output_filename(record: &Record, output_name: &str) -> Result<String> {
    Ok(format!(
        "{}_{}_{}_{}_{}_{}.nc",
        require_attribute(record, "project")?,
        require_attribute(record, "dataset")?,
        require_attribute(record, "exp")?,
        output_name,
        require_attribute(record, "start_year")?,
        require_attribute(record, "end_year")?,
    ))
}

impl LandAtmosInteractions {
    #[must_use]
    pub fn new(config: &DiagnosticConfig) -> Self {
        Self {
            detrended: config.script.contains("detrend"),
            work_dir: config.work_dir.clone(),
        }
    }

    /// Whether inputs are detrended, which changes output names
    #[must_use]
    pub const fn detrended(&self) -> bool {
        self.detrended
    }

    fn output_name(&self, base: &str) -> String {
        if self.detrended {
            format!("detrended_{base}")
        } else {
            base.to_string()
        }
    }

    fn output_set(&self, record: &Record, base: &str, fields: Vec<OutputField>) -> Result<OutputSet> {
        let output_name = self.output_name(base);
        let path = self.work_dir.join(output_filename(record, &output_name)?);
        Ok(OutputSet {
            output_name,
            path,
            fields,
        })
    }

    /// Run the diagnostic for every alias in `records`
    ///
    /// # Errors
    ///
    /// Fails if a dataset lacks one of the required variables or attributes,
    /// or its fields cannot be loaded or are not aligned in time.
    pub fn compute(
        &self,
        records: &[Record],
        source: &dyn FieldSource,
        reporter: &dyn Reporter,
    ) -> Result<Vec<LandAtmosOutput>> {
        let mut outputs = Vec::new();
        for (alias, group) in group_metadata(records, "alias") {
            reporter.info(&format!("Processing {alias}"));
            let vars = group_metadata(&group, "short_name");
            let load = |var: &str| source.load(variable_record(&vars, var, &alias)?);
            let hfls = load("hfls")?;
            let hfss = load("hfss")?;
            let rsds = load("rsds")?;
            let rlds = load("rlds")?;
            let clt = load("clt")?;
            let tas = load("tas")?;
            let mrso = load("mrso")?;

            let (clim, stdv) = self.evaporative_fraction_stats(&hfls, &hfss)?;
            let metrics =
                self.compute_correlation_metrics(&hfls, &rsds, &rlds, &clt, &tas, &mrso)?;

            outputs.push(LandAtmosOutput {
                evaporative_fraction: self.output_set(
                    &group[0],
                    "evaporative_fraction_statistics",
                    vec![clim, stdv],
                )?,
                correlation_metrics: self.output_set(&group[0], "correlation_metrics", metrics)?,
                alias,
            });
        }
        Ok(outputs)
    }

    /// Climatology and standard deviation of `hfls / (hfls + hfss)`
    ///
    /// # Errors
    ///
    /// Fails if the fields are not aligned.
    pub fn evaporative_fraction_stats(
        &self,
        hfls: &TimeSeries,
        hfss: &TimeSeries,
    ) -> Result<(OutputField, OutputField)> {
        let fraction = hfls.combine(hfss, |latent, sensible| {
            let ratio = latent / (latent + sensible);
            if ratio.is_finite() {
                ratio
            } else {
                f64::NAN
            }
        })?;

        let clim = OutputField::new(
            "climatological_evaporative_fraction",
            parallel_mean_axis(fraction.data(), 0)?,
        );
        let stdv = OutputField::new(
            "interannual_standard_deviation_of_evaporative_fraction",
            parallel_std_dev_axis(fraction.data(), 0)?,
        );
        Ok((clim, stdv))
    }

    /// All four correlation metrics in output order
    ///
    /// # Errors
    ///
    /// Fails if the fields are not aligned.
    pub fn compute_correlation_metrics(
        &self,
        hfls: &TimeSeries,
        rsds: &TimeSeries,
        rlds: &TimeSeries,
        clt: &TimeSeries,
        tas: &TimeSeries,
        mrso: &TimeSeries,
    ) -> Result<Vec<OutputField>> {
        let corr_hfls_rad = self.heat_radiation_stats(hfls, rsds, rlds)?;
        let corr_clt_tas = self.cloud_temperature_stats(clt, tas)?;
        let (corr_hfls_mrso, corr_mrso_mam_jja) = self.heat_soil_stats(hfls, mrso)?;
        Ok(vec![
            corr_hfls_rad,
            corr_clt_tas,
            corr_hfls_mrso,
            corr_mrso_mam_jja,
        ])
    }

    /// Correlation of latent heat flux with total downwelling radiation
    ///
    /// # Errors
    ///
    /// Fails if the fields are not aligned.
    pub fn heat_radiation_stats(
        &self,
        hfls: &TimeSeries,
        rsds: &TimeSeries,
        rlds: &TimeSeries,
    ) -> Result<OutputField> {
        let total_radiation = rsds.combine(rlds, |sw, lw| sw + lw)?;
        hfls.check_aligned(&total_radiation)?;
        Ok(OutputField::new(
            "interannual_correlation_between_latent_heat_flux_and_total_radiation_at_surface",
            pearson_along_axis(hfls.data(), total_radiation.data(), 0)?,
        ))
    }

    /// Correlation of cloud cover with near-surface temperature
    ///
    /// # Errors
    ///
    /// Fails if the fields are not aligned.
    pub fn cloud_temperature_stats(&self, clt: &TimeSeries, tas: &TimeSeries) -> Result<OutputField> {
        clt.check_aligned(tas)?;
        Ok(OutputField::new(
            "interannual_correlation_between_temperature_and_cloud_cover",
            pearson_along_axis(clt.data(), tas.data(), 0)?,
        ))
    }

    /// Summer latent heat flux vs summer soil moisture, and spring vs
    /// summer soil moisture, both over season years
    ///
    /// # Errors
    ///
    /// Fails if a season has no data or the series share no year.
    pub fn heat_soil_stats(
        &self,
        hfls: &TimeSeries,
        mrso: &TimeSeries,
    ) -> Result<(OutputField, OutputField)> {
        let hfls_jja = hfls.seasonal_means("JJA")?;
        let mrso_jja = mrso.seasonal_means("JJA")?;
        let mrso_mam = mrso.seasonal_means("MAM")?;

        let (_, flux, moisture) = hfls_jja.align(&mrso_jja)?;
        let correlation = OutputField::new(
            "interannual_correlation_between_latent_heat_flux_and_soil_moisture",
            pearson_along_axis(&flux, &moisture, 0)?,
        );

        let (_, spring, summer) = mrso_mam.align(&mrso_jja)?;
        let mrso_correlation = OutputField::new(
            "interannual_correlation_between_soil_moisture_in_spring_and_soil_moisture_in_summer",
            pearson_along_axis(&spring, &summer, 0)?,
        );
        Ok((correlation, mrso_correlation))
    }
}
