//! Diagnostic settings
//!
//! The orchestration layer hands every diagnostic a JSON settings dictionary:
//! common keys (`script`, `work_dir`, `input_data`, ...) plus options specific
//! to the script. [`DiagnosticConfig`] reads the common part and keeps the
//! rest in `options`, from which typed views such as [`HeatFluxConfig`] are
//! decoded.

use crate::errors::{ClimDiagError, Result};
use crate::metadata::{group_metadata, Record};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

fn default_output_file_type() -> String {
    "png".to_string()
}

/// Settings dictionary shared by all diagnostics
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticConfig {
    /// Name of the diagnostic script being run
    pub script: String,
    pub work_dir: PathBuf,
    #[serde(default)]
    pub plot_dir: Option<PathBuf>,
    #[serde(default)]
    pub write_netcdf: bool,
    #[serde(default)]
    pub write_plots: bool,
    #[serde(default = "default_output_file_type")]
    pub output_file_type: String,
    /// Input file path mapped to its metadata
    #[serde(default)]
    pub input_data: BTreeMap<String, Map<String, Value>>,
    /// Script-specific options
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl DiagnosticConfig {
    /// Load settings from a JSON file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid settings dictionary.
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse settings from JSON text
    ///
    /// # Errors
    ///
    /// Fails if the text is not a valid settings dictionary.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Input metadata as string records
    ///
    /// Scalar values are stringified, nulls dropped, and `filename` is taken
    /// from the input path when the metadata does not carry it.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.input_data
            .iter()
            .map(|(path, meta)| {
                let mut record: Record = meta
                    .iter()
                    .filter_map(|(key, value)| json_to_string(value).map(|v| (key.clone(), v)))
                    .collect();
                record
                    .entry("filename".to_string())
                    .or_insert_with(|| path.clone());
                record
            })
            .collect()
    }

    /// Sorted, distinct `short_name`s of the input datasets per alias
    #[must_use]
    pub fn variables_by_alias(&self) -> BTreeMap<String, Vec<String>> {
        group_metadata(&self.records(), "alias")
            .into_iter()
            .map(|(alias, group)| {
                let mut variables: Vec<String> = group
                    .iter()
                    .filter_map(|r| r.get("short_name").cloned())
                    .collect();
                variables.sort_unstable();
                variables.dedup();
                (alias, variables)
            })
            .collect()
    }

    /// Decode script-specific options into a typed view
    ///
    /// # Errors
    ///
    /// Returns [`ClimDiagError::Config`] if required options are missing or
    /// have the wrong type.
    pub fn script_options<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.options.clone())).map_err(|e| {
            ClimDiagError::Config(format!("options of script '{}': {e}", self.script))
        })
    }
}

fn json_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Options of the eddy heat flux diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeatFluxConfig {
    /// Lanczos filter window in days
    pub window: usize,
}

fn default_model_type() -> String {
    "linear".to_string()
}

const fn default_fit_intercept() -> bool {
    true
}

/// Options selecting and configuring an MLR model
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MlrSettings {
    #[serde(default = "default_model_type")]
    pub mlr_model_type: String,
    #[serde(default = "default_fit_intercept")]
    pub fit_intercept: bool,
}

impl Default for MlrSettings {
    fn default() -> Self {
        Self {
            mlr_model_type: default_model_type(),
            fit_intercept: default_fit_intercept(),
        }
    }
}
