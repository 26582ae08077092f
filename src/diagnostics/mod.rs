//! Climate diagnostics
//!
//! Each diagnostic groups its input records by dataset alias, loads the
//! fields it needs through a [`FieldSource`], and returns named output
//! fields. Reading and writing gridded files belongs to the caller.
//!
//! - [`heat_flux`]: eddy heat flux V'T' with Lanczos filtering
//! - [`land_atmos`]: land-atmosphere interaction statistics

pub mod heat_flux;
pub mod land_atmos;

pub use heat_flux::{HeatFlux, HeatFluxOutput};
pub use land_atmos::{LandAtmosInteractions, LandAtmosOutput, OutputSet};

use crate::errors::{ClimDiagError, Result};
use crate::metadata::Record;
use crate::statistics::TimeSeries;
use crate::units::Unit;
use ndarray::ArrayD;
use std::collections::{BTreeMap, HashMap};

/// Loads the field described by a dataset record
pub trait FieldSource {
    /// # Errors
    ///
    /// Implementations fail if the field cannot be read.
    fn load(&self, record: &Record) -> Result<TimeSeries>;
}

/// Fields held in memory, keyed by the record's `filename`
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    fields: HashMap<String, TimeSeries>,
}

impl InMemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, field: TimeSeries) {
        self.fields.insert(filename.into(), field);
    }
}

impl FieldSource for InMemorySource {
    fn load(&self, record: &Record) -> Result<TimeSeries> {
        let filename = crate::metadata::require_attribute(record, "filename")?;
        self.fields.get(filename).cloned().ok_or_else(|| {
            ClimDiagError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no field loaded for '{filename}'"),
            ))
        })
    }
}

/// A computed field with its descriptive metadata
#[derive(Debug, Clone)]
pub struct OutputField {
    pub long_name: String,
    pub var_name: Option<String>,
    pub units: Option<Unit>,
    pub attributes: BTreeMap<String, String>,
    pub data: ArrayD<f64>,
}

impl OutputField {
    #[must_use]
    pub fn new(long_name: impl Into<String>, data: ArrayD<f64>) -> Self {
        Self {
            long_name: long_name.into(),
            var_name: None,
            units: None,
            attributes: BTreeMap::new(),
            data,
        }
    }
}

/// First record of `var` within an alias group
fn variable_record<'a>(
    groups: &'a BTreeMap<String, Vec<Record>>,
    var: &str,
    alias: &str,
) -> Result<&'a Record> {
    groups
        .get(var)
        .and_then(|records| records.first())
        .ok_or_else(|| ClimDiagError::VariableNotFound {
            alias: alias.to_string(),
            var: var.to_string(),
        })
}
