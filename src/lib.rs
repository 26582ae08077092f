//! clim-diag: climate-model diagnostics helpers
//!
//! A Rust library for the pieces of climate diagnostics that sit between
//! loading preprocessed model output and saving results: dataset metadata and
//! aliases, physical unit algebra, missing-label filtering of training
//! tables, regression models, and the statistics behind the eddy heat flux and
//! land-atmosphere interaction diagnostics.
//!
//! ## Module Organization
//!
//! - [`metadata`]: dataset records, grouping and alias construction
//! - [`units`]: unit parsing and symbol-preserving exponentiation
//! - [`table`]: labeled tables and missing-label removal
//! - [`mlr`]: regression models and their explicit registry
//! - [`statistics`]: parallel reductions, correlation, Lanczos filtering, time axes
//! - [`diagnostics`]: eddy heat flux and land-atmosphere interaction diagnostics
//! - [`config`]: settings dictionary handed over by the orchestration layer
//! - [`reporting`]: injectable diagnostic sinks
//! - [`parallel`]: parallel processing configuration
//! - [`errors`]: centralized error handling
//! - [`cli`]: command-line interface of the `clim-diag` binary
//!
//! ## Usage Examples
//!
//! ```rust
//! use clim_diag::prelude::*;
//!
//! # fn main() -> clim_diag::Result<()> {
//! let reporter = LogReporter::default();
//! let squared = units_power(&Unit::parse("W m-2")?, 2, &reporter)?;
//! assert_eq!(squared.to_string(), "W2 m-4");
//!
//! let mut record = Record::new();
//! record.insert("dataset".into(), "MPI-ESM1-2-HR".into());
//! record.insert("exp".into(), "historical".into());
//! let alias = create_alias(&record, &["dataset", "exp"], &AliasOptions::default(), &reporter);
//! assert_eq!(alias, "MPI-ESM1-2-HR-historical");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod metadata;
pub mod mlr;
pub mod parallel;
pub mod reporting;
pub mod statistics;
pub mod table;
pub mod units;

pub use errors::{ClimDiagError, Result};

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::{DiagnosticConfig, HeatFluxConfig, MlrSettings};
    pub use crate::diagnostics::{
        FieldSource, HeatFlux, InMemorySource, LandAtmosInteractions, OutputField,
    };
    pub use crate::errors::{ClimDiagError, Result};
    pub use crate::metadata::{create_alias, group_metadata, AliasOptions, Record};
    pub use crate::mlr::{MlrModel, ModelRegistry};
    pub use crate::parallel::ParallelConfig;
    pub use crate::reporting::{LogReporter, MemoryReporter, Reporter};
    pub use crate::statistics::{StatOperation, StatisticalReduction, TimeSeries};
    pub use crate::table::{remove_missing_labels, Table};
    pub use crate::units::{units_power, Power, Unit};
}
