//! Defines command-line interface options using `clap` for the clim-diag application.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Climate diagnostics helper tool
#[derive(Parser, Debug)]
#[command(
    version,
    name = "clim-diag",
    about = "Helpers for climate-model diagnostics"
)]
pub struct Args {
    /// Enable verbose output.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long, global = true)]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a dataset alias from record attributes
    Alias {
        /// Record attribute formatted as <key>=<value>, repeatable
        #[arg(short, long = "record", value_parser = parse_key_value)]
        record: Vec<(String, String)>,

        /// Attribute to include in the alias, repeatable and ordered
        #[arg(short, long = "attr")]
        attributes: Vec<String>,

        /// Attribute used when none of the requested ones exist
        #[arg(long, default_value = "dataset")]
        default: String,

        #[arg(long, default_value = "-")]
        delimiter: String,
    },

    /// Raise a unit expression to an integer power, preserving its symbols
    UnitsPower {
        units: String,

        #[arg(allow_negative_numbers = true)]
        power: f64,
    },

    /// Print Lanczos low-pass filter weights
    LanczosWeights {
        /// Filter window in days
        #[arg(short, long)]
        window: usize,

        /// Dataset frequency (day, 6hr, 3hr, 1hr)
        #[arg(short, long, default_value = "day")]
        frequency: String,
    },

    /// List registered MLR model types
    Models,

    /// List datasets of a diagnostic settings file grouped by alias
    Inspect {
        /// Path to the JSON settings file
        settings: PathBuf,
    },
}

/// Parse a `<key>=<value>` record attribute
///
/// # Errors
///
/// Fails if there is no `=` or the key is empty.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err("Invalid format: Expected '<key>=<value>'.".to_string()),
    }
}
