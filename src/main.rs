//! Entry point for the clim-diag application.
//! Handles CLI parsing, logging setup, and dispatches the subcommands.

use anyhow::{Context, Result};
use clap::Parser;
use clim_diag::cli::{Args, Command};
use clim_diag::config::DiagnosticConfig;
use clim_diag::metadata::{create_alias, AliasOptions, Record};
use clim_diag::mlr::ModelRegistry;
use clim_diag::parallel::ParallelConfig;
use clim_diag::reporting::LogReporter;
use clim_diag::statistics::filter_weights;
use clim_diag::units::{units_power, Unit};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    ParallelConfig::new(args.threads).setup_global_pool()?;
    let reporter = LogReporter::default();

    match args.command {
        Command::Alias {
            record,
            attributes,
            default,
            delimiter,
        } => {
            let record: Record = record.into_iter().collect();
            let options = AliasOptions::default()
                .with_default(default)
                .with_delimiter(delimiter);
            println!("{}", create_alias(&record, &attributes, &options, &reporter));
        }
        Command::UnitsPower { units, power } => {
            let parsed = Unit::parse(&units)?;
            let raised = units_power(&parsed, power, &reporter)
                .with_context(|| format!("raising '{units}' to power {power}"))?;
            println!("{raised}");
        }
        Command::LanczosWeights { window, frequency } => {
            let weights = filter_weights(window, &frequency)?;
            log::debug!("{} weights for a {window} day window", weights.len());
            for weight in weights {
                println!("{weight:.10}");
            }
        }
        Command::Models => {
            for name in ModelRegistry::with_builtin_models().names() {
                println!("{name}");
            }
        }
        Command::Inspect { settings } => {
            let config = DiagnosticConfig::from_path(&settings)
                .with_context(|| format!("reading settings from {}", settings.display()))?;
            println!("Script: {}", config.script);
            for (alias, variables) in config.variables_by_alias() {
                println!("- {alias}: {}", variables.join(", "));
            }
        }
    }

    Ok(())
}
