//! Tests for command-line parsing and the settings inspection behind `inspect`

use clap::Parser;
use clim_diag::cli::{parse_key_value, Args, Command};
use clim_diag::config::DiagnosticConfig;
use clim_diag::errors::Result;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_parse_key_value() {
    assert_eq!(
        parse_key_value("dataset=MPI-ESM1-2-HR"),
        Ok(("dataset".to_string(), "MPI-ESM1-2-HR".to_string()))
    );
    assert_eq!(
        parse_key_value("filename=a=b.nc"),
        Ok(("filename".to_string(), "a=b.nc".to_string()))
    );
    assert_eq!(parse_key_value("exp="), Ok(("exp".to_string(), String::new())));
    assert!(parse_key_value("dataset").is_err());
    assert!(parse_key_value("=TEST").is_err());
}

#[test]
fn test_alias_arguments() {
    let args = Args::try_parse_from([
        "clim-diag", "alias", "-r", "dataset=TEST", "-r", "project=CMIP4", "-a", "dataset", "-a",
        "project", "--delimiter", "x",
    ])
    .expect("valid alias arguments");

    match args.command {
        Command::Alias {
            record,
            attributes,
            default,
            delimiter,
        } => {
            assert_eq!(
                record,
                vec![
                    ("dataset".to_string(), "TEST".to_string()),
                    ("project".to_string(), "CMIP4".to_string()),
                ]
            );
            assert_eq!(attributes, vec!["dataset", "project"]);
            assert_eq!(default, "dataset");
            assert_eq!(delimiter, "x");
        }
        other => panic!("Expected alias command, got {other:?}"),
    }

    assert!(Args::try_parse_from(["clim-diag", "alias", "-r", "no-equals-sign"]).is_err());
}

#[test]
fn test_units_power_and_global_arguments() {
    let args = Args::try_parse_from(["clim-diag", "-v", "-t", "2", "units-power", "kg m-2", "-3"])
        .expect("valid units-power arguments");
    assert!(args.verbose);
    assert_eq!(args.threads, Some(2));
    match args.command {
        Command::UnitsPower { units, power } => {
            assert_eq!(units, "kg m-2");
            assert_eq!(power, -3.0);
        }
        other => panic!("Expected units-power command, got {other:?}"),
    }

    let args = Args::try_parse_from(["clim-diag", "inspect", "/work/settings.json"])
        .expect("valid inspect arguments");
    assert!(matches!(
        args.command,
        Command::Inspect { settings } if settings == PathBuf::from("/work/settings.json")
    ));
}

#[test]
fn test_inspect_settings_file() -> Result<()> {
    let settings = r#"{
        "script": "land_atmos_interactions",
        "work_dir": "/work/land",
        "input_data": {
            "/preproc/hfls_B.nc": {"alias": "B", "short_name": "hfls"},
            "/preproc/tas_B.nc": {"alias": "B", "short_name": "tas"},
            "/preproc/hfls_B_2.nc": {"alias": "B", "short_name": "hfls"},
            "/preproc/mrso_A.nc": {"alias": "A", "short_name": "mrso"},
            "/preproc/orphan.nc": {"short_name": "clt"}
        }
    }"#;
    let mut file = NamedTempFile::new()?;
    file.write_all(settings.as_bytes())?;

    let config = DiagnosticConfig::from_path(file.path())?;
    assert_eq!(config.script, "land_atmos_interactions");

    let summary = config.variables_by_alias();
    assert_eq!(summary.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(summary["A"], vec!["mrso"]);
    assert_eq!(summary["B"], vec!["hfls", "tas"]);
    Ok(())
}
