//! Unit tests for metadata, tables, reporting and configuration

use clim_diag::{
    config::{DiagnosticConfig, HeatFluxConfig, MlrSettings},
    errors::{ClimDiagError, Result},
    metadata::{create_alias, group_metadata, AliasOptions, Record},
    parallel::ParallelConfig,
    reporting::{LogReporter, MemoryReporter, Reporter},
    table::{remove_missing_labels, Table},
};
use log::Level;
use std::io::Write;
use tempfile::NamedTempFile;

fn dataset() -> Record {
    [
        ("dataset", "TEST"),
        ("exp", "iceage"),
        ("filename", "highway/to/hell"),
        ("project", "CMIP4"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[test]
fn test_create_alias() {
    // (attributes, default, delimiter, expected alias, fallback warning)
    let cases: Vec<(Vec<&str>, Option<&str>, Option<&str>, &str, bool)> = vec![
        (vec![], None, None, "TEST", true),
        (vec![], None, Some("x"), "TEST", true),
        (vec![], Some("exp"), None, "iceage", true),
        (vec![], Some("project"), Some("x"), "CMIP4", true),
        (vec!["no"], None, None, "TEST", true),
        (vec!["no"], None, Some("x"), "TEST", true),
        (vec!["no"], Some("exp"), None, "iceage", true),
        (vec!["no"], Some("project"), Some("x"), "CMIP4", true),
        (vec!["dataset"], None, None, "TEST", false),
        (vec!["dataset"], None, Some("x"), "TEST", false),
        (vec!["dataset"], Some("exp"), None, "TEST", false),
        (vec!["dataset"], Some("project"), Some("x"), "TEST", false),
        (vec!["dataset", "project"], None, None, "TEST-CMIP4", false),
        (vec!["dataset", "project"], None, Some("x"), "TESTxCMIP4", false),
        (vec!["dataset", "project"], Some("exp"), None, "TEST-CMIP4", false),
        (vec!["dataset", "project"], Some("project"), Some("x"), "TESTxCMIP4", false),
    ];

    let record = dataset();
    for (attributes, default, delimiter, expected, warns) in cases {
        let mut options = AliasOptions::default();
        if let Some(default) = default {
            options = options.with_default(default);
        }
        if let Some(delimiter) = delimiter {
            options = options.with_delimiter(delimiter);
        }

        let reporter = MemoryReporter::new();
        let alias = create_alias(&record, &attributes, &options, &reporter);
        assert_eq!(alias, expected, "attributes {attributes:?}");
        let expected_warnings = usize::from(warns);
        assert_eq!(reporter.count(Level::Warn), expected_warnings);
    }
}

#[test]
fn test_create_alias_order_and_missing_default() {
    let record = dataset();
    let reporter = MemoryReporter::new();
    let options = AliasOptions::default();

    let alias = create_alias(&record, &["project", "no", "dataset"], &options, &reporter);
    assert_eq!(alias, "CMIP4-TEST");
    assert!(reporter.is_empty());

    let options = options.with_default("<dataset id>");
    let alias = create_alias(&record, &["missing"], &options, &reporter);
    assert_eq!(alias, "<dataset id>");
    assert_eq!(reporter.count(Level::Warn), 1);
}

#[test]
fn test_group_metadata() {
    let make = |alias: &str, var: &str| -> Record {
        [("alias", alias), ("short_name", var)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    };
    let mut orphan = Record::new();
    orphan.insert("short_name".to_string(), "tas".to_string());
    let records = vec![make("B", "tas"), make("A", "pr"), make("B", "pr"), orphan];

    let groups = group_metadata(&records, "alias");
    assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(groups["B"].len(), 2);
    assert_eq!(groups["B"][0]["short_name"], "tas");
    assert_eq!(groups["A"].len(), 1);
}

fn df_1() -> Table {
    Table::single("a", vec![-2.0, -1.0, 0.0, 1.0, 2.0])
}

fn df_1_out() -> Table {
    Table::single("a", vec![-2.0, 0.0, 2.0])
}

fn df_2() -> Table {
    Table::single("b", vec![1.0, f64::NAN, 42.0, f64::NAN, 3.25])
}

fn df_2_out() -> Table {
    Table::single("b", vec![1.0, 42.0, 3.25])
}

fn df_3() -> Table {
    Table::from_columns(vec![
        ("c", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
        ("d", vec![-2.0, -1.0, 0.0, 1.0, 2.0]),
    ])
    .expect("columns of equal length")
}

fn df_3_out() -> Table {
    Table::from_columns(vec![("c", vec![1.0, 3.0, 5.0]), ("d", vec![-2.0, 0.0, 2.0])])
        .expect("columns of equal length")
}

#[test]
fn test_remove_missing_labels() {
    type Case = ([Option<Table>; 3], [Option<Table>; 3], usize);
    let cases: Vec<Case> = vec![
        ([Some(df_1()), Some(df_1()), None], [Some(df_1()), Some(df_1()), None], 0),
        ([Some(df_1()), Some(df_2()), None], [Some(df_1_out()), Some(df_2_out()), None], 2),
        ([Some(df_2()), Some(df_1()), None], [Some(df_2()), Some(df_1()), None], 0),
        ([Some(df_2()), Some(df_2()), None], [Some(df_2_out()), Some(df_2_out()), None], 2),
        ([Some(df_3()), Some(df_1()), None], [Some(df_3()), Some(df_1()), None], 0),
        ([Some(df_3()), Some(df_2()), None], [Some(df_3_out()), Some(df_2_out()), None], 2),
        (
            [Some(df_1()), Some(df_1()), Some(df_1())],
            [Some(df_1()), Some(df_1()), Some(df_1())],
            0,
        ),
        (
            [Some(df_1()), Some(df_2()), Some(df_1())],
            [Some(df_1_out()), Some(df_2_out()), Some(df_1_out())],
            2,
        ),
        (
            [Some(df_2()), Some(df_1()), Some(df_2())],
            [Some(df_2()), Some(df_1()), Some(df_2())],
            0,
        ),
        (
            [Some(df_2()), Some(df_2()), Some(df_2())],
            [Some(df_2_out()), Some(df_2_out()), Some(df_2_out())],
            2,
        ),
        (
            [Some(df_3()), Some(df_1()), Some(df_1())],
            [Some(df_3()), Some(df_1()), Some(df_1())],
            0,
        ),
        (
            [Some(df_3()), Some(df_2()), Some(df_1())],
            [Some(df_3_out()), Some(df_2_out()), Some(df_1_out())],
            2,
        ),
        ([None, Some(df_2()), None], [None, Some(df_2_out()), None], 2),
    ];

    for ([data, label, weights], [data_out, label_out, weights_out], removed) in cases {
        let label = label.expect("label table is mandatory");
        let reporter = MemoryReporter::new();
        let (new_data, new_label, new_weights) =
            remove_missing_labels(data.as_ref(), &label, weights.as_ref(), &reporter);

        assert_eq!(new_data, data_out);
        assert_eq!(Some(new_label.clone()), label_out);
        assert_eq!(new_weights, weights_out);
        assert_ne!(new_label.values().as_ptr(), label.values().as_ptr());

        if removed > 0 {
            let infos = reporter.messages(Level::Info);
            assert_eq!(infos.len(), 1);
            assert!(infos[0].contains(&removed.to_string()));
        } else {
            assert!(reporter.is_empty());
        }
    }
}

#[test]
fn test_remove_missing_labels_idempotent() {
    let reporter = MemoryReporter::new();
    let (data, label, weights) =
        remove_missing_labels(Some(&df_3()), &df_2(), Some(&df_1()), &reporter);
    assert_eq!(reporter.count(Level::Info), 1);

    let again = MemoryReporter::new();
    let (data2, label2, weights2) =
        remove_missing_labels(data.as_ref(), &label, weights.as_ref(), &again);
    assert_eq!(data2, data);
    assert_eq!(label2, label);
    assert_eq!(weights2, weights);
    assert!(again.is_empty());
}

#[test]
fn test_table_construction() -> Result<()> {
    let table = df_3();
    assert_eq!(table.n_rows(), 5);
    assert_eq!(table.n_cols(), 2);
    assert_eq!(table.columns(), ["c".to_string(), "d".to_string()]);
    assert_eq!(table.column("d")?[4], 2.0);

    match table.column("e") {
        Err(ClimDiagError::ColumnNotFound { column }) => assert_eq!(column, "e"),
        other => panic!("Expected ColumnNotFound error, got {other:?}"),
    }

    let ragged = Table::from_columns(vec![("x", vec![1.0, 2.0]), ("y", vec![1.0])]);
    assert!(matches!(ragged, Err(ClimDiagError::TableShape(_))));

    let duplicate = Table::from_columns(vec![("x", vec![1.0]), ("x", vec![2.0])]);
    assert!(matches!(duplicate, Err(ClimDiagError::TableShape(_))));

    assert!(df_2().has_missing());
    assert!(!df_2_out().has_missing());
    assert_ne!(df_2(), df_2_out());
    assert_eq!(df_2(), df_2());
    Ok(())
}

#[test]
fn test_reporters() {
    let memory = MemoryReporter::new();
    memory.warn("first");
    memory.info("second");
    memory.report(Level::Debug, "third");
    assert_eq!(memory.entries().len(), 3);
    assert_eq!(memory.messages(Level::Warn), vec!["first".to_string()]);
    assert_eq!(memory.count(Level::Info), 1);
    memory.clear();
    assert!(memory.is_empty());

    // Logging without an installed logger must not panic
    let log_reporter = LogReporter::new("clim_diag::tests");
    assert_eq!(log_reporter.target(), "clim_diag::tests");
    log_reporter.warn("nobody is listening");
}

const SETTINGS: &str = r#"{
    "script": "heat_flux",
    "work_dir": "/work/heat_flux",
    "write_netcdf": true,
    "window": 10,
    "mlr_model_type": "constant",
    "input_data": {
        "/preproc/va_MODEL.nc": {
            "alias": "MODEL",
            "dataset": "MODEL",
            "standard_name": "northward_wind",
            "frequency": "day",
            "start_year": 1950,
            "end_year": 1951,
            "ensemble": null
        },
        "/preproc/ta_MODEL.nc": {
            "alias": "MODEL",
            "dataset": "MODEL",
            "standard_name": "air_temperature",
            "filename": "/elsewhere/ta.nc",
            "frequency": "day"
        }
    }
}"#;

#[test]
fn test_diagnostic_config_from_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(SETTINGS.as_bytes())?;

    let config = DiagnosticConfig::from_path(file.path())?;
    assert_eq!(config.script, "heat_flux");
    assert!(config.write_netcdf);
    assert!(!config.write_plots);
    assert_eq!(config.output_file_type, "png");
    assert_eq!(config.input_data.len(), 2);

    let records = config.records();
    let va = records
        .iter()
        .find(|r| r["standard_name"] == "northward_wind")
        .expect("wind record");
    assert_eq!(va["filename"], "/preproc/va_MODEL.nc");
    assert_eq!(va["start_year"], "1950");
    assert!(!va.contains_key("ensemble"));
    let ta = records
        .iter()
        .find(|r| r["standard_name"] == "air_temperature")
        .expect("temperature record");
    assert_eq!(ta["filename"], "/elsewhere/ta.nc");

    let heat_flux: HeatFluxConfig = config.script_options()?;
    assert_eq!(heat_flux.window, 10);
    let mlr: MlrSettings = config.script_options()?;
    assert_eq!(mlr.mlr_model_type, "constant");
    assert!(mlr.fit_intercept);
    Ok(())
}

#[test]
fn test_diagnostic_config_errors() {
    let missing_window = r#"{"script": "heat_flux", "work_dir": "/tmp"}"#;
    let config = DiagnosticConfig::from_json_str(missing_window).expect("valid settings");
    assert!(config.records().is_empty());
    match config.script_options::<HeatFluxConfig>() {
        Err(ClimDiagError::Config(message)) => assert!(message.contains("heat_flux")),
        other => panic!("Expected Config error, got {other:?}"),
    }

    let no_script = r#"{"work_dir": "/tmp"}"#;
    assert!(matches!(
        DiagnosticConfig::from_json_str(no_script),
        Err(ClimDiagError::Json(_))
    ));

    let missing_file = DiagnosticConfig::from_path(std::path::Path::new("/no/such/settings.json"));
    assert!(matches!(missing_file, Err(ClimDiagError::Io(_))));
}

#[test]
fn test_parallel_config() {
    let default_config = ParallelConfig::default();
    assert!(default_config.num_threads.is_none());

    let config_4 = ParallelConfig::with_threads(4);
    assert_eq!(config_4.num_threads, Some(4));

    let all_cores = ParallelConfig::all_cores();
    assert!(all_cores.num_threads.is_some_and(|n| n > 0));

    assert!(default_config.current_threads() > 0);
}
