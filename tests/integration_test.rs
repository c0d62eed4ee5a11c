//! End-to-end tests: CSV table in, output tables out

use approx::assert_relative_eq;
use rusty_inventory::{
    config::{OutputConfig, PipelineConfig},
    data::{required_columns, SkuTableReader},
    forecast::{ForecastOutcome, ModelKind},
    inventory::{EoqOutcome, SafetyStockOutcome, UndefinedEoq},
    pipeline::InventoryPipeline,
    report::write_all,
};
use std::fs;
use std::path::PathBuf;

fn sample_table() -> String {
    let header = required_columns().join(",");
    let rows = [
        // Steady seller
        "SKU-001,Kopi Bubuk,Beverage,Coffee,100,100,100,100,100,100,100,100,100,100,100,100,250,7,50,10,0.25,0.95",
        // Growing seller, service level between two table keys
        "SKU-002,Teh Celup,Beverage,Tea,20,25,30,35,40,45,50,55,60,65,70,75,80,14,80,4,0.2,0.965",
        // Never sold
        "SKU-003,Gula Aren,Pantry,Sugar,,,,,,,,,,,,,0,5,30,8,0.25,0.9",
        // Free to hold
        "SKU-004,Sendok,Kitchen,Cutlery,5,7,6,8,5,6,7,9,6,5,8,7,40,3,20,2,0,0.99",
    ];
    format!("{}\n{}\n", header, rows.join("\n"))
}

#[test]
fn test_full_pipeline() {
    let records = SkuTableReader::new().read(sample_table().as_bytes()).unwrap();
    assert_eq!(records.len(), 4);

    let output = InventoryPipeline::new(PipelineConfig::default())
        .unwrap()
        .run(&records)
        .unwrap();
    assert_eq!(output.summary.sku_count, 4);

    // D = 1200, S = 50, H = 2.5
    let steady = output.report("SKU-001").unwrap();
    assert_relative_eq!(
        steady.eoq.outcome.value().unwrap(),
        48_000f64.sqrt(),
        epsilon = 1e-9
    );
    let ss = steady.safety_stock.outcome.value().unwrap();
    assert_eq!(ss.safety_stock, 0.0);
    assert_relative_eq!(ss.reorder_point, 1200.0 / 365.0 * 7.0, epsilon = 1e-9);
    assert_eq!(steady.forecast.chosen_model(), Some(ModelKind::Naive));

    // 0.965 is equidistant from 0.95 and 0.98; the lower level wins
    let growing = output.report("SKU-002").unwrap();
    let ss = growing.safety_stock.outcome.value().unwrap();
    assert_eq!(ss.matched_level, 0.95);
    assert_eq!(ss.z_score, 1.65);
    assert_eq!(growing.forecast.chosen_model(), Some(ModelKind::Holt));

    let empty = output.report("SKU-003").unwrap();
    assert_eq!(
        empty.eoq.outcome,
        EoqOutcome::Undefined(UndefinedEoq::NoDemandHistory)
    );
    assert_eq!(empty.safety_stock.outcome, SafetyStockOutcome::Undefined);
    assert_eq!(empty.forecast.outcome, ForecastOutcome::Unavailable);
    assert_eq!(empty.timeseries.len(), 12);

    let free = output.report("SKU-004").unwrap();
    assert_eq!(
        free.eoq.outcome,
        EoqOutcome::Undefined(UndefinedEoq::NonPositiveHoldingCost)
    );
    assert!(free.safety_stock.outcome.value().is_some());
}

#[test]
fn test_output_files() {
    let dir = tempfile::tempdir().unwrap();
    let records = SkuTableReader::new().read(sample_table().as_bytes()).unwrap();
    let config = PipelineConfig {
        output: OutputConfig {
            dir: dir.path().join("results"),
            ..OutputConfig::default()
        },
        ..PipelineConfig::default()
    };
    let output = InventoryPipeline::new(config.clone())
        .unwrap()
        .run(&records)
        .unwrap();
    let files = write_all(&output, &config.output).unwrap();

    let features = fs::read_to_string(&files.features).unwrap();
    assert_eq!(features.lines().count(), 1 + 4);

    let eoq = fs::read_to_string(&files.eoq).unwrap();
    assert!(eoq.contains("non_positive_holding_cost"));
    assert!(eoq.contains("no_demand_history"));

    let safety = fs::read_to_string(&files.safety_stock).unwrap();
    assert_eq!(safety.lines().count(), 1 + 4);

    let timeseries = fs::read_to_string(&files.timeseries).unwrap();
    assert_eq!(timeseries.lines().count(), 1 + 48);

    // 3 SKUs x 3 horizon rows + 1 unavailable row
    let forecasts = fs::read_to_string(&files.forecasts).unwrap();
    assert_eq!(forecasts.lines().count(), 1 + 10);
    assert!(forecasts.contains("SKU-003,unavailable"));

    assert!(files.diagnostics.exists());
}

#[test]
fn test_custom_horizon_and_year() {
    let records = SkuTableReader::new().read(sample_table().as_bytes()).unwrap();
    let config = PipelineConfig::from_toml_str(
        "[forecast]\nhorizon = 12\n\n[calendar]\nreference_year = 2024\n",
    )
    .unwrap();
    let output = InventoryPipeline::new(config).unwrap().run(&records).unwrap();

    let steady = output.report("SKU-001").unwrap();
    assert_eq!(steady.timeseries[0].date.to_string(), "2024-01-01");
    let points = &steady.forecast.forecast().unwrap().points;
    assert_eq!(points.len(), 12);
    assert_eq!(points[0].date.to_string(), "2025-01-01");
    assert_eq!(points[11].date.to_string(), "2025-12-01");
}

#[test]
fn test_config_file_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = 2\n\n[output]\ndir = \"reports\"\n").unwrap();

    let config = PipelineConfig::load(&path).unwrap();
    assert_eq!(config.workers, Some(2));
    assert_eq!(config.output.dir, PathBuf::from("reports"));

    let missing = PipelineConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(missing, PipelineConfig::default());

    fs::write(&path, "workers = [\n").unwrap();
    assert!(PipelineConfig::load(&path).is_err());
}
