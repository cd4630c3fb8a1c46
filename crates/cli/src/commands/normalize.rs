use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cot_analytics_core::ConfigLoader;
use cot_analytics_data::{reconcile_and_combine, CsvStore, ParquetStore};
use tracing::{info, warn};

/// Runs the full normalization pipeline: reconcile, combine, compute
/// rolling indicators, write the columnar dataset.
pub fn run(
    paths: Vec<PathBuf>,
    output: Option<PathBuf>,
    csv_export: Option<PathBuf>,
    config_path: &str,
) -> Result<()> {
    let config = ConfigLoader::load_from(config_path)?;
    let output = output.unwrap_or(config.data.output_path);
    let csv_export = csv_export.or(config.data.csv_export_path);

    // Explicit paths are taken in the order given; discovered paths are
    // sorted lexically, which for annual report files is also year order.
    // That order decides which duplicate (date, market) row wins.
    let raw_paths = if paths.is_empty() {
        discover_raw_files(&config.data.raw_dir)?
    } else {
        paths
    };
    info!(files = raw_paths.len(), "starting normalization run");

    let outcome = reconcile_and_combine(&raw_paths)?;
    for failure in &outcome.failures {
        warn!(file = %failure.source_file, error = %failure.error, "file rejected");
    }
    for report in &outcome.reports {
        if report.rows_dropped() > 0 {
            info!(
                file = %report.source_file,
                kept = report.rows_kept,
                bad_date = report.rows_dropped_bad_date,
                missing_code = report.rows_dropped_missing_code,
                "dropped rows during reconciliation"
            );
        }
    }

    let derived = cot_analytics_metrics::compute(outcome.records);

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output dir: {}", parent.display()))?;
    }
    ParquetStore::write_derived(&output, &derived)?;
    if let Some(csv_path) = &csv_export {
        if let Some(parent) = csv_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create export dir: {}", parent.display()))?;
        }
        CsvStore::write_derived(csv_path, &derived)?;
    }

    let markets: HashSet<&str> = derived
        .iter()
        .map(|r| r.canonical.contract_market_code.as_str())
        .collect();
    let first_date = derived.iter().map(|r| r.canonical.report_date).min();
    let last_date = derived.iter().map(|r| r.canonical.report_date).max();
    info!(
        rows = derived.len(),
        markets = markets.len(),
        duplicates_dropped = outcome.duplicates_dropped,
        rejected_files = outcome.failures.len(),
        first_date = ?first_date,
        last_date = ?last_date,
        output = %output.display(),
        "normalization run complete"
    );

    Ok(())
}

/// Lists `*.txt` files in the raw directory, sorted lexically ascending.
fn discover_raw_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read raw dir: {}", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("txt") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
