//! Multi-file combination: stable-order concatenation, per-file failure
//! isolation, and last-wins deduplication.
//!
//! The caller's path order is a hard contract, not a detail: the surviving
//! row of a duplicate `(report_date, contract_market_code)` key is the last
//! one in that order, so changing the order changes the dataset.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use cot_analytics_core::{CanonicalRecord, PipelineError};
use tracing::{debug, warn};

use crate::reconcile::{file_name, reconcile_file, FileReport};

/// A file whose contribution was rejected in its entirety.
#[derive(Debug)]
pub struct FileFailure {
    pub source_file: String,
    pub error: PipelineError,
}

/// Result of reconciling and combining a run's input files.
#[derive(Debug)]
pub struct RunOutcome {
    /// Combined, deduplicated canonical records in input order.
    pub records: Vec<CanonicalRecord>,
    /// Per-file diagnostics for the files that contributed.
    pub reports: Vec<FileReport>,
    /// Files rejected as a whole; siblings are unaffected.
    pub failures: Vec<FileFailure>,
    /// Rows discarded by last-wins key deduplication.
    pub duplicates_dropped: usize,
}

/// Reconciles every input file and combines the contributions.
///
/// Per-file errors are isolated: a rejected file lands in
/// [`RunOutcome::failures`] and processing continues with its siblings.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInputSet`] if `paths` is empty or no file
/// contributed any usable row — a condition distinct from a successful run
/// over sparse data.
pub fn reconcile_and_combine(paths: &[PathBuf]) -> Result<RunOutcome, PipelineError> {
    if paths.is_empty() {
        return Err(PipelineError::EmptyInputSet);
    }

    let mut records = Vec::new();
    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for path in paths {
        match reconcile_file(path) {
            Ok((file_records, report)) => {
                debug!(
                    file = %report.source_file,
                    kept = report.rows_kept,
                    dropped = report.rows_dropped(),
                    "reconciled file"
                );
                records.extend(file_records);
                reports.push(report);
            }
            Err(error) => {
                warn!(file = %file_name(path), %error, "rejected input file");
                failures.push(FileFailure {
                    source_file: file_name(path),
                    error,
                });
            }
        }
    }

    let before = records.len();
    let records = dedup_last_wins(records);
    let duplicates_dropped = before - records.len();
    if duplicates_dropped > 0 {
        debug!(duplicates_dropped, "deduplicated on (report_date, contract_market_code)");
    }

    if records.is_empty() {
        return Err(PipelineError::EmptyInputSet);
    }
    Ok(RunOutcome {
        records,
        reports,
        failures,
        duplicates_dropped,
    })
}

/// Keeps the last occurrence of each `(report_date, contract_market_code)`
/// key; the surviving row stays at the later position, matching the input
/// order contract.
fn dedup_last_wins(records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
    let mut seen: HashSet<(NaiveDate, String)> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    for record in records.into_iter().rev() {
        if seen.insert((record.report_date, record.contract_market_code.clone())) {
            kept.push(record);
        }
    }
    kept.reverse();
    kept
}
