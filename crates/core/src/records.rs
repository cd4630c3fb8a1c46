//! Canonical row types for the COT Legacy Futures pipeline.
//!
//! A `CanonicalRecord` is one reconciled report row; a `DerivedRecord` is the
//! same row extended with the per-market rolling indicators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One COT Legacy Futures report row after schema reconciliation.
///
/// Position fields are nullable: a value missing or unparseable in the source
/// file stays `None` here. Zero-filling, if a consumer wants it, is the
/// consumer's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Report date, parsed strictly from the `YYYY-MM-DD` source field.
    pub report_date: NaiveDate,
    /// CFTC contract market code, unique per traded market.
    pub contract_market_code: String,
    /// Free-text market/exchange name.
    pub market_and_exchange: Option<String>,
    /// Total open interest (all).
    pub open_interest: Option<i64>,
    /// Week-over-week change in open interest.
    pub open_interest_change: Option<i64>,
    /// Noncommercial (large speculator) long positions.
    pub noncommercial_long: Option<i64>,
    /// Noncommercial short positions.
    pub noncommercial_short: Option<i64>,
    pub noncommercial_long_change: Option<i64>,
    pub noncommercial_short_change: Option<i64>,
    /// Commercial (hedger) long positions.
    pub commercial_long: Option<i64>,
    /// Commercial short positions.
    pub commercial_short: Option<i64>,
    pub commercial_long_change: Option<i64>,
    pub commercial_short_change: Option<i64>,
    pub total_reportable_long: Option<i64>,
    pub total_reportable_short: Option<i64>,
    pub nonreportable_long: Option<i64>,
    pub nonreportable_short: Option<i64>,
    /// Name of the raw file this row came from (provenance).
    pub source_file: String,
}

impl CanonicalRecord {
    /// Creates an empty record for the given key fields; position fields
    /// start as `None` and are filled in by the reconciler.
    #[must_use]
    pub fn new(report_date: NaiveDate, contract_market_code: String, source_file: String) -> Self {
        Self {
            report_date,
            contract_market_code,
            market_and_exchange: None,
            open_interest: None,
            open_interest_change: None,
            noncommercial_long: None,
            noncommercial_short: None,
            noncommercial_long_change: None,
            noncommercial_short_change: None,
            commercial_long: None,
            commercial_short: None,
            commercial_long_change: None,
            commercial_short_change: None,
            total_reportable_long: None,
            total_reportable_short: None,
            nonreportable_long: None,
            nonreportable_short: None,
            source_file,
        }
    }

    /// Dedup key: `(report_date, contract_market_code)` is unique in the
    /// combined dataset.
    #[must_use]
    pub fn key(&self) -> (NaiveDate, &str) {
        (self.report_date, self.contract_market_code.as_str())
    }

    /// Noncommercial net position (long minus short), `None` if either
    /// operand is missing.
    #[must_use]
    pub fn noncommercial_net(&self) -> Option<i64> {
        match (self.noncommercial_long, self.noncommercial_short) {
            (Some(long), Some(short)) => Some(long - short),
            _ => None,
        }
    }

    /// Commercial net position (long minus short), `None` if either operand
    /// is missing.
    #[must_use]
    pub fn commercial_net(&self) -> Option<i64> {
        match (self.commercial_long, self.commercial_short) {
            (Some(long), Some(short)) => Some(long - short),
            _ => None,
        }
    }
}

/// A `CanonicalRecord` extended with the rolling sentiment indicators.
///
/// Produced once per run by the metrics engine; one output row per input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    #[serde(flatten)]
    pub canonical: CanonicalRecord,
    /// Noncommercial long minus short.
    pub noncommercial_net: Option<i64>,
    /// Commercial long minus short.
    pub commercial_net: Option<i64>,
    /// Position of the current noncommercial net within its trailing
    /// 156-week range, rescaled to 0–100. Exactly 50.0 when the window range
    /// is zero or undefined.
    pub noncommercial_cot_index_156w: f64,
    /// Population z-score of the current noncommercial net over its trailing
    /// 52-week window. `None` when the window std is zero.
    pub noncommercial_net_zscore_52w: Option<f64>,
    /// First difference of noncommercial net vs the prior week.
    pub noncommercial_net_change_wow: Option<i64>,
    /// First difference of commercial net vs the prior week.
    pub commercial_net_change_wow: Option<i64>,
}
