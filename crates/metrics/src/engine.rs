//! Per-market rolling indicator computation.
//!
//! Takes the deduplicated canonical dataset, partitions it by contract
//! market code, sorts each partition by report date, and appends the derived
//! indicator columns. No filtering happens here: every input row produces
//! exactly one output row, and no state crosses market boundaries.

use std::collections::BTreeMap;

use cot_analytics_core::{CanonicalRecord, DerivedRecord};
use tracing::debug;

use crate::rolling::RollingWindow;

/// Trailing window for the COT Index, inclusive of the current week.
pub const COT_INDEX_WINDOW: usize = 156;

/// Trailing window for the net-position z-score, inclusive of the current
/// week.
pub const ZSCORE_WINDOW: usize = 52;

/// COT Index value used when the trailing range is zero or undefined.
pub const NEUTRAL_COT_INDEX: f64 = 50.0;

/// Computes the derived indicator columns for the whole dataset.
///
/// Output ordering is canonical: contract market code ascending, then report
/// date ascending.
#[must_use]
pub fn compute(records: Vec<CanonicalRecord>) -> Vec<DerivedRecord> {
    let total = records.len();
    let mut groups: BTreeMap<String, Vec<CanonicalRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.contract_market_code.clone())
            .or_default()
            .push(record);
    }
    debug!(rows = total, markets = groups.len(), "computing rolling indicators");

    let mut derived = Vec::with_capacity(total);
    for mut group in groups.into_values() {
        group.sort_by_key(|record| record.report_date);
        compute_group(group, &mut derived);
    }
    derived
}

/// Computes indicators for one market's date-ascending series, appending to
/// `out`.
fn compute_group(group: Vec<CanonicalRecord>, out: &mut Vec<DerivedRecord>) {
    let mut index_window = RollingWindow::new(COT_INDEX_WINDOW);
    let mut zscore_window = RollingWindow::new(ZSCORE_WINDOW);
    let mut prev_noncommercial_net: Option<i64> = None;
    let mut prev_commercial_net: Option<i64> = None;
    let mut is_first_row = true;

    for record in group {
        let noncommercial_net = record.noncommercial_net();
        let commercial_net = record.commercial_net();

        index_window.push(noncommercial_net);
        zscore_window.push(noncommercial_net);

        // Zero-range windows (including the single-observation case) and
        // rows without a current net read as neutral, not undefined.
        #[allow(clippy::cast_precision_loss)]
        let cot_index = match (noncommercial_net, index_window.range()) {
            (Some(net), Some((lo, hi))) if hi > lo => {
                100.0 * (net - lo) as f64 / (hi - lo) as f64
            }
            _ => NEUTRAL_COT_INDEX,
        };

        // Unlike the COT Index, a zero-std window leaves the z-score null.
        #[allow(clippy::cast_precision_loss)]
        let zscore = match (noncommercial_net, zscore_window.mean_std()) {
            (Some(net), Some((mean, std))) if std > 0.0 => Some((net as f64 - mean) / std),
            _ => None,
        };

        let noncommercial_net_change_wow = if is_first_row {
            None
        } else {
            match (noncommercial_net, prev_noncommercial_net) {
                (Some(current), Some(prev)) => Some(current - prev),
                _ => None,
            }
        };
        let commercial_net_change_wow = if is_first_row {
            None
        } else {
            match (commercial_net, prev_commercial_net) {
                (Some(current), Some(prev)) => Some(current - prev),
                _ => None,
            }
        };

        prev_noncommercial_net = noncommercial_net;
        prev_commercial_net = commercial_net;
        is_first_row = false;

        out.push(DerivedRecord {
            canonical: record,
            noncommercial_net,
            commercial_net,
            noncommercial_cot_index_156w: cot_index,
            noncommercial_net_zscore_52w: zscore,
            noncommercial_net_change_wow,
            commercial_net_change_wow,
        });
    }
}
