//! CSV export of the derived dataset.
//!
//! Produced for the analytical query store's bulk full-table load. Dates are
//! ISO formatted, nulls are empty fields, and rows keep the canonical
//! (market, date) ordering the metrics engine emits.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use cot_analytics_core::DerivedRecord;
use csv::Writer;

const HEADER: [&str; 24] = [
    "report_date",
    "contract_market_code",
    "market_and_exchange",
    "open_interest",
    "open_interest_change",
    "noncommercial_long",
    "noncommercial_short",
    "noncommercial_long_change",
    "noncommercial_short_change",
    "commercial_long",
    "commercial_short",
    "commercial_long_change",
    "commercial_short_change",
    "total_reportable_long",
    "total_reportable_short",
    "nonreportable_long",
    "nonreportable_short",
    "source_file",
    "noncommercial_net",
    "commercial_net",
    "noncommercial_cot_index_156w",
    "noncommercial_net_zscore_52w",
    "noncommercial_net_change_wow",
    "commercial_net_change_wow",
];

pub struct CsvStore;

impl CsvStore {
    /// Writes the derived dataset to a CSV file, replacing any existing file
    /// at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or writing fails.
    pub fn write_derived(path: &Path, records: &[DerivedRecord]) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        writer.write_record(HEADER)?;
        for record in records {
            let c = &record.canonical;
            writer.write_record(&[
                c.report_date.format("%Y-%m-%d").to_string(),
                c.contract_market_code.clone(),
                c.market_and_exchange.clone().unwrap_or_default(),
                opt_int(c.open_interest),
                opt_int(c.open_interest_change),
                opt_int(c.noncommercial_long),
                opt_int(c.noncommercial_short),
                opt_int(c.noncommercial_long_change),
                opt_int(c.noncommercial_short_change),
                opt_int(c.commercial_long),
                opt_int(c.commercial_short),
                opt_int(c.commercial_long_change),
                opt_int(c.commercial_short_change),
                opt_int(c.total_reportable_long),
                opt_int(c.total_reportable_short),
                opt_int(c.nonreportable_long),
                opt_int(c.nonreportable_short),
                c.source_file.clone(),
                opt_int(record.noncommercial_net),
                opt_int(record.commercial_net),
                record.noncommercial_cot_index_156w.to_string(),
                record
                    .noncommercial_net_zscore_52w
                    .map(|z| z.to_string())
                    .unwrap_or_default(),
                opt_int(record.noncommercial_net_change_wow),
                opt_int(record.commercial_net_change_wow),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn opt_int(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cot_analytics_core::CanonicalRecord;

    #[test]
    fn exports_nulls_as_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy_futures.csv");

        let mut canonical = CanonicalRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            "090741".to_string(),
            "annual_2024.txt".to_string(),
        );
        canonical.noncommercial_long = Some(50_000);
        canonical.noncommercial_short = Some(30_000);
        let records = vec![DerivedRecord {
            canonical,
            noncommercial_net: Some(20_000),
            commercial_net: None,
            noncommercial_cot_index_156w: 50.0,
            noncommercial_net_zscore_52w: None,
            noncommercial_net_change_wow: None,
            commercial_net_change_wow: None,
        }];

        CsvStore::write_derived(&path, &records).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("report_date,contract_market_code"));
        assert!(header.ends_with("noncommercial_net_change_wow,commercial_net_change_wow"));

        let row = lines.next().unwrap();
        assert!(row.starts_with("2024-01-02,090741,"));
        assert!(row.contains(",20000,")); // noncommercial_net
        assert!(row.contains(",50,")); // cot index, empty zscore follows
        assert!(row.ends_with(",,")); // null wow changes
        assert!(lines.next().is_none());
    }
}
