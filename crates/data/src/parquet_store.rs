//! Parquet output for the derived dataset.
//!
//! One flat file per run, full overwrite. No partitioning is imposed here;
//! downstream tooling may repartition by year if it wants to.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use cot_analytics_core::DerivedRecord;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

/// Days from 0001-01-01 (CE) to the Unix epoch; Date32 counts days since
/// the epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub struct ParquetStore;

impl ParquetStore {
    /// Writes the derived dataset to a single Parquet file, replacing any
    /// existing file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or if writing the
    /// Parquet data fails.
    pub fn write_derived(path: &Path, records: &[DerivedRecord]) -> Result<()> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("report_date", DataType::Date32, false),
            Field::new("contract_market_code", DataType::Utf8, false),
            Field::new("market_and_exchange", DataType::Utf8, true),
            Field::new("open_interest", DataType::Int64, true),
            Field::new("open_interest_change", DataType::Int64, true),
            Field::new("noncommercial_long", DataType::Int64, true),
            Field::new("noncommercial_short", DataType::Int64, true),
            Field::new("noncommercial_long_change", DataType::Int64, true),
            Field::new("noncommercial_short_change", DataType::Int64, true),
            Field::new("commercial_long", DataType::Int64, true),
            Field::new("commercial_short", DataType::Int64, true),
            Field::new("commercial_long_change", DataType::Int64, true),
            Field::new("commercial_short_change", DataType::Int64, true),
            Field::new("total_reportable_long", DataType::Int64, true),
            Field::new("total_reportable_short", DataType::Int64, true),
            Field::new("nonreportable_long", DataType::Int64, true),
            Field::new("nonreportable_short", DataType::Int64, true),
            Field::new("source_file", DataType::Utf8, false),
            Field::new("noncommercial_net", DataType::Int64, true),
            Field::new("commercial_net", DataType::Int64, true),
            Field::new("noncommercial_cot_index_156w", DataType::Float64, false),
            Field::new("noncommercial_net_zscore_52w", DataType::Float64, true),
            Field::new("noncommercial_net_change_wow", DataType::Int64, true),
            Field::new("commercial_net_change_wow", DataType::Int64, true),
        ]));

        let dates = Date32Array::from(
            records
                .iter()
                .map(|r| days_since_epoch(r.canonical.report_date))
                .collect::<Vec<i32>>(),
        );
        let market_codes = StringArray::from(
            records
                .iter()
                .map(|r| r.canonical.contract_market_code.clone())
                .collect::<Vec<String>>(),
        );
        let market_names = StringArray::from(
            records
                .iter()
                .map(|r| r.canonical.market_and_exchange.clone())
                .collect::<Vec<Option<String>>>(),
        );
        let source_files = StringArray::from(
            records
                .iter()
                .map(|r| r.canonical.source_file.clone())
                .collect::<Vec<String>>(),
        );
        let cot_index = Float64Array::from(
            records
                .iter()
                .map(|r| r.noncommercial_cot_index_156w)
                .collect::<Vec<f64>>(),
        );
        let zscore = Float64Array::from(
            records
                .iter()
                .map(|r| r.noncommercial_net_zscore_52w)
                .collect::<Vec<Option<f64>>>(),
        );

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(dates) as ArrayRef,
                Arc::new(market_codes) as ArrayRef,
                Arc::new(market_names) as ArrayRef,
                int_column(records, |r| r.canonical.open_interest),
                int_column(records, |r| r.canonical.open_interest_change),
                int_column(records, |r| r.canonical.noncommercial_long),
                int_column(records, |r| r.canonical.noncommercial_short),
                int_column(records, |r| r.canonical.noncommercial_long_change),
                int_column(records, |r| r.canonical.noncommercial_short_change),
                int_column(records, |r| r.canonical.commercial_long),
                int_column(records, |r| r.canonical.commercial_short),
                int_column(records, |r| r.canonical.commercial_long_change),
                int_column(records, |r| r.canonical.commercial_short_change),
                int_column(records, |r| r.canonical.total_reportable_long),
                int_column(records, |r| r.canonical.total_reportable_short),
                int_column(records, |r| r.canonical.nonreportable_long),
                int_column(records, |r| r.canonical.nonreportable_short),
                Arc::new(source_files) as ArrayRef,
                int_column(records, |r| r.noncommercial_net),
                int_column(records, |r| r.commercial_net),
                Arc::new(cot_index) as ArrayRef,
                Arc::new(zscore) as ArrayRef,
                int_column(records, |r| r.noncommercial_net_change_wow),
                int_column(records, |r| r.commercial_net_change_wow),
            ],
        )?;

        let file = File::create(path)
            .with_context(|| format!("failed to create parquet file: {}", path.display()))?;
        let props = WriterProperties::builder()
            .set_compression(parquet::basic::Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        Ok(())
    }
}

fn int_column(records: &[DerivedRecord], get: impl Fn(&DerivedRecord) -> Option<i64>) -> ArrayRef {
    Arc::new(Int64Array::from(
        records.iter().map(get).collect::<Vec<Option<i64>>>(),
    )) as ArrayRef
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}
