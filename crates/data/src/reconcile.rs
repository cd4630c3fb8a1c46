//! Per-file schema reconciliation.
//!
//! Turns one raw report file (tab- or comma-delimited, header row present)
//! into canonical records. Row-level problems are dropped and counted in the
//! [`FileReport`]; only a header set with no resolvable `report_date` column
//! rejects the file.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use cot_analytics_core::{CanonicalRecord, PipelineError};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::schema::{resolve_header, CanonicalColumn};

/// Reconciliation diagnostics for one source file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub source_file: String,
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Rows whose date field failed strict `YYYY-MM-DD` parsing.
    pub rows_dropped_bad_date: usize,
    /// Rows with an empty contract market code after coercion.
    pub rows_dropped_missing_code: usize,
    /// Source columns discarded because an earlier column already claimed
    /// the same canonical name.
    pub shadowed_columns: Vec<String>,
}

impl FileReport {
    fn new(source_file: String) -> Self {
        Self {
            source_file,
            rows_read: 0,
            rows_kept: 0,
            rows_dropped_bad_date: 0,
            rows_dropped_missing_code: 0,
            shadowed_columns: Vec::new(),
        }
    }

    /// Total rows dropped from this file's contribution.
    #[must_use]
    pub fn rows_dropped(&self) -> usize {
        self.rows_dropped_bad_date + self.rows_dropped_missing_code
    }
}

/// Reconciles one raw report file into canonical records.
///
/// # Errors
///
/// - [`PipelineError::Io`] if the file cannot be read.
/// - [`PipelineError::Csv`] if the delimited-text layer fails structurally.
/// - [`PipelineError::MissingRequiredField`] if no source column resolves to
///   `report_date`.
pub fn reconcile_file(path: &Path) -> Result<(Vec<CanonicalRecord>, FileReport), PipelineError> {
    let source_file = file_name(path);
    let raw = fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let (headers, rows) = parse_delimited(&raw, &source_file)?;
    let mut report = FileReport::new(source_file.clone());
    let columns = resolve_columns(&headers, &mut report);
    debug!(
        file = %source_file,
        mapped = columns.len(),
        total = headers.len(),
        "resolved header columns"
    );

    let Some(date_index) = column_index(&columns, CanonicalColumn::ReportDate) else {
        return Err(PipelineError::MissingRequiredField {
            file: source_file,
            field: "report_date",
        });
    };
    let code_index = column_index(&columns, CanonicalColumn::ContractMarketCode);

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        report.rows_read += 1;

        let date_raw = row.get(date_index).unwrap_or("").trim();
        let Ok(report_date) = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d") else {
            report.rows_dropped_bad_date += 1;
            continue;
        };

        let code = code_index
            .and_then(|index| row.get(index))
            .map_or("", str::trim);
        if code.is_empty() {
            report.rows_dropped_missing_code += 1;
            continue;
        }

        let mut record =
            CanonicalRecord::new(report_date, code.to_string(), source_file.clone());
        for (index, column) in &columns {
            apply_field(&mut record, *column, row.get(*index).unwrap_or(""));
        }
        report.rows_kept += 1;
        records.push(record);
    }

    if report.rows_dropped() > 0 {
        debug!(
            file = %source_file,
            bad_date = report.rows_dropped_bad_date,
            missing_code = report.rows_dropped_missing_code,
            "dropped unparseable rows"
        );
    }
    Ok((records, report))
}

/// Parses the raw text, trying tab-delimited first. A tab parse that errors,
/// or whose header comes back as a single column (tabs split nothing), falls
/// back to comma-delimited.
fn parse_delimited(
    raw: &str,
    source_file: &str,
) -> Result<(StringRecord, Vec<StringRecord>), PipelineError> {
    match read_with_delimiter(raw, b'\t', source_file) {
        Ok((headers, rows)) if headers.len() > 1 => Ok((headers, rows)),
        _ => read_with_delimiter(raw, b',', source_file),
    }
}

fn read_with_delimiter(
    raw: &str,
    delimiter: u8,
    source_file: &str,
) -> Result<(StringRecord, Vec<StringRecord>), PipelineError> {
    let csv_error = |source| PipelineError::Csv {
        file: source_file.to_string(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(raw.as_bytes());
    let headers = reader.headers().map_err(csv_error)?.clone();
    let mut rows = Vec::new();
    for result in reader.records() {
        rows.push(result.map_err(csv_error)?);
    }
    Ok((headers, rows))
}

/// Maps file-column positions to canonical columns. When two source columns
/// resolve to the same canonical name, the first in file order wins and the
/// duplicate is recorded as shadowed.
fn resolve_columns(
    headers: &StringRecord,
    report: &mut FileReport,
) -> Vec<(usize, CanonicalColumn)> {
    let mut columns: Vec<(usize, CanonicalColumn)> = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        let Some(column) = resolve_header(header) else {
            continue;
        };
        if columns.iter().any(|(_, claimed)| *claimed == column) {
            warn!(
                file = %report.source_file,
                source_column = header.trim(),
                canonical = column.name(),
                "column shadowed by an earlier mapping; keeping first"
            );
            report.shadowed_columns.push(header.trim().to_string());
            continue;
        }
        columns.push((index, column));
    }
    columns
}

fn column_index(columns: &[(usize, CanonicalColumn)], wanted: CanonicalColumn) -> Option<usize> {
    columns
        .iter()
        .find(|(_, column)| *column == wanted)
        .map(|(index, _)| *index)
}

fn apply_field(record: &mut CanonicalRecord, column: CanonicalColumn, raw: &str) {
    use crate::schema::CanonicalColumn as C;
    match column {
        // Key fields are handled before the record is built.
        C::ReportDate | C::ContractMarketCode => {}
        C::MarketAndExchange => {
            let trimmed = raw.trim();
            record.market_and_exchange = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        C::OpenInterest => record.open_interest = parse_integer(raw),
        C::OpenInterestChange => record.open_interest_change = parse_integer(raw),
        C::NoncommercialLong => record.noncommercial_long = parse_integer(raw),
        C::NoncommercialShort => record.noncommercial_short = parse_integer(raw),
        C::NoncommercialLongChange => record.noncommercial_long_change = parse_integer(raw),
        C::NoncommercialShortChange => record.noncommercial_short_change = parse_integer(raw),
        C::CommercialLong => record.commercial_long = parse_integer(raw),
        C::CommercialShort => record.commercial_short = parse_integer(raw),
        C::CommercialLongChange => record.commercial_long_change = parse_integer(raw),
        C::CommercialShortChange => record.commercial_short_change = parse_integer(raw),
        C::TotalReportableLong => record.total_reportable_long = parse_integer(raw),
        C::TotalReportableShort => record.total_reportable_short = parse_integer(raw),
        C::NonreportableLong => record.nonreportable_long = parse_integer(raw),
        C::NonreportableShort => record.nonreportable_short = parse_integer(raw),
    }
}

/// Coerces a position field to an integer. Blanks, placeholder dots, and
/// text become `None`, never zero; zero-filling is a consumer decision.
/// Some historical files format counts with thousands separators or a
/// trailing `.0`, both accepted here.
fn parse_integer(raw: &str) -> Option<i64> {
    let cleaned: String = raw.trim().chars().filter(|ch| *ch != ',').collect();
    if cleaned.is_empty() || cleaned == "." {
        return None;
    }
    if let Ok(value) = cleaned.parse::<i64>() {
        return Some(value);
    }
    match cleaned.parse::<f64>() {
        #[allow(clippy::cast_possible_truncation)]
        Ok(value) if value.fract() == 0.0 && value.abs() < 9.0e18 => Some(value as i64),
        _ => None,
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const SPACE_HEADER: &str = "Market and Exchange Names\tAs of Date in Form YYYY-MM-DD\tCFTC Contract Market Code\tOpen Interest (All)\tNoncommercial Positions-Long (All)\tNoncommercial Positions-Short (All)\tCommercial Positions-Long (All)\tCommercial Positions-Short (All)";

    const UNDERSCORE_HEADER: &str = "Market_and_Exchange_Names\tAs_of_Date_in_Form_YYYY-MM-DD\tCFTC_Contract_Market_Code\tOpen_Interest_All\tNoncommercial_Positions-Long_All\tNoncommercial_Positions-Short_All\tCommercial_Positions-Long_All\tCommercial_Positions-Short_All";

    fn sample_row(date: &str, code: &str, nc_long: &str, nc_short: &str) -> String {
        format!("CANADIAN DOLLAR - CHICAGO MERCANTILE EXCHANGE\t{date}\t{code}\t150000\t{nc_long}\t{nc_short}\t40000\t60000")
    }

    #[test]
    fn reconciles_tab_delimited_space_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "annual_2024.txt",
            &format!(
                "{SPACE_HEADER}\n{}\n",
                sample_row("2024-01-02", "090741", "50000", "30000")
            ),
        );

        let (records, report) = reconcile_file(&path).unwrap();
        assert_eq!(report.rows_read, 1);
        assert_eq!(report.rows_kept, 1);
        assert_eq!(records.len(), 1);

        let rec = &records[0];
        assert_eq!(
            rec.report_date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(rec.contract_market_code, "090741");
        assert_eq!(
            rec.market_and_exchange.as_deref(),
            Some("CANADIAN DOLLAR - CHICAGO MERCANTILE EXCHANGE")
        );
        assert_eq!(rec.open_interest, Some(150_000));
        assert_eq!(rec.noncommercial_long, Some(50_000));
        assert_eq!(rec.noncommercial_short, Some(30_000));
        assert_eq!(rec.commercial_long, Some(40_000));
        assert_eq!(rec.commercial_short, Some(60_000));
        // Columns absent from the file stay null.
        assert_eq!(rec.total_reportable_long, None);
        assert_eq!(rec.source_file, "annual_2024.txt");
    }

    #[test]
    fn header_variants_reconcile_to_identical_records() {
        let dir = tempfile::tempdir().unwrap();
        let row = sample_row("2024-01-02", "090741", "50000", "30000");
        let spaced = write_file(&dir, "a.txt", &format!("{SPACE_HEADER}\n{row}\n"));
        let underscored = write_file(&dir, "b.txt", &format!("{UNDERSCORE_HEADER}\n{row}\n"));

        let (mut from_spaced, _) = reconcile_file(&spaced).unwrap();
        let (mut from_underscored, _) = reconcile_file(&underscored).unwrap();
        // Provenance tags differ by construction; blank them for comparison.
        from_spaced[0].source_file.clear();
        from_underscored[0].source_file.clear();
        assert_eq!(from_spaced, from_underscored);
    }

    #[test]
    fn falls_back_to_comma_delimited() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "annual_2020.txt",
            "\"Market and Exchange Names\",\"As of Date in Form YYYY-MM-DD\",\"CFTC Contract Market Code\",\"Open Interest (All)\"\n\"CANADIAN DOLLAR - CME\",2020-06-09,090741,120000\n",
        );

        let (records, _) = reconcile_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].contract_market_code, "090741");
        assert_eq!(records[0].open_interest, Some(120_000));
    }

    #[test]
    fn unparseable_dates_are_dropped_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "annual_2024.txt",
            &format!(
                "{SPACE_HEADER}\n{}\n{}\n{}\n",
                sample_row("2024-01-02", "090741", "50000", "30000"),
                sample_row("01/09/2024", "090741", "52000", "33000"),
                sample_row("", "090741", "51000", "31000"),
            ),
        );

        let (records, report) = reconcile_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_dropped_bad_date, 2);
        assert_eq!(report.rows_dropped(), 2);
    }

    #[test]
    fn rows_without_market_code_are_dropped_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "annual_2024.txt",
            &format!(
                "{SPACE_HEADER}\n{}\n{}\n",
                sample_row("2024-01-02", "", "50000", "30000"),
                sample_row("2024-01-09", "090741", "52000", "33000"),
            ),
        );

        let (records, report) = reconcile_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_dropped_missing_code, 1);
        assert_eq!(records[0].contract_market_code, "090741");
    }

    #[test]
    fn non_numeric_positions_become_null_not_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "annual_2024.txt",
            &format!(
                "{SPACE_HEADER}\n{}\n",
                sample_row("2024-01-02", "090741", ".", "n/a")
            ),
        );

        let (records, _) = reconcile_file(&path).unwrap();
        assert_eq!(records[0].noncommercial_long, None);
        assert_eq!(records[0].noncommercial_short, None);
        // Other numeric fields on the same row still parse.
        assert_eq!(records[0].open_interest, Some(150_000));
    }

    #[test]
    fn thousands_separators_and_float_formatting_parse() {
        assert_eq!(parse_integer("1,234,567"), Some(1_234_567));
        assert_eq!(parse_integer("12345.0"), Some(12_345));
        assert_eq!(parse_integer("-42"), Some(-42));
        assert_eq!(parse_integer("  77 "), Some(77));
        assert_eq!(parse_integer("12.5"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn missing_date_header_rejects_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "annual_1999.txt",
            "CFTC Contract Market Code\tOpen Interest (All)\n090741\t150000\n",
        );

        let err = reconcile_file(&path).unwrap_err();
        match err {
            PipelineError::MissingRequiredField { file, field } => {
                assert_eq!(file, "annual_1999.txt");
                assert_eq!(field, "report_date");
            }
            other => panic!("expected MissingRequiredField, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_canonical_columns_keep_first_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        // Same canonical column under both spellings; values differ so the
        // winner is observable.
        let path = write_file(
            &dir,
            "annual_2024.txt",
            "As of Date in Form YYYY-MM-DD\tCFTC Contract Market Code\tOpen Interest (All)\tOpen_Interest_All\n2024-01-02\t090741\t111\t222\n",
        );

        let (records, report) = reconcile_file(&path).unwrap();
        assert_eq!(records[0].open_interest, Some(111));
        assert_eq!(report.shadowed_columns, vec!["Open_Interest_All"]);
    }

    #[test]
    fn alternate_date_formats_in_other_columns_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        // A YYMMDD date column sits right next to the ISO one; it must not
        // be mapped, so the ISO value wins unambiguously.
        let path = write_file(
            &dir,
            "annual_2024.txt",
            "As of Date in Form YYMMDD\tAs of Date in Form YYYY-MM-DD\tCFTC Contract Market Code\n240102\t2024-01-02\t090741\n",
        );

        let (records, report) = reconcile_file(&path).unwrap();
        assert!(report.shadowed_columns.is_empty());
        assert_eq!(
            records[0].report_date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = reconcile_file(Path::new("does/not/exist.txt")).unwrap_err();
        assert!(err.is_retryable());
    }
}
