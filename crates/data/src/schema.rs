//! Header reconciliation table for CFTC Legacy Futures report files.
//!
//! The CFTC has shipped the same report under several header conventions
//! over the years (spaces vs underscores, parenthesized suffixes). The
//! mapping is kept as declarative data so the supported variants stay
//! auditable: adding a new historical spelling is a table entry, not a code
//! change.

/// Canonical columns of the analytics schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalColumn {
    ReportDate,
    ContractMarketCode,
    MarketAndExchange,
    OpenInterest,
    OpenInterestChange,
    NoncommercialLong,
    NoncommercialShort,
    NoncommercialLongChange,
    NoncommercialShortChange,
    CommercialLong,
    CommercialShort,
    CommercialLongChange,
    CommercialShortChange,
    TotalReportableLong,
    TotalReportableShort,
    NonreportableLong,
    NonreportableShort,
}

impl CanonicalColumn {
    /// Canonical field name as it appears in the output dataset.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ReportDate => "report_date",
            Self::ContractMarketCode => "contract_market_code",
            Self::MarketAndExchange => "market_and_exchange",
            Self::OpenInterest => "open_interest",
            Self::OpenInterestChange => "open_interest_change",
            Self::NoncommercialLong => "noncommercial_long",
            Self::NoncommercialShort => "noncommercial_short",
            Self::NoncommercialLongChange => "noncommercial_long_change",
            Self::NoncommercialShortChange => "noncommercial_short_change",
            Self::CommercialLong => "commercial_long",
            Self::CommercialShort => "commercial_short",
            Self::CommercialLongChange => "commercial_long_change",
            Self::CommercialShortChange => "commercial_short_change",
            Self::TotalReportableLong => "total_reportable_long",
            Self::TotalReportableShort => "total_reportable_short",
            Self::NonreportableLong => "nonreportable_long",
            Self::NonreportableShort => "nonreportable_short",
        }
    }
}

use self::CanonicalColumn as C;

/// Known historical header literals and the canonical column each maps to.
///
/// Only the ISO `YYYY-MM-DD` date header maps to `report_date`. The
/// `YY-MM-DD` and `YYMMDD` variants that appear in the same files are
/// deliberately absent: mapping them too would produce duplicate date
/// columns with conflicting formats.
pub const HEADER_MAP: &[(&str, CanonicalColumn)] = &[
    ("As of Date in Form YYYY-MM-DD", C::ReportDate),
    ("As_of_Date_in_Form_YYYY-MM-DD", C::ReportDate),
    ("CFTC Contract Market Code", C::ContractMarketCode),
    ("CFTC_Contract_Market_Code", C::ContractMarketCode),
    ("Market and Exchange Names", C::MarketAndExchange),
    ("Market_and_Exchange_Names", C::MarketAndExchange),
    ("Open Interest (All)", C::OpenInterest),
    ("Open_Interest_All", C::OpenInterest),
    ("Change in Open Interest (All)", C::OpenInterestChange),
    ("Change_in_Open_Interest_All", C::OpenInterestChange),
    ("Noncommercial Positions-Long (All)", C::NoncommercialLong),
    ("Noncommercial_Positions-Long_All", C::NoncommercialLong),
    ("Noncommercial Positions-Short (All)", C::NoncommercialShort),
    ("Noncommercial_Positions-Short_All", C::NoncommercialShort),
    ("Change in Noncommercial-Long (All)", C::NoncommercialLongChange),
    ("Change_in_Noncommercial-Long_All", C::NoncommercialLongChange),
    ("Change in Noncommercial-Short (All)", C::NoncommercialShortChange),
    ("Change_in_Noncommercial-Short_All", C::NoncommercialShortChange),
    ("Commercial Positions-Long (All)", C::CommercialLong),
    ("Commercial_Positions-Long_All", C::CommercialLong),
    ("Commercial Positions-Short (All)", C::CommercialShort),
    ("Commercial_Positions-Short_All", C::CommercialShort),
    ("Change in Commercial-Long (All)", C::CommercialLongChange),
    ("Change_in_Commercial-Long_All", C::CommercialLongChange),
    ("Change in Commercial-Short (All)", C::CommercialShortChange),
    ("Change_in_Commercial-Short_All", C::CommercialShortChange),
    ("Total Reportable-Long (All)", C::TotalReportableLong),
    ("Total_Reportable_Long_All", C::TotalReportableLong),
    ("Total Reportable-Short (All)", C::TotalReportableShort),
    ("Total_Reportable_Short_All", C::TotalReportableShort),
    ("Nonreportable Positions-Long (All)", C::NonreportableLong),
    ("Nonreportable_Positions-Long_All", C::NonreportableLong),
    ("Nonreportable Positions-Short (All)", C::NonreportableShort),
    ("Nonreportable_Positions-Short_All", C::NonreportableShort),
];

/// Resolves a source header to a canonical column: exact table match first,
/// then a retry with whitespace/hyphen/underscore variation collapsed on
/// both sides. Headers matching nothing return `None` and are dropped by
/// the reconciler (source files carry many fields the pipeline never needs).
#[must_use]
pub fn resolve_header(header: &str) -> Option<CanonicalColumn> {
    let header = header.trim();
    for (literal, column) in HEADER_MAP {
        if *literal == header {
            return Some(*column);
        }
    }
    let normalized = normalize_header(header);
    for (literal, column) in HEADER_MAP {
        if normalize_header(literal) == normalized {
            return Some(*column);
        }
    }
    None
}

/// Collapses the punctuation differences between header conventions:
/// lowercases, folds runs of spaces/hyphens/underscores into a single
/// underscore, and drops other punctuation (parentheses).
#[must_use]
pub fn normalize_header(header: &str) -> String {
    let mut normalized = String::with_capacity(header.len());
    let mut pending_separator = false;
    for ch in header.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('_');
            }
            pending_separator = false;
            normalized.push(ch.to_ascii_lowercase());
        } else if matches!(ch, ' ' | '-' | '_') {
            pending_separator = true;
        }
    }
    normalized
}
