//! Pipeline error taxonomy.
//!
//! Fatal conditions carry enough structure for callers to tell "no data"
//! apart from "malformed schema" apart from plain I/O. Row-level problems
//! (unparseable dates, missing market codes, shadowed columns) are not
//! errors: they are counted in the per-file diagnostics and logged.

use thiserror::Error;

/// Errors surfaced by the normalization pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A file's reconciled header set lacks a required canonical column.
    /// Fatal for that file; sibling files are unaffected. Fixing it requires
    /// either a corrected source file or an addition to the header table.
    #[error("file '{file}' has no '{field}' column after header reconciliation")]
    MissingRequiredField { file: String, field: &'static str },

    /// No raw files were supplied, or every file was rejected or contributed
    /// zero usable rows. Distinct from a successful-but-empty query result.
    #[error("no raw input files produced any usable rows")]
    EmptyInputSet,

    /// An input or output file could not be read or written. Typically
    /// transient (missing file, permissions) and retryable.
    #[error("i/o error on '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The delimited-text layer itself failed (not a row-level parse
    /// problem). Structural, not retryable.
    #[error("malformed delimited text in '{file}'")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

impl PipelineError {
    /// Whether retrying the run without code or data changes could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
