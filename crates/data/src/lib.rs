pub mod combine;
pub mod csv_store;
pub mod parquet_store;
pub mod reconcile;
pub mod schema;

pub use combine::{reconcile_and_combine, FileFailure, RunOutcome};
pub use csv_store::CsvStore;
pub use parquet_store::ParquetStore;
pub use reconcile::{reconcile_file, FileReport};
pub use schema::{normalize_header, resolve_header, CanonicalColumn, HEADER_MAP};
