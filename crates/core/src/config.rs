use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory scanned for raw `*.txt` report files when no explicit
    /// paths are given.
    pub raw_dir: PathBuf,
    /// Destination Parquet file for the derived dataset (full overwrite).
    pub output_path: PathBuf,
    /// Optional CSV export for the analytical query store's bulk load.
    pub csv_export_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                raw_dir: PathBuf::from("data/cot/raw"),
                output_path: PathBuf::from("data/cot/parquet/legacy_futures.parquet"),
                csv_export_path: None,
            },
        }
    }
}
