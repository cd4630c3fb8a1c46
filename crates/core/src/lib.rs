pub mod config;
pub mod config_loader;
pub mod error;
pub mod records;

pub use config::{AppConfig, DataConfig};
pub use config_loader::ConfigLoader;
pub use error::PipelineError;
pub use records::{CanonicalRecord, DerivedRecord};
