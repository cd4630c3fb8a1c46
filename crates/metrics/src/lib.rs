pub mod engine;
pub mod rolling;

pub use engine::{compute, COT_INDEX_WINDOW, NEUTRAL_COT_INDEX, ZSCORE_WINDOW};
pub use rolling::RollingWindow;
