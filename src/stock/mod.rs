pub mod loader;
pub mod types;

pub use loader::{dedupe_stocks, load_stocks, parse_stocks, InputFormat};
pub use types::{is_present, Metric, MetricsRecord, QualitativeOverrides, StockRecord};
