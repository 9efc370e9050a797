//! Data module - loading, cleaning and filtering

mod cache;
mod cleaner;
mod loader;
mod processor;
pub mod schema;

pub use cache::{LoadedData, SessionCache};
pub use cleaner::{CleaningReport, DataCleaner};
pub use loader::{ColumnInfo, DataLoader};
pub use processor::{AnalysisError, CountTable, DataProcessor, ScatterSeries};
