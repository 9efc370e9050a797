//! Summary Export Module
//! Writes the cleaning and outlier reports to a JSON file.

use crate::data::CleaningReport;
use crate::stats::OutlierReport;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Data error: {0}")]
    Data(#[from] polars::prelude::PolarsError),
    #[error("Render error: {0}")]
    Render(String),
}

/// Everything the dashboard computed for one session.
#[derive(Debug, Serialize)]
pub struct SessionSummary<'a> {
    pub source: String,
    pub cleaning: Option<&'a CleaningReport>,
    pub outliers: Vec<&'a OutlierReport>,
    pub skipped_columns: Vec<String>,
}

pub struct SummaryExporter;

impl SummaryExporter {
    pub fn write_json(summary: &SessionSummary<'_>, path: &Path) -> Result<(), ExportError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, summary)?;
        writer.flush()?;
        info!(path = %path.display(), "summary exported");
        Ok(())
    }
}
