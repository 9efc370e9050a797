//! Outlier Analyzer Module
//! Interquartile-range fences per numeric column.

use super::calculator::StatsCalculator;
use crate::data::schema::OUTLIER_COLUMNS;
use crate::data::{AnalysisError, DataProcessor};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// Fence multiplier applied to the IQR.
pub const IQR_FENCE: f64 = 1.5;

/// Quartile bounds and outlier share of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub outlier_count: usize,
    /// Share of the whole table's rows, not of this column's non-missing values.
    pub outlier_percentage: f64,
    pub total_rows: usize,
    /// Non-missing values, sorted ascending.
    #[serde(skip)]
    pub values: Vec<f64>,
}

impl OutlierReport {
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower_bound || value > self.upper_bound
    }

    /// Smallest and largest values inside the fences (boxplot whiskers).
    pub fn whiskers(&self) -> (f64, f64) {
        let low = self
            .values
            .iter()
            .copied()
            .find(|&v| v >= self.lower_bound)
            .unwrap_or(self.q1);
        let high = self
            .values
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= self.upper_bound)
            .unwrap_or(self.q3);
        (low, high)
    }

    pub fn median(&self) -> f64 {
        StatsCalculator::percentile(&self.values, 50.0)
    }

    pub fn outliers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|&v| self.is_outlier(v))
    }
}

pub struct OutlierAnalyzer;

impl OutlierAnalyzer {
    /// Compute IQR fences for `column` over the whole table.
    pub fn analyze(df: &DataFrame, column: &str) -> Result<OutlierReport, AnalysisError> {
        let mut values: Vec<f64> = DataProcessor::numeric_values(df, column)?
            .into_iter()
            .flatten()
            .collect();
        values.sort_by(|a, b| a.total_cmp(b));

        let q1 = StatsCalculator::percentile(&values, 25.0);
        let q3 = StatsCalculator::percentile(&values, 75.0);
        let iqr = q3 - q1;
        let lower_bound = q1 - IQR_FENCE * iqr;
        let upper_bound = q3 + IQR_FENCE * iqr;

        let outlier_count = values
            .iter()
            .filter(|&&v| v < lower_bound || v > upper_bound)
            .count();
        let total_rows = df.height();
        let outlier_percentage = if total_rows == 0 {
            0.0
        } else {
            100.0 * outlier_count as f64 / total_rows as f64
        };

        debug!(column, q1, q3, outlier_count, "outlier fences computed");

        Ok(OutlierReport {
            column: column.to_string(),
            q1,
            q3,
            iqr,
            lower_bound,
            upper_bound,
            outlier_count,
            outlier_percentage,
            total_rows,
            values,
        })
    }

    /// Reports for every outlier column, in fixed order. Missing columns
    /// yield an error entry instead of a report.
    pub fn analyze_all(df: &DataFrame) -> Vec<(String, Result<OutlierReport, AnalysisError>)> {
        OUTLIER_COLUMNS
            .par_iter()
            .map(|column| {
                let report = Self::analyze(df, column);
                if let Err(err) = &report {
                    warn!("{}", err);
                }
                (column.to_string(), report)
            })
            .collect()
    }
}
