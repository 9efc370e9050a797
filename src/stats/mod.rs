//! Statistics module - Correlation, histograms and outlier detection

mod calculator;
mod outliers;

pub use calculator::{CorrelationMatrix, Histogram, StatsCalculator};
pub use outliers::{OutlierAnalyzer, OutlierReport};
