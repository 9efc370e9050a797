//! Statistics Calculator Module
//! Percentiles, Pearson correlation and histogram binning.

use crate::data::{AnalysisError, DataProcessor};
use polars::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Pairwise correlation of a fixed column list.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(f64::NAN)
    }
}

/// Equal-width bin counts of one column, split by group.
#[derive(Debug, Clone)]
pub struct Histogram {
    pub column: String,
    pub start: f64,
    pub bin_width: f64,
    pub counts_by_group: Vec<(String, Vec<usize>)>,
}

impl Histogram {
    /// Center of bin `idx` on the value axis.
    pub fn bin_center(&self, idx: usize) -> f64 {
        self.start + (idx as f64 + 0.5) * self.bin_width
    }

    pub fn total(&self) -> usize {
        self.counts_by_group
            .iter()
            .map(|(_, counts)| counts.iter().sum::<usize>())
            .sum()
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Pearson correlation of two equally long samples.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
        if xs.len() < 2 || xs.len() != ys.len() {
            return f64::NAN;
        }
        let denom = xs.std_dev() * ys.std_dev();
        if denom == 0.0 || denom.is_nan() {
            return f64::NAN;
        }
        xs.covariance(ys) / denom
    }

    /// Correlation matrix over `columns`, using pairwise complete rows.
    ///
    /// With fewer than two rows every entry is NaN.
    pub fn correlate(df: &DataFrame, columns: &[&str]) -> Result<CorrelationMatrix, AnalysisError> {
        let data: Vec<Vec<Option<f64>>> = columns
            .iter()
            .map(|c| DataProcessor::numeric_values(df, c))
            .collect::<Result<_, _>>()?;

        let n = columns.len();
        let mut values = vec![vec![f64::NAN; n]; n];

        if df.height() >= 2 {
            for i in 0..n {
                for j in i..n {
                    let (xs, ys): (Vec<f64>, Vec<f64>) = data[i]
                        .iter()
                        .zip(&data[j])
                        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                        .unzip();

                    let r = if i == j {
                        if xs.len() >= 2 { 1.0 } else { f64::NAN }
                    } else {
                        Self::pearson(&xs, &ys)
                    };
                    values[i][j] = r;
                    values[j][i] = r;
                }
            }
        }

        Ok(CorrelationMatrix {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values,
        })
    }

    /// Bin a column into `bins` equal-width bins, counting per group.
    pub fn histogram(
        df: &DataFrame,
        column: &str,
        group: &str,
        bins: usize,
    ) -> Result<Histogram, AnalysisError> {
        let values = DataProcessor::numeric_values(df, column)?;
        let groups = DataProcessor::string_values(df, group)?;

        let pairs: Vec<(f64, String)> = values
            .into_iter()
            .zip(groups)
            .filter_map(|(v, g)| Some((v?, g?)))
            .collect();

        let bins = bins.max(1);
        let (min, max) = pairs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (v, _)| {
                (lo.min(*v), hi.max(*v))
            });

        if pairs.is_empty() {
            return Ok(Histogram {
                column: column.to_string(),
                start: 0.0,
                bin_width: 1.0,
                counts_by_group: Vec::new(),
            });
        }

        let span = max - min;
        let bin_width = if span > 0.0 { span / bins as f64 } else { 1.0 };

        let mut counts: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (v, g) in pairs {
            let idx = (((v - min) / bin_width) as usize).min(bins - 1);
            counts.entry(g).or_insert_with(|| vec![0; bins])[idx] += 1;
        }

        Ok(Histogram {
            column: column.to_string(),
            start: min,
            bin_width,
            counts_by_group: counts.into_iter().collect(),
        })
    }
}
