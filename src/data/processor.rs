//! Data Processor Module
//! Category/Region filtering and per-column aggregation for the charts.

use super::schema::{CATEGORY, REGION};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Column '{0}' not found in data.")]
    MissingColumn(String),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Occurrence count of each distinct value of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct CountTable {
    pub column: String,
    pub counts: Vec<(String, usize)>,
}

/// Points of one scatter series.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub group: String,
    pub points: Vec<[f64; 2]>,
}

/// Handles filtering and aggregation of the cleaned table.
pub struct DataProcessor;

impl DataProcessor {
    /// Column values as optional strings; numeric columns are rendered as text.
    pub fn string_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, AnalysisError> {
        let col = df
            .column(column)
            .map_err(|_| AnalysisError::MissingColumn(column.to_string()))?;
        let as_str = col.cast(&DataType::String)?;
        let values = as_str
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect();
        Ok(values)
    }

    /// Column values as optional floats; NaN is treated as missing.
    pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, AnalysisError> {
        let col = df
            .column(column)
            .map_err(|_| AnalysisError::MissingColumn(column.to_string()))?;
        let as_f64 = col.cast(&DataType::Float64)?;
        let values = as_f64
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Ok(values)
    }

    /// Sorted distinct non-missing values of a column.
    pub fn unique_values(df: &DataFrame, column: &str) -> Result<Vec<String>, AnalysisError> {
        let unique: BTreeSet<String> = Self::string_values(df, column)?
            .into_iter()
            .flatten()
            .collect();
        Ok(unique.into_iter().collect())
    }

    /// Keep rows whose Category is in `categories` and Region is in `regions`.
    pub fn filter(
        df: &DataFrame,
        categories: &[String],
        regions: &[String],
    ) -> Result<DataFrame, AnalysisError> {
        let category_values = Self::string_values(df, CATEGORY)?;
        let region_values = Self::string_values(df, REGION)?;

        let selected = |value: &Option<String>, allowed: &[String]| {
            value
                .as_deref()
                .is_some_and(|v| allowed.iter().any(|a| a == v))
        };

        let mask: BooleanChunked = category_values
            .iter()
            .zip(region_values.iter())
            .map(|(c, r)| selected(c, categories) && selected(r, regions))
            .collect();

        Ok(df.filter(&mask)?)
    }

    /// Count occurrences of each distinct value, most frequent first.
    pub fn count_by(df: &DataFrame, column: &str) -> Result<CountTable, AnalysisError> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for value in Self::string_values(df, column)?.into_iter().flatten() {
            *counts.entry(value).or_default() += 1;
        }

        let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(CountTable {
            column: column.to_string(),
            counts,
        })
    }

    /// (x, y) points per group, skipping rows with a missing coordinate or group.
    pub fn scatter_series(
        df: &DataFrame,
        x: &str,
        y: &str,
        group: &str,
    ) -> Result<Vec<ScatterSeries>, AnalysisError> {
        let xs = Self::numeric_values(df, x)?;
        let ys = Self::numeric_values(df, y)?;
        let groups = Self::string_values(df, group)?;

        let mut by_group: HashMap<String, Vec<[f64; 2]>> = HashMap::new();
        for ((x, y), g) in xs.into_iter().zip(ys).zip(groups) {
            if let (Some(x), Some(y), Some(g)) = (x, y, g) {
                by_group.entry(g).or_default().push([x, y]);
            }
        }

        let mut series: Vec<ScatterSeries> = by_group
            .into_iter()
            .map(|(group, points)| ScatterSeries { group, points })
            .collect();
        series.sort_by(|a, b| a.group.cmp(&b.group));
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{SALES, SEGMENT};
    use proptest::prelude::*;

    fn superstore() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                CATEGORY.into(),
                vec!["Furniture", "Technology", "Furniture", "Office Supplies", "Technology"],
            ),
            Column::new(REGION.into(), vec!["West", "East", "East", "West", "West"]),
            Column::new(
                SEGMENT.into(),
                vec![Some("Consumer"), Some("Corporate"), Some("Consumer"), None, Some("Consumer")],
            ),
            Column::new(SALES.into(), vec![Some(10.0), Some(20.0), None, Some(5.0), Some(7.5)]),
        ])
        .unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filter_keeps_matching_rows() {
        let df = superstore();
        let filtered =
            DataProcessor::filter(&df, &strings(&["Furniture", "Technology"]), &strings(&["West"]))
                .unwrap();
        assert_eq!(filtered.height(), 2);

        let cats = DataProcessor::unique_values(&filtered, CATEGORY).unwrap();
        assert_eq!(cats, strings(&["Furniture", "Technology"]));
    }

    #[test]
    fn empty_region_selection_yields_empty_table() {
        let df = superstore();
        let filtered = DataProcessor::filter(&df, &strings(&["Furniture"]), &[]).unwrap();
        assert_eq!(filtered.height(), 0);
        assert_eq!(filtered.width(), df.width());
    }

    #[test]
    fn filter_requires_category_and_region() {
        let df = DataFrame::new(vec![Column::new(SALES.into(), vec![1.0])]).unwrap();
        let err = DataProcessor::filter(&df, &[], &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn(c) if c == CATEGORY));
    }

    #[test]
    fn count_by_lists_each_value_once() {
        let counts = DataProcessor::count_by(&superstore(), SEGMENT).unwrap();
        assert_eq!(
            counts.counts,
            vec![("Consumer".to_string(), 3), ("Corporate".to_string(), 1)]
        );
    }

    #[test]
    fn scatter_skips_missing_points() {
        let series = DataProcessor::scatter_series(&superstore(), SALES, SALES, CATEGORY).unwrap();
        let furniture = series.iter().find(|s| s.group == "Furniture").unwrap();
        assert_eq!(furniture.points, vec![[10.0, 10.0]]);
        assert_eq!(series.len(), 3);
    }

    proptest! {
        #[test]
        fn filtered_rows_respect_selection(
            cat_mask in proptest::collection::vec(any::<bool>(), 3),
            reg_mask in proptest::collection::vec(any::<bool>(), 2),
        ) {
            let df = superstore();
            let all_cats = ["Furniture", "Office Supplies", "Technology"];
            let all_regions = ["East", "West"];
            let cats: Vec<String> = all_cats.iter().zip(&cat_mask)
                .filter(|(_, keep)| **keep).map(|(c, _)| c.to_string()).collect();
            let regions: Vec<String> = all_regions.iter().zip(&reg_mask)
                .filter(|(_, keep)| **keep).map(|(r, _)| r.to_string()).collect();

            let filtered = DataProcessor::filter(&df, &cats, &regions).unwrap();
            prop_assert!(filtered.height() <= df.height());

            let got_cats = DataProcessor::string_values(&filtered, CATEGORY).unwrap();
            let got_regions = DataProcessor::string_values(&filtered, REGION).unwrap();
            for (c, r) in got_cats.iter().zip(&got_regions) {
                prop_assert!(cats.contains(c.as_ref().unwrap()));
                prop_assert!(regions.contains(r.as_ref().unwrap()));
            }
        }
    }
}
