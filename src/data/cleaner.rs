//! Data Cleaner Module
//! Deduplication, missing postal code removal and numeric coercion.

use super::schema::{COERCE_COLUMNS, POSTAL_CODE};
use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

/// What a cleaning pass changed.
///
/// Counts are taken after numeric coercion: duplicates are compared on the
/// coerced values, and `missing_postal_dropped` includes postal codes that
/// could not be read as numbers. `missing_before` is the only raw count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub duplicates_removed: usize,
    pub missing_postal_dropped: usize,
    pub missing_before: Vec<(String, usize)>,
    pub missing_after: Vec<(String, usize)>,
}

pub struct DataCleaner;

impl DataCleaner {
    /// Clean a table and report what was removed.
    ///
    /// Numeric coercion happens on a working copy first so that duplicate
    /// detection and the postal code check both see the final values. A
    /// postal code that cannot be read as a number therefore counts as
    /// missing, and a second pass over the output removes nothing.
    pub fn clean(df: &DataFrame) -> PolarsResult<(DataFrame, CleaningReport)> {
        let missing_before = Self::missing_counts(df);
        let rows_before = df.height();

        if df.width() == 0 {
            let report = CleaningReport {
                missing_before,
                missing_after: Vec::new(),
                ..Default::default()
            };
            return Ok((df.clone(), report));
        }

        let coerced = Self::coerce_numeric(df, &COERCE_COLUMNS)?;

        let deduped = coerced.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let duplicates_removed = rows_before - deduped.height();
        if duplicates_removed > 0 {
            info!("Removed {} duplicate rows", duplicates_removed);
        }

        let postal_nulls = deduped.column(POSTAL_CODE).ok().map(|col| col.null_count());
        let (cleaned, missing_postal_dropped) = match postal_nulls {
            Some(dropped) if dropped > 0 => {
                let mask = deduped.column(POSTAL_CODE)?.is_not_null();
                let kept = deduped.filter(&mask)?;
                info!("Dropped {} rows with missing {}", dropped, POSTAL_CODE);
                (kept, dropped)
            }
            Some(_) => (deduped, 0),
            None => {
                warn!(column = POSTAL_CODE, "column absent, no rows dropped");
                (deduped, 0)
            }
        };

        let report = CleaningReport {
            rows_before,
            rows_after: cleaned.height(),
            duplicates_removed,
            missing_postal_dropped,
            missing_before,
            missing_after: Self::missing_counts(&cleaned),
        };

        Ok((cleaned, report))
    }

    /// Cast the named columns to Float64. Unparseable values and NaN become null;
    /// absent columns are skipped.
    pub fn coerce_numeric(df: &DataFrame, columns: &[&str]) -> PolarsResult<DataFrame> {
        let mut out = df.clone();

        for name in columns {
            let Ok(column) = df.column(name) else {
                continue;
            };

            let as_f64 = if column.dtype() == &DataType::String {
                let trimmed: Vec<Option<String>> = column
                    .as_materialized_series()
                    .str()?
                    .into_iter()
                    .map(|v| v.map(|s| s.trim().to_string()))
                    .collect();
                Column::new((*name).into(), trimmed).cast(&DataType::Float64)?
            } else {
                column.cast(&DataType::Float64)?
            };

            let values: Vec<Option<f64>> = as_f64
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();

            let coerced_nulls = values.iter().filter(|v| v.is_none()).count();
            if coerced_nulls > column.null_count() {
                warn!(
                    column = *name,
                    count = coerced_nulls - column.null_count(),
                    "non-numeric values set to missing"
                );
            }

            out.with_column(Column::new((*name).into(), values))?;
        }

        Ok(out)
    }

    /// Null count of every column, in column order.
    pub fn missing_counts(df: &DataFrame) -> Vec<(String, usize)> {
        df.get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect()
    }
}
