//! Superstore Schema Module
//! Typed descriptor of the dataset columns and their semantic roles.

use polars::prelude::*;
use tracing::warn;

pub const ORDER_ID: &str = "Order ID";
pub const POSTAL_CODE: &str = "Postal Code";
pub const CATEGORY: &str = "Category";
pub const SUB_CATEGORY: &str = "Sub-Category";
pub const SEGMENT: &str = "Segment";
pub const REGION: &str = "Region";
pub const STATE: &str = "State";
pub const SALES: &str = "Sales";
pub const QUANTITY: &str = "Quantity";
pub const DISCOUNT: &str = "Discount";
pub const PROFIT: &str = "Profit";

/// Columns coerced to numeric during cleaning.
pub const COERCE_COLUMNS: [&str; 5] = [SALES, QUANTITY, DISCOUNT, PROFIT, POSTAL_CODE];

/// Columns shown as bar-count charts.
pub const COUNT_COLUMNS: [&str; 4] = [CATEGORY, SUB_CATEGORY, SEGMENT, REGION];

/// Columns of the correlation heatmap, in display order.
pub const CORRELATION_COLUMNS: [&str; 4] = [SALES, PROFIT, DISCOUNT, QUANTITY];

/// Columns shown as histograms.
pub const HISTOGRAM_COLUMNS: [&str; 4] = [SALES, PROFIT, QUANTITY, DISCOUNT];

/// Columns checked for outliers.
pub const OUTLIER_COLUMNS: [&str; 3] = [SALES, PROFIT, DISCOUNT];

/// Semantic role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Identifier,
    Categorical,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub role: ColumnRole,
}

/// Every column the dashboard relies on.
pub const SUPERSTORE_COLUMNS: [ColumnSpec; 11] = [
    ColumnSpec { name: ORDER_ID, role: ColumnRole::Identifier },
    ColumnSpec { name: POSTAL_CODE, role: ColumnRole::Identifier },
    ColumnSpec { name: CATEGORY, role: ColumnRole::Categorical },
    ColumnSpec { name: SUB_CATEGORY, role: ColumnRole::Categorical },
    ColumnSpec { name: SEGMENT, role: ColumnRole::Categorical },
    ColumnSpec { name: REGION, role: ColumnRole::Categorical },
    ColumnSpec { name: STATE, role: ColumnRole::Categorical },
    ColumnSpec { name: SALES, role: ColumnRole::Numeric },
    ColumnSpec { name: QUANTITY, role: ColumnRole::Numeric },
    ColumnSpec { name: DISCOUNT, role: ColumnRole::Numeric },
    ColumnSpec { name: PROFIT, role: ColumnRole::Numeric },
];

/// Result of checking a loaded table against the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCheck {
    pub missing: Vec<ColumnSpec>,
}

impl SchemaCheck {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn missing_names(&self) -> Vec<&'static str> {
        self.missing.iter().map(|col| col.name).collect()
    }
}

pub struct Schema;

impl Schema {
    /// Check a table for the columns the dashboard expects.
    ///
    /// An empty table (nothing loaded) is reported as complete so the
    /// "no data" notice is not doubled by a schema notice.
    pub fn check(df: &DataFrame) -> SchemaCheck {
        if df.width() == 0 {
            return SchemaCheck::default();
        }

        let missing: Vec<ColumnSpec> = SUPERSTORE_COLUMNS
            .iter()
            .filter(|col| df.column(col.name).is_err())
            .copied()
            .collect();

        for col in &missing {
            warn!(column = col.name, role = ?col.role, "expected column not found");
        }

        SchemaCheck { missing }
    }

    /// Role of a named column, if it is part of the schema.
    pub fn role_of(name: &str) -> Option<ColumnRole> {
        SUPERSTORE_COLUMNS
            .iter()
            .find(|col| col.name == name)
            .map(|col| col.role)
    }
}
