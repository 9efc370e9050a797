//! Spreadsheet Data Loader Module
//! Reads the Orders sheet into a Polars DataFrame.

use super::schema::{ColumnRole, Schema};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, TimeDelta};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("File not found: '{0}'. Please ensure it is in the app directory.")]
    SourceNotFound(PathBuf),
    #[error("Error reading data source: {0}")]
    MalformedSource(String),
}

impl From<calamine::XlsxError> for LoadError {
    fn from(err: calamine::XlsxError) -> Self {
        LoadError::MalformedSource(err.to_string())
    }
}

impl From<PolarsError> for LoadError {
    fn from(err: PolarsError) -> Self {
        LoadError::MalformedSource(err.to_string())
    }
}

/// Summary of one column for the loading stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
    pub role: Option<ColumnRole>,
}

/// Spreadsheet cell after type resolution.
enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::DateTime(dt) => Cell::Text(format_excel_serial(dt.as_f64())),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Text(format!("{:?}", e)),
        }
    }
}

/// Render an Excel date serial (1900 system) as `YYYY-MM-DD`, with a time
/// part only when the serial has one.
fn format_excel_serial(serial: f64) -> String {
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;

    let datetime = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.and_hms_opt(0, 0, 0))
        .zip(TimeDelta::try_days(days))
        .and_then(|(epoch, delta)| epoch.checked_add_signed(delta))
        .zip(TimeDelta::try_seconds(seconds))
        .and_then(|(date, delta)| date.checked_add_signed(delta));

    match datetime {
        Some(dt) if seconds == 0 => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}

/// Reads the dataset from a spreadsheet (or CSV) source.
pub struct DataLoader {
    path: PathBuf,
    sheet_name: String,
}

impl DataLoader {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }

    /// Load the source into a DataFrame.
    pub fn load(&self) -> Result<DataFrame, LoadError> {
        if !self.path.exists() {
            return Err(LoadError::SourceNotFound(self.path.clone()));
        }

        let start_time = Instant::now();
        let df = if Self::is_csv(&self.path) {
            Self::load_csv(&self.path)?
        } else {
            Self::load_sheet(&self.path, &self.sheet_name)?
        };

        info!(
            path = %self.path.display(),
            rows = df.height(),
            columns = df.width(),
            "Loading data took {}ms",
            start_time.elapsed().as_millis()
        );
        Ok(df)
    }

    fn is_csv(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }

    fn load_csv(path: &Path) -> Result<DataFrame, LoadError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Ok(df)
    }

    fn load_sheet(path: &Path, sheet_name: &str) -> Result<DataFrame, LoadError> {
        let mut workbook: Xlsx<_> = open_workbook(path)?;
        let range = workbook.worksheet_range(sheet_name)?;
        Self::range_to_dataframe(&range)
    }

    /// Convert a worksheet range to a DataFrame, using the first row as header.
    fn range_to_dataframe(range: &Range<Data>) -> Result<DataFrame, LoadError> {
        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| LoadError::MalformedSource("worksheet is empty".to_string()))?;

        let names: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(idx, cell)| match cell {
                Data::Empty => format!("Unnamed: {}", idx),
                other => other.to_string(),
            })
            .collect();

        let mut cells: Vec<Vec<Cell>> = names.iter().map(|_| Vec::new()).collect();
        for row in rows {
            for (idx, column) in cells.iter_mut().enumerate() {
                column.push(row.get(idx).map(Cell::from).unwrap_or(Cell::Empty));
            }
        }

        let columns: Vec<Column> = names
            .iter()
            .zip(cells)
            .map(|(name, values)| Self::build_column(name, values))
            .collect();

        for column in &columns {
            debug!(column = %column.name(), dtype = %column.dtype(), "loaded column");
        }

        Ok(DataFrame::new(columns)?)
    }

    /// A column whose non-empty cells are all numeric becomes Float64,
    /// anything else becomes String.
    fn build_column(name: &str, values: Vec<Cell>) -> Column {
        let all_numeric = values
            .iter()
            .all(|cell| matches!(cell, Cell::Number(_) | Cell::Empty));

        if all_numeric {
            let numbers: Vec<Option<f64>> = values
                .into_iter()
                .map(|cell| match cell {
                    Cell::Number(v) => Some(v),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), numbers)
        } else {
            let texts: Vec<Option<String>> = values
                .into_iter()
                .map(|cell| match cell {
                    Cell::Number(v) => Some(v.to_string()),
                    Cell::Text(s) => Some(s),
                    Cell::Empty => None,
                })
                .collect();
            Column::new(name.into(), texts)
        }
    }

    /// Get list of column names.
    pub fn get_columns(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Per-column dtype and non-null count.
    pub fn describe(df: &DataFrame) -> Vec<ColumnInfo> {
        df.get_columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                dtype: col.dtype().to_string(),
                non_null: col.len() - col.null_count(),
                role: Schema::role_of(col.name()),
            })
            .collect()
    }

    /// First `n` rows as display strings, one inner vector per row.
    pub fn head_rows(df: &DataFrame, n: usize) -> Vec<Vec<String>> {
        let head = df.head(Some(n));
        (0..head.height())
            .map(|row| {
                head.get_columns()
                    .iter()
                    .map(|col| match col.get(row) {
                        Ok(AnyValue::Null) | Err(_) => String::new(),
                        Ok(val) => val.to_string().trim_matches('"').to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_orders(dir: &TempDir, sheet: &str) -> PathBuf {
        let path = dir.path().join("Attachment.xlsx");
        let mut workbook = Workbook::new();
        let sheet_ref = workbook.add_worksheet();
        sheet_ref.set_name(sheet).unwrap();

        let header = ["Order ID", "Category", "Region", "Postal Code", "Sales"];
        for (col, name) in header.iter().enumerate() {
            sheet_ref.write_string(0, col as u16, *name).unwrap();
        }
        sheet_ref.write_string(1, 0, "CA-1").unwrap();
        sheet_ref.write_string(1, 1, "Furniture").unwrap();
        sheet_ref.write_string(1, 2, "West").unwrap();
        sheet_ref.write_number(1, 3, 90036.0).unwrap();
        sheet_ref.write_number(1, 4, 261.96).unwrap();

        sheet_ref.write_string(2, 0, "CA-2").unwrap();
        sheet_ref.write_string(2, 1, "Technology").unwrap();
        sheet_ref.write_string(2, 2, "East").unwrap();
        // Postal Code left empty
        sheet_ref.write_string(2, 4, "n/a").unwrap();

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn date_serials_are_formatted() {
        assert_eq!(format_excel_serial(43831.0), "2020-01-01");
        assert_eq!(format_excel_serial(42370.5), "2016-01-01 12:00:00");
    }

    #[test]
    fn date_cells_load_as_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Attachment.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Orders").unwrap();
        sheet.write_string(0, 0, "Order Date").unwrap();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let date = ExcelDateTime::from_ymd(2016, 11, 8).unwrap();
        sheet.write_datetime_with_format(1, 0, &date, &date_format).unwrap();
        workbook.save(&path).unwrap();

        let df = DataLoader::new(&path, "Orders").load().unwrap();
        let rows = DataLoader::head_rows(&df, 10);
        assert_eq!(df.column("Order Date").unwrap().dtype(), &DataType::String);
        assert_eq!(rows[0][0], "2016-11-08");
    }

    #[test]
    fn missing_source_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Attachment.xlsx");
        let err = DataLoader::new(&path, "Orders").load().unwrap_err();
        assert_eq!(err, LoadError::SourceNotFound(path));
    }

    #[test]
    fn corrupt_workbook_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Attachment.xlsx");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"definitely not a zip archive").unwrap();

        let err = DataLoader::new(&path, "Orders").load().unwrap_err();
        assert!(matches!(err, LoadError::MalformedSource(_)));
    }

    #[test]
    fn wrong_sheet_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_orders(&dir, "Sheet1");
        let err = DataLoader::new(&path, "Orders").load().unwrap_err();
        assert!(matches!(err, LoadError::MalformedSource(_)));
    }

    #[test]
    fn loads_orders_sheet_with_typed_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_orders(&dir, "Orders");
        let df = DataLoader::new(&path, "Orders").load().unwrap();

        assert_eq!(df.shape(), (2, 5));
        assert_eq!(df.column("Postal Code").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Postal Code").unwrap().null_count(), 1);
        // mixed numbers and text stay textual until cleaning
        assert_eq!(df.column("Sales").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("Category").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn loads_csv_sources() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, "Category,Region,Sales\nFurniture,West,10.5\nTechnology,East,3\n")
            .unwrap();

        let df = DataLoader::new(&path, "Orders").load().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(DataLoader::get_columns(&df), vec!["Category", "Region", "Sales"]);
    }

    #[test]
    fn describe_counts_non_null_values() {
        let dir = TempDir::new().unwrap();
        let path = write_orders(&dir, "Orders");
        let df = DataLoader::new(&path, "Orders").load().unwrap();

        let info = DataLoader::describe(&df);
        let postal = info.iter().find(|c| c.name == "Postal Code").unwrap();
        assert_eq!(postal.non_null, 1);
        assert_eq!(postal.role, Some(ColumnRole::Identifier));

        let rows = DataLoader::head_rows(&df, 10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], "Furniture");
        assert_eq!(rows[1][3], "");
    }
}
