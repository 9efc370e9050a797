//! Chart Viewer Widget
//! Central panel that draws the content of the selected stage.

use crate::charts::ChartPlotter;
use crate::data::schema::{
    CATEGORY, CORRELATION_COLUMNS, COUNT_COLUMNS, DISCOUNT, HISTOGRAM_COLUMNS, PROFIT, SALES,
};
use crate::data::{
    AnalysisError, CleaningReport, ColumnInfo, CountTable, DataLoader, DataProcessor,
    LoadedData, ScatterSeries,
};
use crate::stats::{CorrelationMatrix, Histogram, OutlierReport, StatsCalculator};
use egui::{Color32, RichText, ScrollArea};
use polars::prelude::*;

const WARNING_COLOR: Color32 = Color32::from_rgb(243, 156, 18);
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
const INFO_COLOR: Color32 = Color32::from_rgb(52, 152, 219);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(40, 167, 69);

/// Tabs of the visualization stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualTab {
    #[default]
    BarCharts,
    ScatterPlots,
    Histograms,
    Heatmap,
}

impl VisualTab {
    const ALL: [VisualTab; 4] = [
        VisualTab::BarCharts,
        VisualTab::ScatterPlots,
        VisualTab::Histograms,
        VisualTab::Heatmap,
    ];

    fn label(self) -> &'static str {
        match self {
            VisualTab::BarCharts => "Bar Charts",
            VisualTab::ScatterPlots => "Scatter Plots",
            VisualTab::Histograms => "Histograms",
            VisualTab::Heatmap => "Heatmap",
        }
    }
}

/// Snapshot of the loading stage.
pub struct LoadingView {
    pub head: Vec<Vec<String>>,
    pub columns: Vec<String>,
    pub shape: (usize, usize),
    pub info: Vec<ColumnInfo>,
}

impl LoadingView {
    pub fn compute(df: &DataFrame, preview_rows: usize) -> Self {
        Self {
            head: DataLoader::head_rows(df, preview_rows),
            columns: DataLoader::get_columns(df),
            shape: df.shape(),
            info: DataLoader::describe(df),
        }
    }
}

/// Snapshot of the cleaning stage.
pub struct CleaningView {
    pub report: CleaningReport,
    pub head: Vec<Vec<String>>,
    pub columns: Vec<String>,
}

/// Everything the visualization tabs draw, derived from the filtered table.
pub struct VisualData {
    pub filtered_rows: usize,
    pub counts: Vec<CountTable>,
    pub scatters: Vec<(&'static str, &'static str, Vec<ScatterSeries>)>,
    pub histograms: Vec<Histogram>,
    pub correlation: CorrelationMatrix,
}

impl VisualData {
    pub fn compute(
        df: &DataFrame,
        categories: &[String],
        regions: &[String],
        bins: usize,
    ) -> Result<Self, AnalysisError> {
        let filtered = DataProcessor::filter(df, categories, regions)?;

        let counts = COUNT_COLUMNS
            .iter()
            .map(|c| DataProcessor::count_by(&filtered, c))
            .collect::<Result<Vec<_>, _>>()?;

        let scatters = [(SALES, PROFIT), (DISCOUNT, PROFIT)]
            .into_iter()
            .map(|(x, y)| -> Result<_, AnalysisError> {
                Ok((x, y, DataProcessor::scatter_series(&filtered, x, y, CATEGORY)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let histograms = HISTOGRAM_COLUMNS
            .iter()
            .map(|c| StatsCalculator::histogram(&filtered, c, CATEGORY, bins))
            .collect::<Result<Vec<_>, _>>()?;

        let correlation = StatsCalculator::correlate(&filtered, &CORRELATION_COLUMNS)?;

        Ok(Self {
            filtered_rows: filtered.height(),
            counts,
            scatters,
            histograms,
            correlation,
        })
    }
}

/// Central panel renderer for the four stages.
#[derive(Default)]
pub struct ChartViewer {
    pub tab: VisualTab,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    fn notice(ui: &mut egui::Ui, color: Color32, text: &str) {
        ui.label(RichText::new(text).size(14.0).color(color));
    }

    pub fn warning(ui: &mut egui::Ui, text: &str) {
        Self::notice(ui, WARNING_COLOR, &format!("⚠ {}", text));
    }

    /// Load failure and schema notices, shown above every stage.
    pub fn show_load_notices(ui: &mut egui::Ui, loaded: &LoadedData) {
        if let Some(err) = &loaded.notice {
            Self::notice(ui, ERROR_COLOR, &format!("❌ {}", err));
        }
        if !loaded.schema.is_complete() {
            Self::warning(
                ui,
                &format!("Missing columns: {}", loaded.schema.missing_names().join(", ")),
            );
        }
    }

    fn subheader(ui: &mut egui::Ui, text: &str) {
        ui.add_space(8.0);
        ui.label(RichText::new(text).size(18.0).strong());
        ui.add_space(4.0);
    }

    fn draw_rows(ui: &mut egui::Ui, id: &str, columns: &[String], rows: &[Vec<String>]) {
        ScrollArea::horizontal().id_salt(id).show(ui, |ui| {
            egui::Grid::new(id).striped(true).show(ui, |ui| {
                for name in columns {
                    ui.label(RichText::new(name).strong());
                }
                ui.end_row();
                for row in rows {
                    for value in row {
                        ui.label(value);
                    }
                    ui.end_row();
                }
            });
        });
    }

    fn draw_missing_counts(ui: &mut egui::Ui, id: &str, counts: &[(String, usize)]) {
        egui::Grid::new(id).striped(true).show(ui, |ui| {
            for (name, count) in counts {
                ui.label(name);
                ui.label(count.to_string());
                ui.end_row();
            }
        });
    }

    pub fn show_loading(ui: &mut egui::Ui, view: &LoadingView) {
        Self::subheader(ui, &format!("First {} Rows", view.head.len()));
        Self::draw_rows(ui, "head_loaded", &view.columns, &view.head);

        ui.add_space(8.0);
        ui.label(format!("Shape: ({}, {})", view.shape.0, view.shape.1));
        ui.label(format!("Column Names: {}", view.columns.join(", ")));

        Self::subheader(ui, "Data Info");
        egui::Grid::new("data_info").striped(true).show(ui, |ui| {
            ui.label(RichText::new("Column").strong());
            ui.label(RichText::new("Non-Null Count").strong());
            ui.label(RichText::new("Dtype").strong());
            ui.label(RichText::new("Role").strong());
            ui.end_row();
            for info in &view.info {
                ui.label(&info.name);
                ui.label(format!("{} non-null", info.non_null));
                ui.label(&info.dtype);
                ui.label(info.role.map(|r| format!("{:?}", r)).unwrap_or_default());
                ui.end_row();
            }
        });
    }

    pub fn show_cleaning(ui: &mut egui::Ui, view: &CleaningView) {
        let report = &view.report;

        Self::subheader(ui, "Missing Values Before Cleaning");
        Self::draw_missing_counts(ui, "missing_before", &report.missing_before);

        ui.add_space(8.0);
        if report.duplicates_removed > 0 {
            Self::notice(
                ui,
                INFO_COLOR,
                &format!("Removed {} duplicate rows.", report.duplicates_removed),
            );
        }
        if report.missing_postal_dropped > 0 {
            Self::notice(
                ui,
                INFO_COLOR,
                &format!(
                    "Dropped {} rows with missing Postal Code.",
                    report.missing_postal_dropped
                ),
            );
        }

        Self::subheader(ui, "Missing Values After Cleaning");
        Self::draw_missing_counts(ui, "missing_after", &report.missing_after);

        ui.add_space(8.0);
        Self::notice(ui, SUCCESS_COLOR, "✅ Data cleaning completed.");
        Self::draw_rows(ui, "head_cleaned", &view.columns, &view.head);
    }

    pub fn show_visualization(&mut self, ui: &mut egui::Ui, data: &VisualData) {
        if data.filtered_rows == 0 {
            Self::warning(ui, "No data after applying filters.");
            return;
        }

        ui.horizontal(|ui| {
            for tab in VisualTab::ALL {
                ui.selectable_value(&mut self.tab, tab, tab.label());
            }
        });
        ui.separator();

        match self.tab {
            VisualTab::BarCharts => {
                for counts in &data.counts {
                    Self::subheader(ui, &format!("{} Count", counts.column));
                    ChartPlotter::draw_count_chart(ui, counts);
                }
            }
            VisualTab::ScatterPlots => {
                for (x, y, series) in &data.scatters {
                    Self::subheader(ui, &format!("{} vs {}", x, y));
                    ChartPlotter::draw_scatter_chart(ui, x, y, series);
                }
            }
            VisualTab::Histograms => {
                for hist in &data.histograms {
                    Self::subheader(
                        ui,
                        &format!("Distribution of {} ({} values)", hist.column, hist.total()),
                    );
                    ChartPlotter::draw_histogram(ui, hist);
                }
            }
            VisualTab::Heatmap => {
                Self::subheader(ui, "Correlation Heatmap");
                ChartPlotter::draw_heatmap(ui, &data.correlation);
            }
        }
    }

    pub fn show_outliers(
        ui: &mut egui::Ui,
        reports: &[(String, Result<OutlierReport, AnalysisError>)],
    ) {
        Self::subheader(ui, "Outlier Detection with Boxplots & Stats");

        for (column, report) in reports {
            match report {
                Ok(report) => {
                    ui.label(RichText::new(column).size(16.0).strong());
                    ChartPlotter::draw_outlier_stats(ui, report);
                    ChartPlotter::draw_outlier_boxplot(ui, report);
                    ui.add_space(12.0);
                }
                Err(err) => Self::warning(ui, &err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{QUANTITY, REGION, SEGMENT, SUB_CATEGORY};

    fn orders() -> DataFrame {
        DataFrame::new(vec![
            Column::new(CATEGORY.into(), vec!["Furniture", "Technology", "Furniture"]),
            Column::new(SUB_CATEGORY.into(), vec!["Chairs", "Phones", "Tables"]),
            Column::new(SEGMENT.into(), vec!["Consumer", "Corporate", "Consumer"]),
            Column::new(REGION.into(), vec!["West", "East", "East"]),
            Column::new(SALES.into(), vec![100.0, 250.0, 40.0]),
            Column::new(PROFIT.into(), vec![10.0, 80.0, -5.0]),
            Column::new(DISCOUNT.into(), vec![0.0, 0.2, 0.5]),
            Column::new(QUANTITY.into(), vec![2.0, 3.0, 1.0]),
        ])
        .unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn visual_data_covers_every_chart() {
        let data = VisualData::compute(
            &orders(),
            &strings(&["Furniture", "Technology"]),
            &strings(&["East", "West"]),
            50,
        )
        .unwrap();

        assert_eq!(data.filtered_rows, 3);
        assert_eq!(data.counts.len(), 4);
        assert_eq!(data.scatters.len(), 2);
        assert_eq!(data.histograms.len(), 4);
        assert_eq!(data.correlation.columns.len(), 4);
    }

    #[test]
    fn empty_selection_is_not_an_error() {
        let data = VisualData::compute(&orders(), &strings(&["Furniture"]), &[], 50).unwrap();
        assert_eq!(data.filtered_rows, 0);
        assert!(data.correlation.values.iter().flatten().all(|v| v.is_nan()));
    }

    #[test]
    fn loading_view_summarises_table() {
        let view = LoadingView::compute(&orders(), 2);
        assert_eq!(view.shape, (3, 8));
        assert_eq!(view.head.len(), 2);
        assert_eq!(view.info.len(), 8);
    }
}
