//! Superstore Dashboard Main Application
//! Main window with control panel and stage viewer.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::schema::{CATEGORY, REGION};
use crate::data::{
    AnalysisError, DataCleaner, DataLoader, DataProcessor, LoadedData, SessionCache,
};
use crate::gui::chart_viewer::{CleaningView, LoadingView, VisualData};
use crate::gui::control_panel::Stage;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::report::{ExportError, SessionSummary, SummaryExporter};
use crate::stats::{OutlierAnalyzer, OutlierReport};
use egui::SidePanel;
use std::path::{Path, PathBuf};
use tracing::{error, info};

type OutlierResults = Vec<(String, Result<OutlierReport, AnalysisError>)>;

const NO_DATA_LOADED: &str = "No data loaded.";
const NO_DATA_AFTER_CLEANING: &str = "No rows left after cleaning.";

/// Derived state of the current stage, rebuilt when the stage or filters change.
enum StageState {
    Pending,
    NoData(&'static str),
    Loading(LoadingView),
    Cleaning(CleaningView),
    Visualization(Result<VisualData, AnalysisError>),
    Outliers(OutlierResults),
    Failed(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    cache: SessionCache,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    state: StageState,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let cache = SessionCache::new(DataLoader::new(
            config.source_path.clone(),
            config.sheet_name.clone(),
        ));
        let source_name = config.source_path.display().to_string();

        Self {
            config,
            cache,
            control_panel: ControlPanel::new(source_name),
            chart_viewer: ChartViewer::new(),
            state: StageState::Pending,
        }
    }

    /// Rebuild the derived state for the selected stage.
    fn refresh_stage(&mut self) {
        if !self.cache.is_loaded() {
            info!(path = %self.config.source_path.display(), "reading dataset");
        }
        self.state = stage_state(&self.config, &mut self.control_panel, self.cache.table());
    }

    /// Ask the user for an output file.
    fn pick_save_path(name: &str, filter: &str, ext: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter(filter, &[ext])
            .set_file_name(name)
            .save_file()
    }

    fn handle_export_summary(&mut self) {
        let Some(path) = Self::pick_save_path("superstore_summary.json", "JSON", "json") else {
            return;
        };

        let loaded = self.cache.table();
        let result = (|| -> Result<(), ExportError> {
            let cleaned = if loaded.is_empty() {
                None
            } else {
                Some(DataCleaner::clean(&loaded.table)?)
            };
            let outliers = cleaned
                .as_ref()
                .map(|(df, _)| OutlierAnalyzer::analyze_all(df))
                .unwrap_or_default();

            let summary = SessionSummary {
                source: self.config.source_path.display().to_string(),
                cleaning: cleaned.as_ref().map(|(_, report)| report),
                outliers: outliers.iter().filter_map(|(_, r)| r.as_ref().ok()).collect(),
                skipped_columns: outliers
                    .iter()
                    .filter(|(_, r)| r.is_err())
                    .map(|(c, _)| c.clone())
                    .collect(),
            };
            SummaryExporter::write_json(&summary, &path)
        })();

        self.report_export(result, &path, false);
    }

    fn handle_export_boxplots(&mut self) {
        let StageState::Outliers(results) = &self.state else {
            return;
        };
        let reports: Vec<&OutlierReport> =
            results.iter().filter_map(|(_, r)| r.as_ref().ok()).collect();
        let Some(path) = Self::pick_save_path("outlier_boxplots.png", "PNG Image", "png") else {
            return;
        };

        let result = StaticChartRenderer::render_outlier_boxplots(&reports, &path, 1200);
        self.report_export(result, &path, true);
    }

    fn handle_export_heatmap(&mut self) {
        let StageState::Visualization(Ok(data)) = &self.state else {
            return;
        };
        let Some(path) = Self::pick_save_path("correlation_heatmap.png", "PNG Image", "png") else {
            return;
        };

        let result = StaticChartRenderer::render_correlation_heatmap(&data.correlation, &path, 800);
        self.report_export(result, &path, true);
    }

    fn report_export(&mut self, result: Result<(), ExportError>, path: &Path, open_file: bool) {
        match result {
            Ok(()) => {
                info!(path = %path.display(), "export written");
                self.control_panel
                    .set_status(&format!("Exported {}", path.display()));
                if open_file {
                    if let Err(err) = open::that(path) {
                        error!("could not open {}: {}", path.display(), err);
                    }
                }
            }
            Err(err) => {
                error!("{}", err);
                self.control_panel.set_status(&format!("Error: {}", err));
            }
        }
    }
}

/// Derived state for the panel's stage. An empty table never reaches the analysis.
fn stage_state(
    config: &DashboardConfig,
    panel: &mut ControlPanel,
    loaded: &LoadedData,
) -> StageState {
    if loaded.is_empty() {
        return StageState::NoData(NO_DATA_LOADED);
    }

    match compute_stage(config, panel, loaded) {
        Ok(state) => state,
        Err(err) => {
            error!("{}", err);
            StageState::Failed(err.to_string())
        }
    }
}

fn compute_stage(
    config: &DashboardConfig,
    panel: &mut ControlPanel,
    loaded: &LoadedData,
) -> Result<StageState, AnalysisError> {
    let state = match panel.stage {
        Stage::Loading => {
            StageState::Loading(LoadingView::compute(&loaded.table, config.preview_rows))
        }
        Stage::Cleaning => {
            let (cleaned, report) = DataCleaner::clean(&loaded.table)?;
            StageState::Cleaning(CleaningView {
                report,
                head: DataLoader::head_rows(&cleaned, config.preview_rows),
                columns: DataLoader::get_columns(&cleaned),
            })
        }
        Stage::Visualization => {
            let (cleaned, _) = DataCleaner::clean(&loaded.table)?;
            if cleaned.height() == 0 {
                return Ok(StageState::NoData(NO_DATA_AFTER_CLEANING));
            }
            if !panel.has_filter_options() {
                panel.set_filter_options(
                    DataProcessor::unique_values(&cleaned, CATEGORY)?,
                    DataProcessor::unique_values(&cleaned, REGION)?,
                );
            }
            StageState::Visualization(VisualData::compute(
                &cleaned,
                &panel.categories.selected(),
                &panel.regions.selected(),
                config.histogram_bins,
            ))
        }
        Stage::Outliers => {
            let (cleaned, _) = DataCleaner::clean(&loaded.table)?;
            if cleaned.height() == 0 {
                return Ok(StageState::NoData(NO_DATA_AFTER_CLEANING));
            }
            StageState::Outliers(OutlierAnalyzer::analyze_all(&cleaned))
        }
    };
    Ok(state)
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if matches!(self.state, StageState::Pending) {
            self.refresh_stage();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::StageChanged | ControlPanelAction::FiltersChanged => {
                            self.refresh_stage()
                        }
                        ControlPanelAction::ExportSummary => self.handle_export_summary(),
                        ControlPanelAction::ExportBoxplots => self.handle_export_boxplots(),
                        ControlPanelAction::ExportHeatmap => self.handle_export_heatmap(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Stage Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("📊 Superstore Sales EDA Dashboard");
            ui.add_space(6.0);
            ChartViewer::show_load_notices(ui, self.cache.table());

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match &self.state {
                    StageState::Pending => {}
                    StageState::NoData(message) => ChartViewer::warning(ui, message),
                    StageState::Loading(view) => ChartViewer::show_loading(ui, view),
                    StageState::Cleaning(view) => ChartViewer::show_cleaning(ui, view),
                    StageState::Visualization(Ok(data)) => {
                        self.chart_viewer.show_visualization(ui, data)
                    }
                    StageState::Visualization(Err(err)) => {
                        ChartViewer::warning(ui, &err.to_string())
                    }
                    StageState::Outliers(results) => ChartViewer::show_outliers(ui, results),
                    StageState::Failed(message) => ChartViewer::warning(ui, message),
                });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{CORRELATION_COLUMNS, PROFIT, SALES};
    use crate::stats::StatsCalculator;
    use polars::prelude::*;
    use tempfile::TempDir;

    fn panel(stage: Stage) -> ControlPanel {
        let mut panel = ControlPanel::new("orders.csv".to_string());
        panel.stage = stage;
        panel
    }

    fn cache_for(dir: &TempDir, body: &str) -> SessionCache {
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, body).unwrap();
        SessionCache::new(DataLoader::new(path, "Orders"))
    }

    #[test]
    fn visualization_defaults_to_all_filter_values() {
        let dir = TempDir::new().unwrap();
        let cache = cache_for(
            &dir,
            "Category,Region,Postal Code,Sales,Profit,Discount,Quantity,Sub-Category,Segment\n\
             Furniture,West,90036,10,1,0,2,Chairs,Consumer\n\
             Technology,East,10001,20,4,0.2,1,Phones,Corporate\n",
        );
        let mut panel = panel(Stage::Visualization);

        let state = compute_stage(&DashboardConfig::default(), &mut panel, cache.table()).unwrap();
        assert_eq!(panel.categories.selected(), vec!["Furniture", "Technology"]);
        assert_eq!(panel.regions.selected(), vec!["East", "West"]);
        assert!(matches!(state, StageState::Visualization(Ok(ref d)) if d.filtered_rows == 2));
    }

    #[test]
    fn outlier_stage_warns_per_missing_column() {
        let dir = TempDir::new().unwrap();
        let cache = cache_for(&dir, "Category,Region,Postal Code,Sales\nFurniture,West,90036,10\n");
        let mut panel = panel(Stage::Outliers);

        let state = compute_stage(&DashboardConfig::default(), &mut panel, cache.table()).unwrap();
        let StageState::Outliers(results) = state else {
            panic!("expected outlier results");
        };
        assert!(results.iter().any(|(c, r)| c == SALES && r.is_ok()));
        assert!(results.iter().any(|(c, r)| c == PROFIT && r.is_err()));
    }

    #[test]
    fn every_stage_reports_no_data_for_missing_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Attachment.xlsx");
        let cache = SessionCache::new(DataLoader::new(path, "Orders"));

        for stage in Stage::ALL {
            let mut panel = panel(stage);
            let state = stage_state(&DashboardConfig::default(), &mut panel, cache.table());
            assert!(
                matches!(state, StageState::NoData(NO_DATA_LOADED)),
                "{:?} did not report missing data",
                stage
            );
        }
    }

    #[test]
    fn analysis_stages_stop_when_cleaning_empties_the_table() {
        let dir = TempDir::new().unwrap();
        let cache = cache_for(
            &dir,
            "Category,Region,Postal Code,Sales,Profit,Discount
             Furniture,West,,10,1,0
             Technology,East,,20,2,0.1
",
        );
        let config = DashboardConfig::default();

        for stage in [Stage::Visualization, Stage::Outliers] {
            let mut panel = panel(stage);
            let state = stage_state(&config, &mut panel, cache.table());
            assert!(matches!(state, StageState::NoData(NO_DATA_AFTER_CLEANING)));
        }

        let mut panel = panel(Stage::Cleaning);
        let StageState::Cleaning(view) = stage_state(&config, &mut panel, cache.table()) else {
            panic!("expected cleaning view");
        };
        assert_eq!(view.report.rows_before, 2);
        assert_eq!(view.report.rows_after, 0);
        assert_eq!(view.report.missing_postal_dropped, 2);
    }

    #[test]
    fn correlation_columns_are_fixed() {
        let df = DataFrame::new(
            CORRELATION_COLUMNS
                .iter()
                .map(|c| Column::new((*c).into(), vec![1.0, 2.0, 3.0]))
                .collect(),
        )
        .unwrap();
        let matrix = StatsCalculator::correlate(&df, &CORRELATION_COLUMNS).unwrap();
        assert_eq!(matrix.columns, vec!["Sales", "Profit", "Discount", "Quantity"]);
    }
}
