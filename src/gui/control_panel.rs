//! Control Panel Widget
//! Left side panel with stage navigation, filters and export actions.

use egui::{Color32, RichText, ScrollArea};

/// The four dashboard stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Loading,
    Cleaning,
    Visualization,
    Outliers,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Loading,
        Stage::Cleaning,
        Stage::Visualization,
        Stage::Outliers,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Loading => "Step 1: Data Loading",
            Stage::Cleaning => "Step 2: Data Cleaning",
            Stage::Visualization => "Step 3: Visualization",
            Stage::Outliers => "Step 4: Outlier Detection",
        }
    }
}

/// Checkbox state of one multi-select filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiSelect {
    pub options: Vec<(String, bool)>,
}

impl MultiSelect {
    /// All options selected, the default for a fresh table.
    pub fn all_of(values: Vec<String>) -> Self {
        Self {
            options: values.into_iter().map(|v| (v, true)).collect(),
        }
    }

    pub fn selected(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|(_, on)| *on)
            .map(|(v, _)| v.clone())
            .collect()
    }

    pub fn set_all(&mut self, on: bool) {
        self.options.iter_mut().for_each(|(_, v)| *v = on);
    }

    /// Draw the checkboxes, returning true when the selection changed.
    fn show(&mut self, ui: &mut egui::Ui, id: &str) -> bool {
        let mut changed = false;
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt(id)
                    .max_height(120.0)
                    .show(ui, |ui| {
                        for (value, on) in self.options.iter_mut() {
                            changed |= ui.checkbox(on, value.as_str()).changed();
                        }
                    });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                self.set_all(true);
                changed = true;
            }
            if ui.small_button("Clear All").clicked() {
                self.set_all(false);
                changed = true;
            }
        });
        changed
    }
}

/// Left side control panel with navigation and filter controls.
pub struct ControlPanel {
    pub stage: Stage,
    pub categories: MultiSelect,
    pub regions: MultiSelect,
    pub source_name: String,
    pub status: String,
}

impl ControlPanel {
    pub fn new(source_name: String) -> Self {
        Self {
            stage: Stage::default(),
            categories: MultiSelect::default(),
            regions: MultiSelect::default(),
            source_name,
            status: "Ready".to_string(),
        }
    }

    /// Reset both filters to "everything selected".
    pub fn set_filter_options(&mut self, categories: Vec<String>, regions: Vec<String>) {
        self.categories = MultiSelect::all_of(categories);
        self.regions = MultiSelect::all_of(regions);
    }

    pub fn has_filter_options(&self) -> bool {
        !self.categories.options.is_empty() || !self.regions.options.is_empty()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Superstore EDA")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new(&self.source_name).size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Navigation Section =====
        ui.label(RichText::new("🧭 Select Step").size(14.0).strong());
        ui.add_space(5.0);

        for stage in Stage::ALL {
            if ui.radio_value(&mut self.stage, stage, stage.label()).changed() {
                action = ControlPanelAction::StageChanged;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        if self.stage == Stage::Visualization && self.has_filter_options() {
            ui.label(RichText::new("🔧 Filters").size(14.0).strong());
            ui.add_space(5.0);

            ui.label("Select Category");
            if self.categories.show(ui, "category_filter") {
                action = ControlPanelAction::FiltersChanged;
            }
            ui.add_space(8.0);

            ui.label("Select Region");
            if self.regions.show(ui, "region_filter") {
                action = ControlPanelAction::FiltersChanged;
            }

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);
        }

        // ===== Export Section =====
        ui.label(RichText::new("📄 Export").size(14.0).strong());
        ui.add_space(5.0);
        ui.vertical_centered(|ui| {
            let button = |text: &str| {
                egui::Button::new(RichText::new(text).size(13.0)).min_size(egui::vec2(200.0, 28.0))
            };
            if ui.add(button("Export Summary (JSON)")).clicked() {
                action = ControlPanelAction::ExportSummary;
            }
            ui.add_space(4.0);
            ui.add_enabled_ui(self.stage == Stage::Outliers, |ui| {
                if ui.add(button("Export Boxplots (PNG)")).clicked() {
                    action = ControlPanelAction::ExportBoxplots;
                }
            });
            ui.add_space(4.0);
            ui.add_enabled_ui(self.stage == Stage::Visualization, |ui| {
                if ui.add(button("Export Heatmap (PNG)")).clicked() {
                    action = ControlPanelAction::ExportHeatmap;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    StageChanged,
    FiltersChanged,
    ExportSummary,
    ExportBoxplots,
    ExportHeatmap,
}
