//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use crate::data::{CountTable, ScatterSeries};
use crate::stats::{CorrelationMatrix, Histogram, OutlierReport};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};

pub const BAR_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const OUTLIER_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const CHART_HEIGHT: f32 = 300.0;

/// Coolwarm diverging scale for r in [-1, 1]; NaN maps to grey.
pub fn coolwarm(r: f64) -> (u8, u8, u8) {
    const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    if r.is_nan() {
        return (160, 160, 160);
    }
    let t = r.clamp(-1.0, 1.0);
    let (from, to, f) = if t < 0.0 { (MID, COOL, -t) } else { (MID, WARM, t) };
    let lerp = |a: f64, b: f64| (a + (b - a) * f).round() as u8;
    (lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the n-th group of a chart.
    pub fn get_group_color(group_index: usize) -> Color32 {
        PALETTE[group_index % PALETTE.len()]
    }

    /// Bar chart of value counts. X-axis: values, Y-axis: count.
    pub fn draw_count_chart(ui: &mut egui::Ui, counts: &CountTable) {
        let labels: Vec<String> = counts.counts.iter().map(|(v, _)| v.clone()).collect();

        let bars: Vec<Bar> = counts
            .counts
            .iter()
            .enumerate()
            .map(|(i, (value, count))| {
                Bar::new(i as f64, *count as f64)
                    .width(0.6)
                    .name(value)
                    .fill(BAR_COLOR)
            })
            .collect();

        Plot::new(format!("count_{}", counts.column))
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(counts.column.as_str())
            .y_axis_label("Count")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR));
            });
    }

    /// Scatter plot with one colored series per group.
    pub fn draw_scatter_chart(
        ui: &mut egui::Ui,
        x_label: &str,
        y_label: &str,
        series: &[ScatterSeries],
    ) {
        Plot::new(format!("scatter_{}_{}", x_label, y_label))
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (i, s) in series.iter().enumerate() {
                    let points: PlotPoints = s.points.iter().copied().collect();
                    plot_ui.points(
                        Points::new(points)
                            .radius(2.5)
                            .color(Self::get_group_color(i).gamma_multiply(0.7))
                            .name(&s.group),
                    );
                }
            });
    }

    /// Stacked histogram, one bar chart per group.
    pub fn draw_histogram(ui: &mut egui::Ui, hist: &Histogram) {
        let mut charts: Vec<BarChart> = Vec::new();

        for (i, (group, counts)) in hist.counts_by_group.iter().enumerate() {
            let color = Self::get_group_color(i);
            let bars: Vec<Bar> = counts
                .iter()
                .enumerate()
                .map(|(bin, count)| {
                    Bar::new(hist.bin_center(bin), *count as f64)
                        .width(hist.bin_width)
                        .fill(color)
                })
                .collect();

            let refs: Vec<&BarChart> = charts.iter().collect();
            let chart = BarChart::new(bars).color(color).name(group).stack_on(&refs);
            charts.push(chart);
        }

        Plot::new(format!("hist_{}", hist.column))
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(hist.column.as_str())
            .y_axis_label("Count")
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }

    /// Correlation heatmap as a grid of colored, annotated cells.
    pub fn draw_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        let cell = egui::vec2(90.0, 40.0);

        egui::Grid::new("correlation_heatmap")
            .spacing([2.0, 2.0])
            .show(ui, |ui| {
                ui.label("");
                for name in &matrix.columns {
                    ui.add_sized(cell, egui::Label::new(RichText::new(name).strong()));
                }
                ui.end_row();

                for (i, row_name) in matrix.columns.iter().enumerate() {
                    ui.add_sized(cell, egui::Label::new(RichText::new(row_name).strong()));
                    for j in 0..matrix.columns.len() {
                        let r = matrix.get(i, j);
                        let (red, green, blue) = coolwarm(r);
                        let (rect, _) = ui.allocate_exact_size(cell, egui::Sense::hover());
                        ui.painter()
                            .rect_filled(rect, 2.0, Color32::from_rgb(red, green, blue));
                        let text = if r.is_nan() { "nan".to_string() } else { format!("{:.2}", r) };
                        ui.painter().text(
                            rect.center(),
                            egui::Align2::CENTER_CENTER,
                            text,
                            egui::FontId::proportional(13.0),
                            Color32::BLACK,
                        );
                    }
                    ui.end_row();
                }
            });
    }

    /// Horizontal boxplot with outliers drawn as points.
    pub fn draw_outlier_boxplot(ui: &mut egui::Ui, report: &OutlierReport) {
        let (low, high) = report.whiskers();
        let outliers: PlotPoints = report.outliers().map(|v| [v, 0.0]).collect();

        Plot::new(format!("boxplot_{}", report.column))
            .height(160.0)
            .allow_scroll(false)
            .show_y(false)
            .x_axis_label(report.column.as_str())
            .y_axis_formatter(|_mark, _range| String::new())
            .show(ui, |plot_ui| {
                let elem = BoxElem::new(
                    0.0,
                    BoxSpread::new(low, report.q1, report.median(), report.q3, high),
                )
                .box_width(0.5)
                .whisker_width(0.3)
                .fill(BAR_COLOR.gamma_multiply(0.3))
                .stroke(egui::Stroke::new(1.5, BAR_COLOR));

                plot_ui.box_plot(BoxPlot::new(vec![elem]).horizontal().name(&report.column));
                plot_ui.points(
                    Points::new(outliers)
                        .radius(3.0)
                        .color(OUTLIER_COLOR)
                        .name("Outliers"),
                );
            });
    }

    /// Draw the IQR statistics of one column.
    pub fn draw_outlier_stats(ui: &mut egui::Ui, report: &OutlierReport) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(format!("outlier_stats_{}", report.column)))
                    .striped(true)
                    .min_col_width(120.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        let rows = [
                            ("Q1", format!("{:.2}", report.q1)),
                            ("Q3", format!("{:.2}", report.q3)),
                            ("IQR", format!("{:.2}", report.iqr)),
                            ("Lower Bound", format!("{:.2}", report.lower_bound)),
                            ("Upper Bound", format!("{:.2}", report.upper_bound)),
                            ("Number of Outliers", report.outlier_count.to_string()),
                            (
                                "Percentage of Outliers",
                                format!("{:.2}%", report.outlier_percentage),
                            ),
                        ];
                        for (label, value) in rows {
                            ui.label(RichText::new(label).strong().size(12.0));
                            ui.label(RichText::new(value).size(12.0));
                            ui.end_row();
                        }
                    });
            });
    }
}
