//! Static Chart Renderer
//! Writes the outlier boxplots and the correlation heatmap to PNG files.
//!
//! Layout:
//! 1. Boxplots: one horizontal box per column, stacked vertically,
//!    whiskers at the last values inside the IQR fences, outliers as circles.
//! 2. Heatmap: one cell per column pair, coolwarm scale, value annotated.

use super::plotter::coolwarm;
use crate::report::ExportError;
use crate::stats::{CorrelationMatrix, OutlierReport};
use plotters::prelude::*;
use std::path::Path;

const BOX_COLOR: RGBColor = RGBColor(91, 155, 213);
const OUTLIER_COLOR: RGBColor = RGBColor(237, 125, 49);

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one boxplot panel per report into a single PNG.
    pub fn render_outlier_boxplots(
        reports: &[&OutlierReport],
        path: &Path,
        width: u32,
    ) -> Result<(), ExportError> {
        if reports.is_empty() {
            return Err(ExportError::Render("no outlier reports to draw".to_string()));
        }

        let panel_h = 260u32;
        let root =
            BitMapBackend::new(path, (width, panel_h * reports.len() as u32)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let panels = root.split_evenly((reports.len(), 1));
        for (area, report) in panels.iter().zip(reports) {
            Self::draw_boxplot(area, report)?;
        }

        root.present().map_err(render_err)?;
        Ok(())
    }

    fn draw_boxplot<DB: DrawingBackend>(
        area: &DrawingArea<DB, plotters::coord::Shift>,
        report: &OutlierReport,
    ) -> Result<(), ExportError> {
        let (x_min, x_max) = Self::value_range(&report.values);

        let mut chart = ChartBuilder::on(area)
            .caption(report.column.as_str(), ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(35)
            .y_label_area_size(10)
            .build_cartesian_2d(x_min..x_max, 0f64..1f64)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .disable_y_axis()
            .x_desc(report.column.as_str())
            .draw()
            .map_err(render_err)?;

        let (low, high) = report.whiskers();
        let median = report.median();
        let (box_lo, box_hi) = (0.3, 0.7);

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(report.q1, box_lo), (report.q3, box_hi)],
                BOX_COLOR.mix(0.3).filled(),
            )))
            .map_err(render_err)?;
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(report.q1, box_lo), (report.q3, box_hi)],
                BOX_COLOR.stroke_width(2),
            )))
            .map_err(render_err)?;

        let segments = vec![
            vec![(median, box_lo), (median, box_hi)],
            vec![(low, 0.5), (report.q1, 0.5)],
            vec![(report.q3, 0.5), (high, 0.5)],
            vec![(low, 0.4), (low, 0.6)],
            vec![(high, 0.4), (high, 0.6)],
        ];
        chart
            .draw_series(
                segments
                    .into_iter()
                    .map(|points| PathElement::new(points, BLACK.stroke_width(2))),
            )
            .map_err(render_err)?;

        chart
            .draw_series(
                report
                    .outliers()
                    .map(|v| Circle::new((v, 0.5), 4, OUTLIER_COLOR.stroke_width(1))),
            )
            .map_err(render_err)?;

        Ok(())
    }

    /// Render the correlation matrix as an annotated heatmap.
    pub fn render_correlation_heatmap(
        matrix: &CorrelationMatrix,
        path: &Path,
        size: u32,
    ) -> Result<(), ExportError> {
        let n = matrix.columns.len() as i32;
        if n == 0 {
            return Err(ExportError::Render("empty correlation matrix".to_string()));
        }

        let root = BitMapBackend::new(path, (size, size)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        // first row is drawn at the top, so the y axis counts from the last column
        let labels = matrix.columns.clone();
        let y_labels: Vec<String> = matrix.columns.iter().rev().cloned().collect();
        let mut chart = ChartBuilder::on(&root)
            .caption("Correlation Heatmap", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_label_formatter(&|v| segment_label(&labels, v))
            .y_label_formatter(&|v| segment_label(&y_labels, v))
            .draw()
            .map_err(render_err)?;

        let cells: Vec<(i32, i32, f64)> = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .map(|(i, j)| (i, j, matrix.get(i as usize, j as usize)))
            .collect();

        chart
            .draw_series(cells.iter().map(|&(i, j, r)| {
                let (red, green, blue) = coolwarm(r);
                Rectangle::new(
                    [
                        (SegmentValue::Exact(i), SegmentValue::Exact(n - j)),
                        (SegmentValue::Exact(i + 1), SegmentValue::Exact(n - 1 - j)),
                    ],
                    RGBColor(red, green, blue).filled(),
                )
            }))
            .map_err(render_err)?;

        chart
            .draw_series(cells.iter().map(|&(i, j, r)| {
                let text = if r.is_nan() { "nan".to_string() } else { format!("{:.2}", r) };
                Text::new(
                    text,
                    (SegmentValue::CenterOf(i), SegmentValue::CenterOf(n - 1 - j)),
                    ("sans-serif", 18).into_font().color(&BLACK),
                )
            }))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }

    fn value_range(values: &[f64]) -> (f64, f64) {
        let (Some(&min), Some(&max)) = (values.first(), values.last()) else {
            return (0.0, 1.0);
        };
        let pad = ((max - min) * 0.05).max(1e-6);
        (min - pad, max + pad)
    }
}

fn segment_label(labels: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(idx) => labels
            .get(*idx as usize)
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn render_err<E: std::fmt::Display>(err: E) -> ExportError {
    ExportError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::SALES;
    use crate::stats::OutlierAnalyzer;
    use polars::prelude::*;
    use tempfile::TempDir;

    fn sales_report() -> OutlierReport {
        let df = DataFrame::new(vec![Column::new(
            SALES.into(),
            vec![10.0, 12.0, 12.0, 13.0, 14.0, 15.0, 100.0],
        )])
        .unwrap();
        OutlierAnalyzer::analyze(&df, SALES).unwrap()
    }

    /// A written chart is a PNG; hosts without system fonts may only fail with a render error.
    fn assert_png_or_render_error(result: Result<(), ExportError>, path: &Path) {
        match result {
            Ok(()) => {
                let bytes = std::fs::read(path).unwrap();
                assert!(bytes.starts_with(b"\x89PNG"));
            }
            Err(err) => assert!(matches!(err, ExportError::Render(_)), "{}", err),
        }
    }

    #[test]
    fn no_reports_is_a_render_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boxplots.png");

        let err = StaticChartRenderer::render_outlier_boxplots(&[], &path, 800).unwrap_err();
        assert!(matches!(err, ExportError::Render(_)));
        assert!(!path.exists());
    }

    #[test]
    fn empty_matrix_is_a_render_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heatmap.png");
        let matrix = CorrelationMatrix {
            columns: Vec::new(),
            values: Vec::new(),
        };

        let err = StaticChartRenderer::render_correlation_heatmap(&matrix, &path, 400).unwrap_err();
        assert!(matches!(err, ExportError::Render(_)));
        assert!(!path.exists());
    }

    #[test]
    fn boxplots_render_to_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boxplots.png");
        let report = sales_report();

        let result = StaticChartRenderer::render_outlier_boxplots(&[&report], &path, 600);
        assert_png_or_render_error(result, &path);
    }

    #[test]
    fn all_nan_heatmap_renders() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heatmap.png");
        let matrix = CorrelationMatrix {
            columns: vec!["Sales".to_string(), "Profit".to_string()],
            values: vec![vec![f64::NAN; 2]; 2],
        };

        let result = StaticChartRenderer::render_correlation_heatmap(&matrix, &path, 400);
        assert_png_or_render_error(result, &path);
    }

    #[test]
    fn segment_labels_only_at_centres() {
        let labels = vec!["Sales".to_string(), "Profit".to_string()];
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(1)), "Profit");
        assert_eq!(segment_label(&labels, &SegmentValue::Exact(1)), "");
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(5)), "");
    }
}
