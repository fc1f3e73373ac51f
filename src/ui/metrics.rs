use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::{generate_palette, heat_color, text_color_on};
use crate::results::{ConfusionMatrix, GraphImage, MetricReport, TrainingResult, ViewMode};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Results (right panel)
// ---------------------------------------------------------------------------

/// Render the training result for the selected view mode.
pub fn results_panel(ui: &mut Ui, state: &mut AppState) {
    if state.submission_status().is_submitting() {
        ui.horizontal(|ui: &mut Ui| {
            ui.spinner();
            ui.label("Loading...");
        });
    }

    let Some(result) = state.presenter().result().cloned() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Drop a CSV file, pick a target and an algorithm, then Train Model");
        });
        return;
    };

    let mut mode = state.presenter().view_mode();
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut mode, ViewMode::Train, ViewMode::Train.label());
        ui.selectable_value(&mut mode, ViewMode::Test, ViewMode::Test.label());
    });
    if mode != state.presenter().view_mode() {
        state.set_view_mode(mode);
    }

    if state.result_is_stale() {
        ui.label(
            RichText::new("Dataset or selection changed since this result; train again to refresh.")
                .color(Color32::YELLOW),
        );
    }
    ui.separator();

    let Some(report) = state.presenter().current_metrics() else {
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            metric_summary(ui, report);
            ui.add_space(8.0);

            ui.strong(format!("Confusion Matrix (n = {})", report.confusion_matrix.total()));
            confusion_grid(ui, &report.confusion_matrix);
            ui.add_space(8.0);

            comparison_chart(ui, &result);
            ui.add_space(8.0);

            ui.strong("Learning Curve");
            if let Some(graph) = state.presenter().graph() {
                learning_curve(ui, graph);
            }
        });
}

fn learning_curve(ui: &mut Ui, graph: &GraphImage) {
    let image = match graph {
        GraphImage::Url(url) => egui::Image::from_uri(url.clone()),
        GraphImage::Inline { uri, bytes } => egui::Image::from_bytes(uri.clone(), bytes.clone()),
        GraphImage::Invalid(reason) => {
            ui.label(RichText::new(format!("Cannot show graph: {reason}")).color(Color32::YELLOW));
            return;
        }
    };
    ui.add(image.max_width(ui.available_width()).shrink_to_fit());
    if let GraphImage::Url(url) = graph {
        ui.label(RichText::new(url).weak().small());
    }
}

fn metric_summary(ui: &mut Ui, report: &MetricReport) {
    egui::Grid::new("metric_summary")
        .num_columns(2)
        .spacing([24.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Accuracy:");
            ui.monospace(format!("{:.4}", report.accuracy));
            ui.end_row();
            ui.label("Precision:");
            ui.monospace(format!("{:.4}", report.precision));
            ui.end_row();
            ui.label("F1 Score:");
            ui.monospace(format!("{:.4}", report.f1_score));
            ui.end_row();
        });
}

/// Shaded grid; rows are true classes, columns predicted classes.
fn confusion_grid(ui: &mut Ui, matrix: &ConfusionMatrix) {
    if matrix.size() == 0 {
        ui.label("(empty)");
        return;
    }
    let max = matrix.max();

    egui::Grid::new("confusion_matrix")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for j in 0..matrix.size() {
                ui.label(RichText::new(format!("pred {j}")).small().weak());
            }
            ui.end_row();

            for (i, row) in matrix.rows().iter().enumerate() {
                ui.label(RichText::new(format!("true {i}")).small().weak());
                for (j, &count) in row.iter().enumerate() {
                    let fill = heat_color(count, max, i == j);
                    egui::Frame::default()
                        .fill(fill)
                        .inner_margin(6.0)
                        .show(ui, |ui: &mut Ui| {
                            ui.label(
                                RichText::new(count.to_string())
                                    .monospace()
                                    .color(text_color_on(fill)),
                            );
                        });
                }
                ui.end_row();
            }
        });

    ui.collapsing("As text", |ui: &mut Ui| {
        ui.monospace(matrix.to_string());
    });
}

/// Side-by-side bars for train and test scores.
fn comparison_chart(ui: &mut Ui, result: &TrainingResult) {
    let colors = generate_palette(2);
    let series = [
        (ViewMode::Train, &result.train, -0.2, colors[0]),
        (ViewMode::Test, &result.test, 0.2, colors[1]),
    ];

    Plot::new("train_vs_test")
        .legend(Legend::default())
        .height(180.0)
        .include_y(0.0)
        .include_y(1.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (mode, report, offset, color) in series {
                let bars = [
                    ("Accuracy", report.accuracy),
                    ("Precision", report.precision),
                    ("F1 Score", report.f1_score),
                ]
                .iter()
                .enumerate()
                .map(|(i, &(name, value))| {
                    Bar::new(i as f64 + offset, value).width(0.35).name(name)
                })
                .collect();

                plot_ui.bar_chart(BarChart::new(bars).name(mode.label()).color(color));
            }
        });
}
