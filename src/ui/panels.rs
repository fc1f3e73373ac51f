use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{FileInput, SourceFile};
use crate::jobs::JobRunner;
use crate::state::AppState;
use crate::status::{IngestionStatus, SubmissionStatus};

/// Rows shown in the preview table.
const PREVIEW_ROWS: usize = 500;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, jobs: &JobRunner) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state, jobs);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(RichText::new(state.config.base_url()).weak());
        ui.separator();

        if let Some(ds) = state.dataset() {
            ui.label(format!(
                "{}: {} rows, {} columns",
                ds.source().name,
                ds.len(),
                ds.columns().len()
            ));
        }

        if state.busy() {
            ui.spinner();
        }

        if let Some(err) = state.error() {
            ui.label(RichText::new(err.to_string()).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – file, selection, submit
// ---------------------------------------------------------------------------

/// Render the left panel with the drop target, selectors and train button.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, jobs: &JobRunner) {
    ui.heading("Dataset");
    ui.separator();

    let drop_text = match (state.pending_file(), state.dataset()) {
        (Some(name), _) => format!("Loading {name}…"),
        (None, Some(ds)) => format!("Selected CSV File: {}", ds.source().name),
        (None, None) => "Drag 'n' drop a CSV file here, or click to select one".to_string(),
    };
    let drop_zone = ui.add(
        egui::Button::new(drop_text)
            .min_size(egui::vec2(ui.available_width(), 60.0))
            .wrap(),
    );
    if drop_zone.clicked() {
        open_file_dialog(state, jobs);
    }
    ui.add_space(8.0);

    ui.strong("Target Variable");
    let columns = state
        .dataset()
        .map(|ds| ds.columns().to_vec())
        .unwrap_or_default();
    let current_target = state.selection().target().unwrap_or_default().to_string();
    let target_text = if current_target.is_empty() {
        "Select Target Variable".to_string()
    } else {
        current_target.clone()
    };
    ui.add_enabled_ui(!columns.is_empty(), |ui: &mut Ui| {
        egui::ComboBox::from_id_salt("target_var")
            .selected_text(target_text)
            .width(ui.available_width())
            .show_ui(ui, |ui: &mut Ui| {
                for col in &columns {
                    if ui.selectable_label(current_target == *col, col).clicked() {
                        state.set_target(col.clone());
                    }
                }
            });
    });
    if !current_target.is_empty() && !columns.is_empty() && !state.selection().target_in(&columns) {
        ui.label(
            RichText::new(format!("'{current_target}' is not a column of this dataset"))
                .color(Color32::YELLOW),
        );
    }
    ui.add_space(8.0);

    ui.strong("Algorithm");
    let algorithms = state.config.algorithms.clone();
    let current_algo = state.selection().algorithm().unwrap_or_default().to_string();
    egui::ComboBox::from_id_salt("algo_name")
        .selected_text(if current_algo.is_empty() {
            "Select Algorithm"
        } else {
            current_algo.as_str()
        })
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for algo in &algorithms {
                if ui.selectable_label(current_algo == *algo, algo).clicked() {
                    state.set_algorithm(algo.clone());
                }
            }
        });
    ui.add_space(12.0);

    let submitting = state.submission_status() == SubmissionStatus::Submitting;
    let button = ui.add_enabled(
        !submitting && state.ingestion_status() != IngestionStatus::Loading,
        egui::Button::new("Train Model").min_size(egui::vec2(ui.available_width(), 28.0)),
    );
    if button.clicked() {
        if let Ok(ticket) = state.begin_submit() {
            jobs.spawn_submit(ticket);
        }
    }

    ui.add_space(4.0);
    ui.label(RichText::new(submission_label(state.submission_status())).weak());
    if !submitting && !state.can_submit() {
        ui.label(RichText::new("Choose a CSV file, target variable and algorithm").weak().small());
    }
}

fn submission_label(status: SubmissionStatus) -> &'static str {
    match status {
        SubmissionStatus::Idle => "Ready to train",
        SubmissionStatus::Submitting => "Training…",
        SubmissionStatus::Success => "Training finished",
        SubmissionStatus::Error => "Training failed",
    }
}

// ---------------------------------------------------------------------------
// Data preview table
// ---------------------------------------------------------------------------

/// Render the loaded rows as a scrollable table.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let Some(ds) = state.dataset() else {
        ui.label("No dataset loaded.");
        return;
    };

    let columns = ds.columns();
    let rows = &ds.rows()[..ds.len().min(PREVIEW_ROWS)];
    if ds.len() > PREVIEW_ROWS {
        ui.label(RichText::new(format!("Showing first {PREVIEW_ROWS} of {} rows", ds.len())).weak());
    }

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto().at_least(60.0).resizable(true), columns.len())
            .header(20.0, |mut header| {
                for name in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let record = &rows[row.index()];
                    for name in columns {
                        row.col(|ui: &mut Ui| {
                            if let Some(value) = record.get(name) {
                                ui.label(value.to_string());
                            }
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// File input
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, jobs: &JobRunner) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv"])
        .pick_file();

    if let Some(path) = file {
        ingest_path(state, jobs, &path, None);
    }
}

/// Start ingesting a file dropped onto the window.
pub fn ingest_dropped(state: &mut AppState, jobs: &JobRunner, dropped: &egui::DroppedFile) {
    let declared = Some(dropped.mime.as_str()).filter(|m| !m.is_empty());

    if let Some(bytes) = &dropped.bytes {
        let file = match declared {
            Some(mime) => SourceFile::new(dropped.name.clone(), mime, bytes.to_vec()),
            None => SourceFile::from_extension(dropped.name.clone(), bytes.to_vec()),
        };
        if let Some(ticket) = state.begin_ingest(file) {
            jobs.spawn_parse(ticket);
        }
    } else if let Some(path) = &dropped.path {
        ingest_path(state, jobs, path, declared);
    }
}

/// `declared` is the MIME type reported by the platform, if any. The read
/// happens on the parse job, after the media type check.
fn ingest_path(state: &mut AppState, jobs: &JobRunner, path: &Path, declared: Option<&str>) {
    if let Some(ticket) = state.begin_ingest(FileInput::on_disk(path, declared)) {
        jobs.spawn_parse(ticket);
    }
}
