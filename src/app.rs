use eframe::egui;

use crate::jobs::JobRunner;
use crate::state::AppState;
use crate::ui::{metrics, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TrainerApp {
    pub state: AppState,
    jobs: JobRunner,
}

impl TrainerApp {
    pub fn new(state: AppState, jobs: JobRunner) -> Self {
        Self { state, jobs }
    }

    /// Apply every finished background job.
    fn drain_jobs(&mut self) {
        while let Some(message) = self.jobs.try_next() {
            self.state.apply(message);
        }
    }

    /// Only the first dropped file is used.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        if let Some(file) = dropped {
            panels::ingest_dropped(&mut self.state, &self.jobs, &file);
        }
    }
}

impl eframe::App for TrainerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_jobs();
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &self.jobs);
        });

        // ---- Left side panel: file and selection ----
        egui::SidePanel::left("selection_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &self.jobs);
            });

        // ---- Right side panel: metrics ----
        egui::SidePanel::right("results_panel")
            .default_width(420.0)
            .resizable(true)
            .show(ctx, |ui| {
                metrics::results_panel(ui, &mut self.state);
            });

        // ---- Central panel: data preview ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::data_table(ui, &self.state);
        });
    }
}
