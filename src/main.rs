mod app;
mod color;
mod config;
mod data;
mod error;
mod jobs;
mod results;
mod state;
mod status;
mod training;
mod ui;

use std::sync::Arc;

use anyhow::{anyhow, Context};
use app::TrainerApp;
use eframe::egui;
use jobs::JobRunner;
use state::AppState;
use training::client::HttpTrainingService;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = config::load();
    log::info!(
        "Training service at {} ({} algorithms)",
        config.base_url(),
        config.algorithms.len()
    );
    let service = HttpTrainingService::new(&config).context("building HTTP client")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([720.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Model Trainer",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render the returned graph.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            let jobs = JobRunner::new(Arc::new(service)).with_repaint(cc.egui_ctx.clone());
            Ok(Box::new(TrainerApp::new(AppState::new(config), jobs)))
        }),
    )
    .map_err(|e| anyhow!("{e}"))
}
