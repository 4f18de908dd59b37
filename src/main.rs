#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use anyhow::Result;
use eframe::egui;

mod app;
mod app_ui;
mod client;
mod endpoint;
mod error;
mod message;
mod observe;
mod prefs;
mod protocol;
mod pull;
mod session;
mod status;
#[cfg(test)]
mod test_support;

use app::ChatApp;
use prefs::Preferences;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let prefs_path = Preferences::default_path();
    let prefs = match &prefs_path {
        Some(path) => Preferences::load(path).unwrap_or_else(|e| {
            log::warn!("Using default preferences: {:#}", e);
            Preferences::default()
        }),
        None => Preferences::default(),
    };

    let runtime = tokio::runtime::Handle::current();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ollama Chat",
        options,
        Box::new(move |cc| Box::new(ChatApp::new(cc, runtime, prefs, prefs_path))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))
}
