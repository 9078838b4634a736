use databoard::api::HttpApiClient;
use databoard::gui::DashboardShell;
use databoard::logging;
use databoard::settings::Settings;

use eframe::egui;
use std::sync::Arc;

const SETTINGS_FILE: &str = "settings.json";

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    let _log_guard = logging::init(settings.debug_logging, settings.log_file.clone());
    tracing::info!(api = %settings.api_base_url, "starting DataBoard");

    let api = HttpApiClient::new(&settings.api_base_url, settings.request_timeout())?;
    let (w, h) = settings
        .window_size
        .map(|(w, h)| (w as f32, h as f32))
        .unwrap_or((1200.0, 800.0));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([w, h])
            .with_min_inner_size([640.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let shell = DashboardShell::new(&settings, Arc::new(api));
    eframe::run_native(
        "DataBoard",
        native_options,
        Box::new(move |_cc| Box::new(shell)),
    )
    .map_err(|e| anyhow::anyhow!("failed to start UI: {e}"))?;
    Ok(())
}
