//! Native Sankey flow editor
//!
//! Enter source → target flows, see them as a Sankey diagram, export a PNG.

mod app;
mod flows;
mod sankey;
mod settings;
mod storage;
mod theme;

use eframe::egui;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_title("Sankey Flows"),
        persist_window: true, // Persist window state and egui memory between sessions
        ..Default::default()
    };

    eframe::run_native(
        "Sankey Flows",
        options,
        Box::new(|cc| Ok(Box::new(app::SankeyApp::new(cc)))),
    )
}
