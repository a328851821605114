//! Stickynote - plain-text sticky notes with spell checking
//!
//! Notes live as text files in a per-user directory; misspelled words are
//! underlined using Hunspell/MySpell dictionaries found on the system.

mod app;
mod core;
mod plugin;
mod spell;
mod ui;

use app::StickyNoteApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Initialize logging, RUST_LOG overrides the default level
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Stickynote...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 480.0])
            .with_min_inner_size([320.0, 240.0])
            .with_title("Stickynote"),
        ..Default::default()
    };

    eframe::run_native(
        "Stickynote",
        native_options,
        Box::new(|cc| Ok(Box::new(StickyNoteApp::new(cc)))),
    )
}
