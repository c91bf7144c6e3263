pub mod bridge;
pub mod gamepad;
pub mod mapping;
pub mod protocol;
pub mod serial;
pub mod ui;

use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::ui::WheelbridgeUI;

fn main() -> Result<()> {
    setup()?;

    info!("Found serial ports: {:?}", serial::list_ports());

    // Worker → UI status channel; each connection clones the sender
    let (events_tx, events_rx) = mpsc::channel(100);

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_inner_size([400.0, 260.0])
        .with_resizable(false);

    eframe::run_native(
        "Wheelbridge",
        native_options,
        Box::new(|cc| Ok(Box::new(WheelbridgeUI::new(cc, events_tx, events_rx)))),
    )
    .map_err(|e| eyre!("UI terminated with error: {}", e))?;

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
