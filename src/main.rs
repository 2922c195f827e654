// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! mdremix - Main Entry Point
//!
//! A dual-pane Markdown editor with a live outline that follows your scroll
//! position. Built with Rust and egui.

use log::{info, warn};
use mdremix::app::{MdRemixApp, SAMPLE_DOCUMENT};
use mdremix::config::load_config;
use std::fs;
use std::path::PathBuf;

/// Application name constant.
const APP_NAME: &str = "mdremix";

/// Read the document named on the command line, or fall back to the sample.
fn load_document() -> (String, Option<PathBuf>) {
    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        return (SAMPLE_DOCUMENT.to_string(), None);
    };

    match fs::read_to_string(&path) {
        Ok(text) => {
            info!("Opened {} ({} bytes)", path.display(), text.len());
            (text, Some(path))
        }
        Err(e) => {
            warn!("Failed to read {}: {}. Showing sample.", path.display(), e);
            (SAMPLE_DOCUMENT.to_string(), None)
        }
    }
}

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    let settings = load_config();
    let window_size = settings.window_size;
    let (document, path) = load_document();

    let title = match &path {
        Some(path) => format!(
            "{} - {}",
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            APP_NAME
        ),
        None => APP_NAME.to_string(),
    };

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title(title)
        .with_inner_size([window_size.width, window_size.height])
        .with_min_inner_size([400.0, 300.0])
        .with_maximized(window_size.maximized);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| Ok(Box::new(MdRemixApp::new(cc, settings, document)))),
    )
}
