//! Wall of Love Desktop Application
//!
//! A sticky-note board of gratitude messages.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod bootstrap_config;
mod components;
mod services;
mod state;

use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use tracing_subscriber::EnvFilter;

fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wall_desktop=debug,wall_core=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Wall of Love...");

    let config = Config::new().with_window(
        WindowBuilder::new()
            .with_title("Wall of Love")
            .with_inner_size(LogicalSize::new(960.0, 720.0)),
    );

    dioxus::LaunchBuilder::new()
        .with_cfg(config)
        .launch(app::App);
}
