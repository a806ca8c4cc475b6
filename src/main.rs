mod api;
mod app;
mod application;
mod config;
mod domain;
mod logging;
mod ui;
mod utils;

use iced::{window, Size};
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gamdl_gui=info")),
        )
        .init();

    iced::application(app::DownloadApp::default, app::update, app::view)
        .title("Gamdl GUI")
        .window(window::Settings {
            size: Size::new(900.0, 750.0),
            ..Default::default()
        })
        .run()
}
