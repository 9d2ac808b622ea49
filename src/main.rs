//! ledspec: audio spectrum visualizer for low-resolution LED matrices.

mod analyzer;
mod app;
mod capture;
mod commands;
mod config;
mod display;
mod logging;
mod session;
mod setup;
mod ui;

fn main() {
    if let Err(e) = app::run() {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
