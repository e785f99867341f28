//! Packing-Camera: records order-packing sessions with a burned-in order overlay.

mod app;
mod app_command;
mod config;
mod console_handler;
mod error;
mod platform;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    console_handler::ConsoleHandler,
    error::{AppError, Result as AppResult},
};

use crate::config::Config;

use std::time::Duration;

use packing_camera_core::CameraPipeline;
use tokio::{
    io::BufReader,
    sync::{mpsc, watch},
};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "packing_camera=debug,packing_camera_core=info";

/// Application entry point.
fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    // Render loop, encoder and storage interleave on one thread.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let exit_code = rt.block_on(run(config));

    // Stdin reads block a runtime thread until the next line arrives.
    rt.shutdown_timeout(Duration::from_secs(1));

    std::process::exit(exit_code);
}

async fn run(config: Config) -> i32 {
    let (platform, surface) = platform::build(&config);
    let (pipeline, events_rx) = CameraPipeline::new(platform, surface, config.pipeline_settings());

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let console = ConsoleHandler::new(command_tx);
    let app = App {
        pipeline,
        events_rx,
        config,
        command_rx,
        shutdown_tx,
    };

    let (console_result, app_result) = tokio::join!(
        console.run(BufReader::new(tokio::io::stdin()), shutdown_rx),
        app.run()
    );

    if let Err(e) = console_result {
        error!(error = ?e, "Console handler error");
    }

    match app_result {
        Ok(()) => 0,
        Err(e) => {
            error!(error = ?e, "App error");
            1
        }
    }
}
