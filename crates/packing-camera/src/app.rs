use crate::{AppCommand, AppResult, config::Config};

use std::time::Duration;

use packing_camera_core::{CameraPipeline, PersistOutcome, PipelineEvent};
use tokio::{
    sync::{mpsc, watch},
    time::MissedTickBehavior,
};
use tracing::{error, info, instrument, warn};

/// How often arrived encoder chunks are moved into the recording.
const PUMP_INTERVAL: Duration = Duration::from_millis(200);

/// Main application state.
///
/// Owns the pipeline and drives it from console commands on a single task.
pub struct App {
    pub(crate) pipeline: CameraPipeline,
    pub(crate) events_rx: mpsc::UnboundedReceiver<PipelineEvent>,
    pub(crate) config: Config,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Packing-Camera starting");

        let preferred = self.config.camera.device_id.clone();
        if let Err(e) = self.pipeline.start_camera(preferred.as_deref()).await {
            error!(error = %e, "No camera available, use 'devices' and 'select <id>'");
        }

        let mut pump = tokio::time::interval(PUMP_INTERVAL);
        pump.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        info!("Command channel closed, shutting down");
                        break;
                    };

                    match self.handle_command(command).await {
                        Ok(true) => {}
                        Ok(false) => {
                            info!("Shutdown requested");
                            break;
                        }
                        Err(e) => error!(error = %e, "Command failed"),
                    }
                }

                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event);
                }

                _ = pump.tick() => {
                    self.pipeline.pump_recording();
                }
            }
        }

        self.pipeline.shutdown().await;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }

        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save configuration");
        }

        let _ = self.shutdown_tx.send(true);
        info!("Packing-Camera shut down successfully");

        Ok(())
    }

    /// Apply one console command. Returns `false` when the app should exit.
    #[instrument(skip(self))]
    pub(crate) async fn handle_command(&mut self, command: AppCommand) -> AppResult<bool> {
        match command {
            AppCommand::ListDevices => {
                let devices = self.pipeline.enumerate_devices().await;
                let selected = self.pipeline.selected_device();
                if devices.is_empty() {
                    println!("No cameras found");
                }
                for device in &devices {
                    let marker = if Some(device.id.as_str()) == selected { "*" } else { " " };
                    println!("{} {}  {}", marker, device.id, device.label);
                }
            }
            AppCommand::SelectDevice { device_id } => {
                self.pipeline.select_device(&device_id).await?;
                if self.pipeline.active_device().is_none() {
                    self.pipeline.start_camera(Some(&device_id)).await?;
                }
                self.config.camera.device_id = Some(device_id);
            }
            AppCommand::StartRecording => {
                let session_id = self.pipeline.start_recording()?;
                println!("Recording started ({})", session_id);
            }
            AppCommand::StopRecording => {
                self.pipeline.stop_recording().await?;
            }
            AppCommand::SetOrder { order_code } => {
                self.config.overlay.order_code = order_code;
                self.apply_overlay();
            }
            AppCommand::SetProduct { product_name } => {
                self.config.overlay.product_name = product_name;
                self.apply_overlay();
            }
            AppCommand::Status => self.print_status(),
            AppCommand::Quit => return Ok(false),
        }

        Ok(true)
    }

    /// Report a pipeline event to the operator.
    pub(crate) fn handle_event(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::Alert(alert) => {
                warn!(kind = ?alert.kind, message = %alert.message, "Alert");
                eprintln!("! {:?}: {}", alert.kind, alert.message);
            }
            PipelineEvent::CameraChanged { device_id: Some(id) } => {
                println!("Camera live: {}", id);
            }
            PipelineEvent::CameraChanged { device_id: None } => {
                println!("Camera stopped");
            }
            PipelineEvent::Persisted(PersistOutcome::Saved {
                directory,
                filename,
            }) => {
                println!("Saved {} in {}", filename, directory);
            }
            PipelineEvent::Persisted(PersistOutcome::Downloaded { filename }) => {
                println!("Downloaded {}", filename);
            }
        }
    }

    fn apply_overlay(&self) {
        self.pipeline.set_overlay(
            &self.config.overlay.order_code,
            &self.config.overlay.product_name,
        );
    }

    fn print_status(&self) {
        let overlay = self.pipeline.overlay();
        println!(
            "camera: {}",
            self.pipeline.active_device().unwrap_or("none")
        );
        println!("recorder: {:?}", self.pipeline.recorder_phase());
        println!(
            "order: {}  product: {}",
            overlay.order_code, overlay.product_name
        );
        println!(
            "storage: {} ({:?})",
            self.pipeline
                .storage_target()
                .directory()
                .map_or_else(|| "not chosen".to_string(), |d| d.name()),
            self.pipeline.storage_target().permission()
        );
    }
}
