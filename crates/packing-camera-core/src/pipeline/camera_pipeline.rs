use crate::{
    CameraError, CoreResult,
    capture::CaptureSession,
    device::DeviceRegistry,
    encoder::{Recorder, RecorderPhase},
    overlay::{OverlayState, RenderLoop},
    pipeline::{Alert, AlertKind, PipelineEvent},
    platform::{CaptureDevice, LiveStream, Platform, SharedSurface},
    storage::{PersistOutcome, StorageSink, StorageTarget, recording_filename},
};

use std::{panic::Location, sync::Arc};

use chrono::Local;
use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// User-declared recording options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Initial overlay content; the order code also prefixes filenames.
    pub overlay: OverlayState,
    /// MIME/codec string for the encoder and the file extension.
    pub mime_type: String,
}

/// Capture → composite → encode → persist.
///
/// Owns every stage and drives them on a single task. Alerts and persist
/// outcomes go to the receiver returned by [`CameraPipeline::new`]; the
/// recording flag is published on a watch channel for UI binding.
pub struct CameraPipeline {
    platform: Platform,
    registry: DeviceRegistry,
    session: CaptureSession,
    surface: SharedSurface,
    render_loop: Option<RenderLoop>,
    recorder: Recorder,
    sink: StorageSink,
    target: StorageTarget,
    overlay_tx: watch::Sender<OverlayState>,
    recording_tx: watch::Sender<bool>,
    events_tx: mpsc::UnboundedSender<PipelineEvent>,
}

impl CameraPipeline {
    /// Build an idle pipeline over `platform`, compositing into `surface`.
    pub fn new(
        platform: Platform,
        surface: SharedSurface,
        settings: PipelineSettings,
    ) -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (overlay_tx, _) = watch::channel(settings.overlay);
        let (recording_tx, _) = watch::channel(false);

        let pipeline = Self {
            registry: DeviceRegistry::new(),
            session: CaptureSession::new(Arc::clone(&platform.camera)),
            render_loop: None,
            recorder: Recorder::new(Arc::clone(&platform.encoder), settings.mime_type),
            sink: StorageSink::new(
                Arc::clone(&platform.picker),
                Arc::clone(&platform.downloader),
            ),
            target: StorageTarget::new(),
            platform,
            surface,
            overlay_tx,
            recording_tx,
            events_tx,
        };

        (pipeline, events_rx)
    }

    /// Refresh the device list.
    pub async fn enumerate_devices(&mut self) -> Vec<CaptureDevice> {
        self.registry
            .enumerate(self.platform.camera.as_ref())
            .await
            .to_vec()
    }

    /// Select a device; switches the live camera when one is running.
    ///
    /// # Errors
    ///
    /// `DeviceNotFound` for an unknown id, or the switch failure.
    #[instrument(skip(self))]
    pub async fn select_device(&mut self, device_id: &str) -> CoreResult<()> {
        self.registry.select(device_id)?;

        if self.session.is_active() && self.session.device_id() != Some(device_id) {
            self.switch_device(device_id).await?;
        }

        Ok(())
    }

    /// Enumerate, acquire the preferred (or default) camera and start
    /// compositing.
    ///
    /// A preferred device that is unavailable is reported and replaced by
    /// the platform's default camera.
    ///
    /// # Errors
    ///
    /// `AccessDenied` / `DeviceUnavailable` when no camera could be opened.
    #[instrument(skip(self))]
    pub async fn start_camera(&mut self, preferred: Option<&str>) -> CoreResult<()> {
        self.stop_camera();

        self.registry.enumerate(self.platform.camera.as_ref()).await;
        if let Some(id) = preferred
            && let Err(e) = self.registry.select(id)
        {
            warn!(error = %e, "Preferred camera not enumerated, using default");
        }

        let device_id = self.registry.selected().map(str::to_owned);

        let stream = match self.session.acquire(device_id.as_deref()).await {
            Ok(stream) => stream,
            Err(e @ CameraError::DeviceUnavailable { .. }) if device_id.is_some() => {
                self.alert(AlertKind::CameraAccess, &e);
                self.session.acquire(None).await.inspect_err(|e| {
                    self.alert(AlertKind::CameraAccess, e);
                })?
            }
            Err(e) => {
                self.alert(AlertKind::CameraAccess, &e);
                return Err(e);
            }
        };

        self.begin_rendering(stream);

        Ok(())
    }

    /// Release the camera and open `device_id`.
    ///
    /// On failure there is no active camera afterwards.
    #[instrument(skip(self))]
    pub async fn switch_device(&mut self, device_id: &str) -> CoreResult<()> {
        self.halt_rendering();

        match self.session.switch_device(device_id).await {
            Ok(stream) => {
                if let Err(e) = self.registry.select(device_id) {
                    warn!(error = %e, "Switched to a device missing from the last enumeration");
                }
                self.begin_rendering(stream);
                Ok(())
            }
            Err(e) => {
                self.alert(AlertKind::CameraAccess, &e);
                self.emit(PipelineEvent::CameraChanged { device_id: None });
                Err(e)
            }
        }
    }

    /// Cancel the render loop and release the camera. Idempotent.
    #[instrument(skip(self))]
    pub fn stop_camera(&mut self) {
        let was_active = self.render_loop.is_some() || self.session.is_active();

        self.halt_rendering();
        self.session.release();

        if was_active {
            self.emit(PipelineEvent::CameraChanged { device_id: None });
        }
    }

    /// Start encoding the output surface.
    ///
    /// # Errors
    ///
    /// `NoActiveCamera` without a live camera, `InvalidState` while a
    /// recording is running or finalizing, `EncoderUnsupported` for an
    /// unsupported MIME type.
    #[instrument(skip(self))]
    pub fn start_recording(&mut self) -> CoreResult<Uuid> {
        if !self.session.is_active() {
            return Err(CameraError::NoActiveCamera {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        match self.recorder.start(Arc::clone(&self.surface)) {
            Ok(session_id) => {
                self.recording_tx.send_replace(true);
                Ok(session_id)
            }
            Err(e) => {
                match e {
                    CameraError::InvalidState { .. } => {}
                    CameraError::EncoderUnsupported { .. } => {
                        self.alert(AlertKind::EncoderUnsupported, &e)
                    }
                    _ => self.alert(AlertKind::Recording, &e),
                }
                Err(e)
            }
        }
    }

    /// Append chunks that arrived since the last call.
    ///
    /// An encoder failure ends the recording here: it is alerted, the
    /// `recording` flag drops and nothing is persisted.
    pub fn pump_recording(&mut self) -> usize {
        match self.recorder.pump() {
            Ok(kept) => kept,
            Err(e) => {
                self.recording_tx.send_replace(false);
                self.alert(AlertKind::Recording, &e);
                0
            }
        }
    }

    /// Finalize the recording and persist it under a generated filename.
    ///
    /// # Errors
    ///
    /// `InvalidState` when not recording, `EncoderFailed` if finalizing
    /// failed, `StorageUnavailable` if neither save nor download worked.
    #[instrument(skip(self))]
    pub async fn stop_recording(&mut self) -> CoreResult<PersistOutcome> {
        let stopped_at = Local::now();
        if let Err(e) = self.recorder.request_stop() {
            if !matches!(e, CameraError::InvalidState { .. }) {
                self.recording_tx.send_replace(false);
                self.alert(AlertKind::Recording, &e);
            }
            return Err(e);
        }
        self.recording_tx.send_replace(false);

        let blob = self.recorder.finalize().await.inspect_err(|e| {
            self.alert(AlertKind::Recording, e);
        })?;

        let order_code = self.overlay_tx.borrow().order_code.clone();
        let filename = recording_filename(&order_code, blob.mime_type(), stopped_at);

        let outcome = self
            .sink
            .persist(&mut self.target, &blob, &filename)
            .await
            .inspect_err(|e| {
                self.alert(AlertKind::Storage, e);
            })?;

        self.emit(PipelineEvent::Persisted(outcome.clone()));

        Ok(outcome)
    }

    /// Replace the overlay content; the next tick draws it.
    #[instrument(skip(self))]
    pub fn set_overlay(&self, order_code: &str, product_name: &str) {
        self.overlay_tx
            .send_replace(OverlayState::new(order_code, product_name));
        info!("Overlay updated");
    }

    /// Persist a running recording, then stop the camera.
    #[instrument(skip(self))]
    pub async fn shutdown(&mut self) {
        if self.recorder.is_recording()
            && let Err(e) = self.stop_recording().await
        {
            warn!(error = %e, "Failed to persist recording during shutdown");
        }
        self.stop_camera();
        info!("Pipeline shut down");
    }

    /// Watch the `recording` flag.
    pub fn subscribe_recording(&self) -> watch::Receiver<bool> {
        self.recording_tx.subscribe()
    }

    /// Whether the encoder is running.
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Encoder phase.
    pub fn recorder_phase(&self) -> RecorderPhase {
        self.recorder.phase()
    }

    /// Device of the live camera.
    pub fn active_device(&self) -> Option<&str> {
        self.session.device_id()
    }

    /// Whether a render loop is scheduled.
    pub fn is_rendering(&self) -> bool {
        self.render_loop.as_ref().is_some_and(RenderLoop::is_running)
    }

    /// Devices from the last enumeration.
    pub fn devices(&self) -> &[CaptureDevice] {
        self.registry.devices()
    }

    /// Currently selected device.
    pub fn selected_device(&self) -> Option<&str> {
        self.registry.selected()
    }

    /// Current overlay content.
    pub fn overlay(&self) -> OverlayState {
        self.overlay_tx.borrow().clone()
    }

    /// Storage capability state.
    pub fn storage_target(&self) -> &StorageTarget {
        &self.target
    }

    fn begin_rendering(&mut self, stream: Arc<dyn LiveStream>) {
        let device_id = stream.device_id().to_string();
        let clock = self.platform.display.frame_clock();

        self.render_loop = Some(RenderLoop::spawn(
            stream,
            Arc::clone(&self.surface),
            self.overlay_tx.subscribe(),
            clock,
        ));

        info!(device_id = %device_id, "Camera live");
        self.emit(PipelineEvent::CameraChanged {
            device_id: Some(device_id),
        });
    }

    fn halt_rendering(&mut self) {
        if let Some(mut render_loop) = self.render_loop.take() {
            render_loop.cancel();
        }
    }

    fn alert(&self, kind: AlertKind, error: &CameraError) {
        warn!(?kind, error = %error, "Pipeline alert");
        self.emit(PipelineEvent::Alert(Alert {
            kind,
            message: error.to_string(),
        }));
    }

    fn emit(&self, event: PipelineEvent) {
        // A dropped receiver only means nobody is listening.
        let _ = self.events_tx.send(event);
    }
}
