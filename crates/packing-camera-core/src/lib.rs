//! Packing Camera Core Library
//!
//! Capture → composite → encode → persist pipeline for order-packing
//! recordings: a live camera feed gets a timestamped order overlay, is
//! encoded to a single blob, and is saved to a permission-checked directory
//! or handed out as a download.
//!
//! Platform primitives (camera driver, encoder, file system, display clock)
//! are supplied by the host through the traits in [`platform`].
//!
//! # Example
//!
//! ```no_run
//! use packing_camera_core::{
//!     CameraPipeline, CoreResult, OverlayState, PipelineSettings,
//!     platform::{Platform, SharedSurface},
//! };
//!
//! async fn record(platform: Platform, surface: SharedSurface) -> CoreResult<()> {
//!     let settings = PipelineSettings {
//!         overlay: OverlayState::new("ORD1", "Blue mug"),
//!         mime_type: "video/webm".to_string(),
//!     };
//!     let (mut pipeline, _events) = CameraPipeline::new(platform, surface, settings);
//!
//!     pipeline.start_camera(None).await?;
//!     pipeline.start_recording()?;
//!     tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//!     let outcome = pipeline.stop_recording().await?;
//!
//!     println!("Stored as {}", outcome.filename());
//!     pipeline.shutdown().await;
//!     Ok(())
//! }
//! ```

mod capture;
mod device;
mod encoder;
mod error;
mod overlay;
mod pipeline;
pub mod platform;
mod storage;

pub use {
    capture::CaptureSession,
    device::DeviceRegistry,
    encoder::{Recorder, RecorderPhase, RecordingSession, TARGET_FRAME_RATE},
    error::CameraError,
    error::Result as CoreResult,
    overlay::{Compositor, OverlayState, RenderLoop, RenderStats, TickOutcome},
    pipeline::{Alert, AlertKind, CameraPipeline, PipelineEvent, PipelineSettings},
    storage::{
        Blob, FALLBACK_EXTENSION, PersistOutcome, StorageSink, StorageTarget,
        extension_for_mime, recording_filename,
    },
};
