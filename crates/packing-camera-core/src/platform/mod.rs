//! Contracts the pipeline requires from its platform collaborators.
//!
//! The core never talks to a camera driver, encoder or file system directly;
//! hosts implement these traits and hand them over as a [`Platform`].

mod camera;
mod clock;
mod encoder;
mod storage;
mod surface;

pub use {
    camera::{CameraPlatform, CaptureDevice, DeviceKind, LiveStream, StreamConstraints, VideoFrame},
    clock::{DisplayScheduler, FrameClock},
    encoder::{EncoderEvent, EncoderHandle, EncoderPlatform, EncoderRequest},
    storage::{
        DirectoryHandle, DirectoryPicker, Downloader, PermissionState, StagedDownload,
        WritableFile,
    },
    surface::{OutputSurface, SharedSurface, TextLine, lock_surface},
};

use std::sync::Arc;

/// Bundle of every platform collaborator.
#[derive(Clone)]
pub struct Platform {
    /// Camera driver.
    pub camera: Arc<dyn CameraPlatform>,
    /// Video encoder.
    pub encoder: Arc<dyn EncoderPlatform>,
    /// Directory capability prompt.
    pub picker: Arc<dyn DirectoryPicker>,
    /// Download fallback.
    pub downloader: Arc<dyn Downloader>,
    /// Display frame scheduler.
    pub display: Arc<dyn DisplayScheduler>,
}
