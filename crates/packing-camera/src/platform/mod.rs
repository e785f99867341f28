//! Software implementations of the pipeline's platform contracts.

mod download_folder;
mod fs_directory;
mod interval_clock;
mod png_encoder;
mod rgba_surface;
mod synthetic_camera;

pub(crate) use {
    download_folder::DownloadFolder,
    fs_directory::FsDirectoryPicker,
    interval_clock::IntervalDisplay,
    png_encoder::{PNG_SEQUENCE_MIME_TYPE, PngSequenceEncoder},
    rgba_surface::RgbaSurface,
    synthetic_camera::SyntheticCamera,
};

#[cfg(test)]
pub(crate) use {
    fs_directory::FsDirectory,
    synthetic_camera::{SENSOR_HEIGHT, SENSOR_WIDTH, WARM_UP},
};

use crate::config::Config;

use std::sync::{Arc, Mutex};

use packing_camera_core::platform::{Platform, SharedSurface};
use tracing::info;

/// Wire every software backend from `config`.
pub(crate) fn build(config: &Config) -> (Platform, SharedSurface) {
    let surface: SharedSurface = Arc::new(Mutex::new(RgbaSurface::new(
        config.recording.width,
        config.recording.height,
    )));

    let platform = Platform {
        camera: Arc::new(SyntheticCamera::new(config.camera.device_count)),
        encoder: Arc::new(PngSequenceEncoder::new()),
        picker: Arc::new(FsDirectoryPicker::new(config.storage.directory.clone())),
        downloader: Arc::new(DownloadFolder::from_user_dirs()),
        display: Arc::new(IntervalDisplay::new(config.camera.refresh_hz)),
    };

    info!(
        width = config.recording.width,
        height = config.recording.height,
        device_count = config.camera.device_count,
        "Software platform ready"
    );

    (platform, surface)
}
