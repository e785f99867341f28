mod camera_config;
#[allow(clippy::module_inception)]
mod config;
mod overlay_config;
mod recording_config;
mod storage_config;

pub(crate) use {
    camera_config::CameraConfig, config::Config, overlay_config::OverlayConfig,
    recording_config::RecordingConfig, storage_config::StorageConfig,
};

pub(crate) const DEFAULT_DEVICE_COUNT: usize = 2;
pub(crate) const DEFAULT_REFRESH_HZ: u32 = 60;
pub(crate) const DEFAULT_MIME_TYPE: &str = crate::platform::PNG_SEQUENCE_MIME_TYPE;
pub(crate) const DEFAULT_WIDTH: u32 = 720;
pub(crate) const DEFAULT_HEIGHT: u32 = 480;

pub(crate) fn default_device_count() -> usize {
    DEFAULT_DEVICE_COUNT
}

pub(crate) fn default_refresh_hz() -> u32 {
    DEFAULT_REFRESH_HZ
}

pub(crate) fn default_mime_type() -> String {
    DEFAULT_MIME_TYPE.to_string()
}

pub(crate) fn default_width() -> u32 {
    DEFAULT_WIDTH
}

pub(crate) fn default_height() -> u32 {
    DEFAULT_HEIGHT
}
