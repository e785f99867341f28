use crate::config::{default_device_count, default_refresh_hz};

use serde::{Deserialize, Serialize};

/// Camera configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Preferred camera (None = first enumerated device).
    #[serde(default)]
    pub device_id: Option<String>,

    /// Number of synthetic test-pattern cameras to expose.
    #[serde(default = "default_device_count")]
    pub device_count: usize,

    /// Display refresh rate driving the render loop.
    #[serde(default = "default_refresh_hz")]
    pub refresh_hz: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_id: None,
            device_count: default_device_count(),
            refresh_hz: default_refresh_hz(),
        }
    }
}
