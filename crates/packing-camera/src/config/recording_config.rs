use crate::config::{default_height, default_mime_type, default_width};

use serde::{Deserialize, Serialize};

/// Output surface and encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// MIME/codec string requested from the encoder.
    #[serde(default = "default_mime_type")]
    pub mime_type: String,

    /// Output surface width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output surface height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            mime_type: default_mime_type(),
            width: default_width(),
            height: default_height(),
        }
    }
}
