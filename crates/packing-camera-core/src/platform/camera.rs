use crate::CoreResult;

use std::{fmt, sync::Arc};

use async_trait::async_trait;

/// Kind of media device reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Camera or other video source.
    VideoInput,
    /// Microphone.
    AudioInput,
    /// Speaker or other sink.
    AudioOutput,
}

/// A capture device as reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDevice {
    /// Opaque platform identifier.
    pub id: String,
    /// Human-readable label (may be empty before permission is granted).
    pub label: String,
    /// Device kind.
    pub kind: DeviceKind,
}

impl CaptureDevice {
    /// Create a video-input device.
    pub fn video_input(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: DeviceKind::VideoInput,
        }
    }
}

/// Constraints passed to the platform when requesting a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Exact device id, or `None` for any default video input.
    pub device_id: Option<String>,
    /// Whether audio is requested. The pipeline always passes `false`.
    pub audio: bool,
}

impl StreamConstraints {
    /// Video-only constraints for an optional device id.
    pub fn video_only(device_id: Option<&str>) -> Self {
        Self {
            device_id: device_id.map(str::to_owned),
            audio: false,
        }
    }
}

/// One decoded camera frame, RGBA8 row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Monotonic frame counter from the source.
    pub sequence: u64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Arc<[u8]>,
}

impl fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFrame")
            .field("sequence", &self.sequence)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Exclusively-owned handle to a running camera feed.
///
/// The capture session owns it; the compositor only reads frames.
pub trait LiveStream: Send + Sync {
    /// Device this stream was opened on.
    fn device_id(&self) -> &str;

    /// Latest decoded frame, or `None` while nothing has been decoded yet.
    fn current_frame(&self) -> Option<VideoFrame>;

    /// Stop every underlying track. Must be idempotent.
    fn stop_tracks(&self);

    /// Whether any track is still live.
    fn is_live(&self) -> bool;
}

/// Camera driver contract.
#[async_trait]
pub trait CameraPlatform: Send + Sync {
    /// List media devices of every kind.
    async fn enumerate_devices(&self) -> CoreResult<Vec<CaptureDevice>>;

    /// Request a stream. Fails with `AccessDenied` or `DeviceUnavailable`.
    async fn open_stream(&self, constraints: &StreamConstraints) -> CoreResult<Arc<dyn LiveStream>>;
}
