use crate::{
    CoreResult,
    platform::{CameraPlatform, LiveStream, StreamConstraints},
};

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

/// Owns the single live camera stream.
///
/// At most one stream is held at a time: acquiring releases the previous
/// stream first, and a failed acquisition leaves the session released.
pub struct CaptureSession {
    platform: Arc<dyn CameraPlatform>,
    stream: Option<Arc<dyn LiveStream>>,
}

impl CaptureSession {
    /// Create a released session bound to a camera platform.
    pub fn new(platform: Arc<dyn CameraPlatform>) -> Self {
        Self {
            platform,
            stream: None,
        }
    }

    /// Open a video-only stream, constrained to `device_id` when given.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` or `DeviceUnavailable` from the platform. The
    /// session holds no stream afterwards.
    #[instrument(skip(self))]
    pub async fn acquire(&mut self, device_id: Option<&str>) -> CoreResult<Arc<dyn LiveStream>> {
        self.release();

        let constraints = StreamConstraints::video_only(device_id);
        let stream = self.platform.open_stream(&constraints).await.inspect_err(|e| {
            warn!(error = %e, "Camera acquisition failed");
        })?;

        info!(device_id = %stream.device_id(), "Camera stream acquired");

        self.stream = Some(Arc::clone(&stream));

        Ok(stream)
    }

    /// Stop every track of the held stream. Safe to call repeatedly.
    #[instrument(skip(self))]
    pub fn release(&mut self) {
        match self.stream.take() {
            Some(stream) => {
                stream.stop_tracks();
                info!(device_id = %stream.device_id(), "Camera stream released");
            }
            None => debug!("No camera stream to release"),
        }
    }

    /// Release the current stream and acquire `new_id`.
    ///
    /// On failure the session is left released; callers treat that as
    /// "no active camera" and may retry.
    #[instrument(skip(self))]
    pub async fn switch_device(&mut self, new_id: &str) -> CoreResult<Arc<dyn LiveStream>> {
        self.release();
        self.acquire(Some(new_id)).await
    }

    /// Whether a live stream is held.
    pub fn is_active(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_live())
    }

    /// Device id of the held stream.
    pub fn device_id(&self) -> Option<&str> {
        self.stream.as_deref().map(|s| s.device_id())
    }

    /// The held stream, for read-only consumers.
    pub fn stream(&self) -> Option<Arc<dyn LiveStream>> {
        self.stream.clone()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.stop_tracks();
        }
    }
}
