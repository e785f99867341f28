//! Test-pattern camera driver.
//!
//! Exposes `device_count` virtual cameras that render moving color bars.
//! Frames are produced lazily from the time since the stream opened, so no
//! background task is needed and a stopped stream costs nothing.

use packing_camera_core::{
    CameraError, CoreResult,
    platform::{CameraPlatform, CaptureDevice, LiveStream, StreamConstraints, VideoFrame},
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use image::{Rgba, RgbaImage};
use tracing::{debug, info, instrument};

/// Native resolution of the synthetic sensor.
pub(crate) const SENSOR_WIDTH: u32 = 320;
pub(crate) const SENSOR_HEIGHT: u32 = 240;

/// Time before the first frame is "decoded".
pub(crate) const WARM_UP: Duration = Duration::from_millis(100);

const FRAME_INTERVAL: Duration = Duration::from_millis(40);

const BARS: [[u8; 3]; 7] = [
    [192, 192, 192],
    [192, 192, 0],
    [0, 192, 192],
    [0, 192, 0],
    [192, 0, 192],
    [192, 0, 0],
    [0, 0, 192],
];

/// Camera driver backed by generated color bars.
pub struct SyntheticCamera {
    devices: Vec<CaptureDevice>,
}

impl SyntheticCamera {
    /// Expose `device_count` cameras named `synthetic-0`, `synthetic-1`, ...
    pub fn new(device_count: usize) -> Self {
        let devices = (0..device_count)
            .map(|i| {
                CaptureDevice::video_input(
                    format!("synthetic-{}", i),
                    format!("Test pattern {}", i + 1),
                )
            })
            .collect();

        Self { devices }
    }
}

#[async_trait]
impl CameraPlatform for SyntheticCamera {
    async fn enumerate_devices(&self) -> CoreResult<Vec<CaptureDevice>> {
        Ok(self.devices.clone())
    }

    #[instrument(skip(self))]
    async fn open_stream(&self, constraints: &StreamConstraints) -> CoreResult<Arc<dyn LiveStream>> {
        let found = match &constraints.device_id {
            Some(id) => self.devices.iter().position(|d| &d.id == id),
            None if self.devices.is_empty() => None,
            None => Some(0),
        };

        let Some(index) = found else {
            return Err(CameraError::DeviceUnavailable {
                device_id: constraints.device_id.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let device_id = self.devices[index].id.clone();
        info!(device_id = %device_id, "Synthetic stream opened");

        Ok(Arc::new(SyntheticStream {
            device_id,
            // Each camera gets its own bar offset so switching is visible.
            phase: index as u32 * 2,
            opened_at: Instant::now(),
            live: AtomicBool::new(true),
        }))
    }
}

/// A running test-pattern feed.
pub(crate) struct SyntheticStream {
    device_id: String,
    phase: u32,
    opened_at: Instant,
    live: AtomicBool,
}

impl SyntheticStream {
    fn render(&self, sequence: u64) -> RgbaImage {
        let bar_width = SENSOR_WIDTH / BARS.len() as u32;
        let shift = (sequence as u32).wrapping_add(self.phase);

        RgbaImage::from_fn(SENSOR_WIDTH, SENSOR_HEIGHT, |x, y| {
            let bar = (x / bar_width.max(1)).wrapping_add(shift) as usize % BARS.len();
            let [r, g, b] = BARS[bar];
            // Bottom strip: moving ramp to show motion.
            if y > SENSOR_HEIGHT * 3 / 4 {
                let v = (x.wrapping_add(shift.wrapping_mul(4)) % 256) as u8;
                Rgba([v, v, v, 255])
            } else {
                Rgba([r, g, b, 255])
            }
        })
    }
}

impl LiveStream for SyntheticStream {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        if !self.is_live() {
            return None;
        }

        let elapsed = self.opened_at.elapsed();
        if elapsed < WARM_UP {
            return None;
        }

        let sequence = ((elapsed - WARM_UP).as_millis() / FRAME_INTERVAL.as_millis()) as u64;
        let image = self.render(sequence);

        Some(VideoFrame {
            sequence,
            width: image.width(),
            height: image.height(),
            data: image.into_raw().into(),
        })
    }

    fn stop_tracks(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            debug!(device_id = %self.device_id, "Synthetic tracks stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}
