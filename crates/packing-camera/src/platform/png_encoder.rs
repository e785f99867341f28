//! PNG-sequence video encoder.
//!
//! Samples the output surface at the requested frame rate and emits one chunk
//! per frame: a complete PNG image. The recording is the concatenation of
//! those images; each carries its own size in the `IHDR` chunk.

use packing_camera_core::{
    CameraError, CoreResult, extension_for_mime,
    platform::{
        EncoderEvent, EncoderHandle, EncoderPlatform, EncoderRequest, SharedSurface, lock_surface,
    },
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use image::{
    ExtendedColorType, ImageEncoder,
    codecs::png::{CompressionType, FilterType, PngEncoder},
};
use tokio::{
    runtime::Handle,
    sync::{mpsc, watch},
    time::MissedTickBehavior,
};
use tracing::{debug, info, instrument, warn};

/// MIME type produced by [`PngSequenceEncoder`].
pub const PNG_SEQUENCE_MIME_TYPE: &str = "video/x-png";

/// Encoder writing one PNG per sampled frame.
#[derive(Debug, Default)]
pub struct PngSequenceEncoder;

impl PngSequenceEncoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self
    }
}

impl EncoderPlatform for PngSequenceEncoder {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        mime_type.starts_with("video/") && extension_for_mime(mime_type) == "x-png"
    }

    #[track_caller]
    #[instrument(skip(self, surface, events))]
    fn open(
        &self,
        surface: SharedSurface,
        request: &EncoderRequest,
        events: mpsc::UnboundedSender<EncoderEvent>,
    ) -> CoreResult<Box<dyn EncoderHandle>> {
        let runtime = Handle::try_current().map_err(|e| CameraError::Platform {
            reason: format!("Encoder needs a tokio runtime: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if request.frame_rate == 0 {
            return Err(CameraError::EncoderFailed {
                reason: "Frame rate must be non-zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let period = Duration::from_secs(1) / request.frame_rate;
        let (stop_tx, stop_rx) = watch::channel(false);

        runtime.spawn(sample_surface(surface, period, events, stop_rx));

        info!(frame_rate = request.frame_rate, "PNG encoder started");

        Ok(Box::new(PngEncoderHandle { stop_tx }))
    }
}

async fn sample_surface(
    surface: SharedSurface,
    period: Duration,
    events: mpsc::UnboundedSender<EncoderEvent>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frames = 0u64;
    let mut bytes = 0usize;

    loop {
        tokio::select! {
            biased;

            changed = stop_rx.changed() => {
                // A dropped handle counts as a stop request.
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }

            _ = ticker.tick() => {
                let chunk = match encode_frame(&surface).await {
                    Ok(chunk) => chunk,
                    Err(reason) => {
                        warn!(reason = %reason, "Frame encoding failed");
                        let _ = events.send(EncoderEvent::Error(reason));
                        return;
                    }
                };
                bytes += chunk.len();
                if events.send(EncoderEvent::Data(chunk)).is_err() {
                    debug!("Recorder went away, stopping encoder");
                    return;
                }
                frames += 1;
            }
        }
    }

    // Final frame, then the stop marker.
    match encode_frame(&surface).await {
        Ok(chunk) => {
            bytes += chunk.len();
            frames += 1;
            let _ = events.send(EncoderEvent::Data(chunk));
            let _ = events.send(EncoderEvent::Stopped);
        }
        Err(reason) => {
            let _ = events.send(EncoderEvent::Error(reason));
        }
    }

    info!(frames, byte_len = bytes, "PNG encoder stopped");
}

/// Snapshot the surface, then compress off the runtime thread.
async fn encode_frame(surface: &SharedSurface) -> Result<Vec<u8>, String> {
    let (width, height, pixels) = {
        let surface = lock_surface(surface);
        let (width, height) = surface.dimensions();
        (width, height, surface.snapshot())
    };

    tokio::task::spawn_blocking(move || encode_png(width, height, &pixels))
        .await
        .map_err(|e| format!("Encoder worker failed: {}", e))?
}

fn encode_png(width: u32, height: u32, pixels: &[u8]) -> Result<Vec<u8>, String> {
    let mut chunk = Vec::new();
    PngEncoder::new_with_quality(&mut chunk, CompressionType::Fast, FilterType::Adaptive)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| format!("PNG encoding failed: {}", e))?;
    Ok(chunk)
}

struct PngEncoderHandle {
    stop_tx: watch::Sender<bool>,
}

impl EncoderHandle for PngEncoderHandle {
    #[track_caller]
    fn request_stop(&mut self) -> CoreResult<()> {
        self.stop_tx
            .send(true)
            .map_err(|_| CameraError::EncoderFailed {
                reason: "Encoder task already exited".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
