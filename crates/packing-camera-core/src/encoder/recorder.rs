use crate::{
    CameraError, CoreResult,
    encoder::RecordingSession,
    platform::{EncoderEvent, EncoderHandle, EncoderPlatform, EncoderRequest, SharedSurface},
    storage::Blob,
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::sync::mpsc::{self, UnboundedReceiver, error::TryRecvError};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Rate at which the output surface is sampled while recording.
pub const TARGET_FRAME_RATE: u32 = 25;

/// Observable recorder phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderPhase {
    /// No encoder open; `start` is allowed.
    Idle,
    /// Encoder running and delivering chunks.
    Recording,
    /// Stop requested; waiting for the encoder's final chunk.
    Finalizing,
}

#[derive(Debug)]
enum StreamEnd {
    Stopped,
    Failed(String),
    Closed,
}

struct ActiveRecording {
    session: RecordingSession,
    events: UnboundedReceiver<EncoderEvent>,
    end: Option<StreamEnd>,
}

impl ActiveRecording {
    fn accept(&mut self, event: EncoderEvent) -> bool {
        match event {
            EncoderEvent::Data(chunk) => {
                let byte_len = chunk.len();
                let kept = self.session.append(chunk);
                if kept {
                    debug!(
                        byte_len,
                        chunk_count = self.session.chunks().len(),
                        "Chunk appended"
                    );
                } else {
                    debug!("Discarded empty chunk");
                }
                kept
            }
            EncoderEvent::Stopped => {
                self.end = Some(StreamEnd::Stopped);
                false
            }
            EncoderEvent::Error(reason) => {
                self.end = Some(StreamEnd::Failed(reason));
                false
            }
        }
    }

    fn drain_ready(&mut self) -> usize {
        let mut kept = 0;
        while self.end.is_none() {
            match self.events.try_recv() {
                Ok(event) => {
                    if self.accept(event) {
                        kept += 1;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.end = Some(StreamEnd::Closed),
            }
        }
        kept
    }

    async fn wait_for_end(&mut self) -> StreamEnd {
        loop {
            if let Some(end) = self.end.take() {
                return end;
            }
            match self.events.recv().await {
                Some(event) => {
                    self.accept(event);
                }
                None => self.end = Some(StreamEnd::Closed),
            }
        }
    }
}

enum RecorderState {
    Idle,
    Recording {
        active: ActiveRecording,
        handle: Box<dyn EncoderHandle>,
    },
    Finalizing {
        active: ActiveRecording,
        // Kept alive until the final chunk arrives.
        _handle: Box<dyn EncoderHandle>,
    },
}

/// Encodes the output surface into an in-memory recording.
///
/// Lifecycle is `Idle -> Recording -> Finalizing -> Idle`. Starting from any
/// other phase is rejected, so a finalize in flight always completes before
/// the next recording begins.
pub struct Recorder {
    platform: Arc<dyn EncoderPlatform>,
    mime_type: String,
    state: RecorderState,
}

impl Recorder {
    /// Create an idle recorder producing `mime_type`.
    pub fn new(platform: Arc<dyn EncoderPlatform>, mime_type: impl Into<String>) -> Self {
        Self {
            platform,
            mime_type: mime_type.into(),
            state: RecorderState::Idle,
        }
    }

    /// Open the encoder over `surface` at [`TARGET_FRAME_RATE`].
    ///
    /// # Errors
    ///
    /// `InvalidState` unless idle, `EncoderUnsupported` if the platform can't
    /// produce the configured MIME type, or whatever the platform returns
    /// when opening fails.
    #[track_caller]
    #[instrument(skip(self, surface), fields(mime_type = %self.mime_type))]
    pub fn start(&mut self, surface: SharedSurface) -> CoreResult<Uuid> {
        if !matches!(self.state, RecorderState::Idle) {
            return Err(CameraError::InvalidState {
                reason: format!("cannot start recording while {:?}", self.phase()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !self.platform.is_type_supported(&self.mime_type) {
            return Err(CameraError::EncoderUnsupported {
                mime_type: self.mime_type.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let request = EncoderRequest {
            mime_type: self.mime_type.clone(),
            frame_rate: TARGET_FRAME_RATE,
        };
        let handle = self.platform.open(surface, &request, events_tx)?;

        let session = RecordingSession::new(self.mime_type.clone());
        let session_id = session.id();

        self.state = RecorderState::Recording {
            active: ActiveRecording {
                session,
                events: events_rx,
                end: None,
            },
            handle,
        };

        info!(session_id = %session_id, frame_rate = TARGET_FRAME_RATE, "Recording started");

        Ok(session_id)
    }

    /// Append every chunk that has already arrived. Never waits.
    ///
    /// Returns the number of chunks kept.
    ///
    /// # Errors
    ///
    /// `EncoderFailed` if the encoder reported an error while recording. The
    /// recording is discarded and the recorder is idle again.
    #[track_caller]
    pub fn pump(&mut self) -> CoreResult<usize> {
        let (kept, failure) = match &mut self.state {
            RecorderState::Recording { active, .. } => {
                let kept = active.drain_ready();
                let failure = match &active.end {
                    Some(StreamEnd::Failed(reason)) => Some(reason.clone()),
                    _ => None,
                };
                (kept, failure)
            }
            // A failure while finalizing is reported by `finalize`.
            RecorderState::Finalizing { active, .. } => (active.drain_ready(), None),
            RecorderState::Idle => (0, None),
        };

        if let Some(reason) = failure {
            self.discard(&reason);
            return Err(CameraError::EncoderFailed {
                reason,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(kept)
    }

    fn discard(&mut self, reason: &str) {
        if let RecorderState::Recording { mut active, .. } =
            std::mem::replace(&mut self.state, RecorderState::Idle)
        {
            warn!(
                session_id = %active.session.id(),
                chunk_count = active.session.chunks().len(),
                reason = %reason,
                "Encoder failed while recording, recording discarded"
            );
            active.session.clear();
        }
    }

    /// Ask the encoder to finalize. `Recording -> Finalizing`.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless recording. If the encoder refuses the stop
    /// request, the recording is discarded and the recorder returns to idle.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn request_stop(&mut self) -> CoreResult<()> {
        match std::mem::replace(&mut self.state, RecorderState::Idle) {
            RecorderState::Recording { active, mut handle } => {
                if let Err(e) = handle.request_stop() {
                    warn!(
                        session_id = %active.session.id(),
                        error = %e,
                        "Encoder refused stop, discarding recording"
                    );
                    return Err(e);
                }

                info!(session_id = %active.session.id(), "Recording finalizing");

                self.state = RecorderState::Finalizing {
                    active,
                    _handle: handle,
                };
                Ok(())
            }
            other => {
                self.state = other;
                Err(CameraError::InvalidState {
                    reason: format!("cannot stop recording while {:?}", self.phase()),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Wait for the encoder's final chunk and build the blob.
    /// `Finalizing -> Idle`.
    ///
    /// Chunks are cleared whether or not this succeeds.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless finalizing, `EncoderFailed` if the encoder
    /// reported an error.
    #[instrument(skip(self))]
    pub async fn finalize(&mut self) -> CoreResult<Blob> {
        let phase = self.phase();
        let RecorderState::Finalizing { active, .. } = &mut self.state else {
            return Err(CameraError::InvalidState {
                reason: format!("cannot finalize while {:?}", phase),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let end = active.wait_for_end().await;
        let blob = active.session.to_blob();
        let session_id = active.session.id();
        let chunk_count = active.session.chunks().len();
        let duration = active.session.started_at().elapsed();
        active.session.clear();

        self.state = RecorderState::Idle;

        match end {
            StreamEnd::Stopped => {}
            StreamEnd::Closed => {
                warn!(session_id = %session_id, "Encoder closed without a stop event");
            }
            StreamEnd::Failed(reason) => {
                warn!(session_id = %session_id, reason = %reason, "Encoder failed while finalizing");
                return Err(CameraError::EncoderFailed {
                    reason,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        info!(
            session_id = %session_id,
            chunk_count,
            byte_len = blob.len(),
            duration_ms = duration.as_millis(),
            "Recording finalized"
        );

        Ok(blob)
    }

    /// `request_stop` followed by `finalize`.
    pub async fn stop(&mut self) -> CoreResult<Blob> {
        self.request_stop()?;
        self.finalize().await
    }

    /// Current phase.
    pub fn phase(&self) -> RecorderPhase {
        match self.state {
            RecorderState::Idle => RecorderPhase::Idle,
            RecorderState::Recording { .. } => RecorderPhase::Recording,
            RecorderState::Finalizing { .. } => RecorderPhase::Finalizing,
        }
    }

    /// Whether the encoder is running.
    pub fn is_recording(&self) -> bool {
        self.phase() == RecorderPhase::Recording
    }

    /// Chunks kept by the active recording, if any.
    pub fn chunk_count(&self) -> usize {
        match &self.state {
            RecorderState::Recording { active, .. } | RecorderState::Finalizing { active, .. } => {
                active.session.chunks().len()
            }
            RecorderState::Idle => 0,
        }
    }

    /// Configured MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}
