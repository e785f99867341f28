use crate::storage::PersistOutcome;

/// Category of a user-facing alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Camera access refused or no matching camera.
    CameraAccess,
    /// The configured MIME type can't be encoded.
    EncoderUnsupported,
    /// The encoder failed during a recording.
    Recording,
    /// The recording could neither be saved nor downloaded.
    Storage,
}

/// Message to show the user. Terminal for the attempt; never retried
/// automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Alert category.
    pub kind: AlertKind,
    /// Human-readable description.
    pub message: String,
}

/// Events emitted to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Something failed that the user should know about.
    Alert(Alert),
    /// The live camera changed; `None` means no active camera.
    CameraChanged {
        /// Device of the new live stream.
        device_id: Option<String>,
    },
    /// A finished recording was stored.
    Persisted(PersistOutcome),
}
