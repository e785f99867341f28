use error_location::ErrorLocation;
use thiserror::Error;

/// Capture pipeline errors with source location tracking.
#[derive(Error, Debug)]
pub enum CameraError {
    /// Camera or storage permission was refused by the user or platform.
    #[error("Access denied to {subject}: {reason} {location}")]
    AccessDenied {
        /// What access was requested for (e.g. "camera").
        subject: String,
        /// Description of the refusal.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No capture device matches the requested constraints.
    #[error("Camera unavailable: {device_id:?} {location}")]
    DeviceUnavailable {
        /// Requested device id (None = any default video input).
        device_id: Option<String>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Device id is absent from the last enumeration.
    #[error("Device not found: {device_id} {location}")]
    DeviceNotFound {
        /// The unknown device id.
        device_id: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The platform encoder cannot produce the configured MIME type.
    #[error("Encoder does not support {mime_type} {location}")]
    EncoderUnsupported {
        /// The rejected MIME/codec string.
        mime_type: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The platform encoder failed while recording or finalizing.
    #[error("Encoder failed: {reason} {location}")]
    EncoderFailed {
        /// Description of the encoder failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Neither a directory capability nor a download could take the recording.
    #[error("Storage unavailable: {reason} {location}")]
    StorageUnavailable {
        /// Description of the storage failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing a file entry inside a granted directory failed.
    #[error("Storage write failed for {filename}: {reason} {location}")]
    StorageWriteFailed {
        /// File entry being written.
        filename: String,
        /// Description of the write failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Operation is not legal in the current pipeline state.
    #[error("Invalid state: {reason} {location}")]
    InvalidState {
        /// Why the transition was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Recording requires a live camera feeding the output surface.
    #[error("No active camera {location}")]
    NoActiveCamera {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Any other platform primitive failure.
    #[error("Platform error: {reason} {location}")]
    Platform {
        /// Description of the platform error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl CameraError {
    /// Whether this error should be surfaced to the user as an alert.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            CameraError::AccessDenied { .. }
                | CameraError::DeviceUnavailable { .. }
                | CameraError::EncoderUnsupported { .. }
                | CameraError::StorageUnavailable { .. }
        )
    }
}

/// Result type alias using [`CameraError`].
pub type Result<T> = std::result::Result<T, CameraError>;
