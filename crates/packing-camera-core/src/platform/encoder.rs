use crate::{CoreResult, platform::SharedSurface};

use tokio::sync::mpsc;

/// Events delivered by a platform encoder, in production order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderEvent {
    /// An encoded chunk. May be empty; the recorder discards empty chunks.
    Data(Vec<u8>),
    /// The encoder flushed its last chunk after a stop request.
    Stopped,
    /// The encoder failed; no further events follow.
    Error(String),
}

/// Parameters for opening an encoder over the output surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderRequest {
    /// MIME/codec string, e.g. `video/webm;codecs=vp9`.
    pub mime_type: String,
    /// Rate at which the surface is sampled.
    pub frame_rate: u32,
}

/// Video encoder contract.
pub trait EncoderPlatform: Send + Sync {
    /// Whether the platform can produce `mime_type`.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Start capturing `surface` and deliver events through `events`.
    fn open(
        &self,
        surface: SharedSurface,
        request: &EncoderRequest,
        events: mpsc::UnboundedSender<EncoderEvent>,
    ) -> CoreResult<Box<dyn EncoderHandle>>;
}

/// Control handle for a running encoder.
pub trait EncoderHandle: Send {
    /// Ask the encoder to flush and emit [`EncoderEvent::Stopped`].
    fn request_stop(&mut self) -> CoreResult<()>;
}
