mod recorder;
mod session;

pub use {
    recorder::{Recorder, RecorderPhase, TARGET_FRAME_RATE},
    session::RecordingSession,
};
