mod session;

pub use session::CaptureSession;
