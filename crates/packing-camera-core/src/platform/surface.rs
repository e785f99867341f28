use crate::platform::VideoFrame;

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::error;

/// Text drawn on top of a composited frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    /// Text content.
    pub text: String,
    /// Left edge in surface pixels.
    pub x: u32,
    /// Baseline in surface pixels.
    pub y: u32,
    /// Font size in pixels.
    pub font_px: u32,
    /// RGBA color.
    pub color: [u8; 4],
}

/// Pixel buffer that receives the composited output and can be captured by an
/// encoder.
pub trait OutputSurface: Send {
    /// Configured `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    /// Draw `frame` scaled to `width` x `height`, replacing previous content.
    fn draw_frame(&mut self, frame: &VideoFrame, width: u32, height: u32);

    /// Draw one line of text over the current content.
    fn draw_text(&mut self, line: &TextLine);

    /// Snapshot of the current RGBA8 content.
    fn snapshot(&self) -> Vec<u8>;
}

/// Output surface shared between the render loop and the encoder.
pub type SharedSurface = Arc<Mutex<dyn OutputSurface>>;

/// Lock a shared surface, recovering from a poisoned mutex.
///
/// A poisoned surface still holds a valid pixel buffer; the next frame
/// overwrites whatever half-drawn content the panicking holder left.
pub fn lock_surface(surface: &SharedSurface) -> MutexGuard<'_, dyn OutputSurface + 'static> {
    surface.lock().unwrap_or_else(|e| {
        error!("Output surface lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}
