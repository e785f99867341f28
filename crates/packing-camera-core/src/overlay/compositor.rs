use crate::{
    overlay::OverlayState,
    platform::{LiveStream, SharedSurface, TextLine, lock_surface},
};

use chrono::{DateTime, Local};
use tracing::trace;

/// Left margin of overlay text.
pub(crate) const TEXT_MARGIN_X: u32 = 10;
/// Baseline of the first overlay line.
pub(crate) const FIRST_BASELINE_Y: u32 = 30;
/// Distance between overlay baselines.
pub(crate) const LINE_SPACING: u32 = 30;
/// Overlay font size.
pub(crate) const FONT_PX: u32 = 20;
const TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Result of a single render tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The stream had no decoded frame yet; nothing was drawn.
    Skipped,
    /// A frame was drawn, with `overlay_lines` text lines on top.
    Composited {
        /// Number of overlay lines drawn (0 or 3).
        overlay_lines: usize,
    },
}

/// Draws the live frame plus overlay text onto the output surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compositor;

impl Compositor {
    /// Compose one frame.
    pub fn render_tick(
        &self,
        stream: &dyn LiveStream,
        surface: &SharedSurface,
        overlay: &OverlayState,
        now: DateTime<Local>,
    ) -> TickOutcome {
        let Some(frame) = stream.current_frame() else {
            trace!("No decoded frame yet, skipping tick");
            return TickOutcome::Skipped;
        };

        let mut surface = lock_surface(surface);
        let (width, height) = surface.dimensions();
        surface.draw_frame(&frame, width, height);

        let Some(lines) = overlay.lines(now) else {
            return TickOutcome::Composited { overlay_lines: 0 };
        };

        let mut y = FIRST_BASELINE_Y;
        for text in lines.iter() {
            surface.draw_text(&TextLine {
                text: text.clone(),
                x: TEXT_MARGIN_X,
                y,
                font_px: FONT_PX,
                color: TEXT_COLOR,
            });
            y += LINE_SPACING;
        }

        TickOutcome::Composited {
            overlay_lines: lines.len(),
        }
    }
}
