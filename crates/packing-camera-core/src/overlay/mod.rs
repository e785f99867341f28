mod compositor;
mod render_loop;
mod state;

#[cfg(test)]
pub(crate) use compositor::{FIRST_BASELINE_Y, FONT_PX, LINE_SPACING, TEXT_MARGIN_X};

pub use {
    compositor::{Compositor, TickOutcome},
    render_loop::{RenderLoop, RenderStats},
    state::OverlayState,
};
