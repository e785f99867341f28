use packing_camera_core::platform::{OutputSurface, TextLine, VideoFrame};

use ab_glyph::{FontRef, PxScale};
use image::{
    Rgba, RgbaImage,
    imageops::{self, FilterType},
};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::warn;

/// Overlay typeface, bundled so every recording renders the same.
static OVERLAY_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

/// In-memory RGBA canvas the render loop draws into and the encoder samples.
///
/// Text is rasterized with the bundled monospace font over a darkened band,
/// so white overlay text stays legible on bright frames.
pub struct RgbaSurface {
    canvas: RgbaImage,
    font: Option<FontRef<'static>>,
}

impl RgbaSurface {
    /// Black canvas of `width` x `height`.
    pub fn new(width: u32, height: u32) -> Self {
        let font = FontRef::try_from_slice(OVERLAY_FONT)
            .inspect_err(|e| warn!(error = %e, "Overlay font unreadable, text drawn as bands only"))
            .ok();

        Self {
            canvas: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
            font,
        }
    }

    fn darken(&mut self, left: u32, top: u32, right: u32, bottom: u32) {
        let (width, height) = self.canvas.dimensions();

        for y in top.min(height)..bottom.min(height) {
            for x in left.min(width)..right.min(width) {
                let pixel = self.canvas.get_pixel_mut(x, y);
                for channel in pixel.0.iter_mut().take(3) {
                    *channel /= 2;
                }
            }
        }
    }
}

impl OutputSurface for RgbaSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn draw_frame(&mut self, frame: &VideoFrame, width: u32, height: u32) {
        let Some(source) = RgbaImage::from_raw(frame.width, frame.height, frame.data.to_vec())
        else {
            warn!(?frame, "Frame buffer does not match its dimensions, skipping");
            return;
        };

        let scaled = if source.dimensions() == (width, height) {
            source
        } else {
            imageops::resize(&source, width, height, FilterType::Triangle)
        };

        if scaled.dimensions() == self.canvas.dimensions() {
            self.canvas = scaled;
        } else {
            imageops::replace(&mut self.canvas, &scaled, 0, 0);
        }
    }

    fn draw_text(&mut self, line: &TextLine) {
        let scale = PxScale::from(line.font_px as f32);
        let top = line.y.saturating_sub(line.font_px);

        let band_width = match &self.font {
            Some(font) => text_size(scale, font, &line.text).0,
            None => (line.font_px / 2)
                .max(1)
                .saturating_mul(line.text.chars().count() as u32),
        };
        // Descenders sit a quarter of the font size below the baseline.
        let bottom = line.y.saturating_add(line.font_px / 4);
        self.darken(line.x, top, line.x.saturating_add(band_width), bottom);

        if let Some(font) = &self.font {
            draw_text_mut(
                &mut self.canvas,
                Rgba(line.color),
                i32::try_from(line.x).unwrap_or(i32::MAX),
                i32::try_from(top).unwrap_or(i32::MAX),
                scale,
                font,
                &line.text,
            );
        }
    }

    fn snapshot(&self) -> Vec<u8> {
        self.canvas.as_raw().clone()
    }
}
