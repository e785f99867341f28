use crate::platform::RgbaSurface;

use packing_camera_core::platform::{OutputSurface, TextLine, VideoFrame};

fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> VideoFrame {
    let data: Vec<u8> = rgba
        .iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect();
    VideoFrame {
        sequence: 0,
        width,
        height,
        data: data.into(),
    }
}

fn pixel(snapshot: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [snapshot[i], snapshot[i + 1], snapshot[i + 2], snapshot[i + 3]]
}

/// WHAT: A small frame is scaled to fill the whole surface
/// WHY: The encoder records the surface, not the sensor resolution
#[test]
fn given_small_frame_when_drawing_then_surface_filled() {
    // Given: A 40x30 surface and a 4x3 red frame
    let mut surface = RgbaSurface::new(40, 30);
    let frame = solid_frame(4, 3, [200, 0, 0, 255]);

    // When: Drawing at surface size
    surface.draw_frame(&frame, 40, 30);

    // Then: Corners are red (resampling may round by one step)
    let snapshot = surface.snapshot();
    assert_eq!(snapshot.len(), 40 * 30 * 4);
    for (x, y) in [(0, 0), (39, 29)] {
        let [r, g, b, a] = pixel(&snapshot, 40, x, y);
        assert!(r.abs_diff(200) <= 1 && g <= 1 && b <= 1 && a >= 254);
    }
}

fn order_line(text: &str) -> TextLine {
    TextLine {
        text: text.to_string(),
        x: 10,
        y: 30,
        font_px: 20,
        color: [255, 255, 255, 255],
    }
}

fn count_in(
    snapshot: &[u8],
    width: u32,
    area: (u32, u32, u32, u32),
    test: impl Fn([u8; 4]) -> bool,
) -> usize {
    let (left, top, right, bottom) = area;
    (top..bottom)
        .flat_map(|y| (left..right).map(move |x| (x, y)))
        .filter(|&(x, y)| test(pixel(snapshot, width, x, y)))
        .count()
}

/// WHAT: Overlay text is rasterized in white over a darkened band
/// WHY: The order code must be readable in the recording itself
#[test]
fn given_bright_frame_when_drawing_text_then_glyphs_over_darkened_band() {
    // Given: A white frame
    let mut surface = RgbaSurface::new(100, 50);
    surface.draw_frame(&solid_frame(100, 50, [255, 255, 255, 255]), 100, 50);

    // When: Drawing "Order: 1" at (10, 30), 20 px
    surface.draw_text(&order_line("Order: 1"));

    // Then: Band darkened, glyph pixels bright, outside untouched
    let snapshot = surface.snapshot();
    let band = (10, 10, 60, 30);
    assert!(count_in(&snapshot, 100, band, |p| p == [127, 127, 127, 255]) > 0);
    assert!(count_in(&snapshot, 100, band, |p| p[0] > 200) > 0);
    assert_eq!(pixel(&snapshot, 100, 5, 20), [255, 255, 255, 255]);
    assert_eq!(pixel(&snapshot, 100, 12, 45), [255, 255, 255, 255]);
}

/// WHAT: Text on a black frame lights up pixels in the overlay region
/// WHY: A darkened band alone would leave a black frame unchanged
#[test]
fn given_black_frame_when_drawing_order_code_then_overlay_region_changes() {
    // Given: A black frame
    let mut surface = RgbaSurface::new(200, 50);
    surface.draw_frame(&solid_frame(200, 50, [0, 0, 0, 255]), 200, 50);
    let before = surface.snapshot();

    // When: Drawing the order line
    surface.draw_text(&order_line("Order: ORD1"));

    // Then: Glyph pixels in the text area differ from the frame
    let after = surface.snapshot();
    let area = (10, 10, 200, 35);
    assert_eq!(count_in(&before, 200, area, |p| p[0] > 0), 0);
    assert!(count_in(&after, 200, area, |p| p[0] > 128) > 10);
}

/// WHAT: Drawing a new frame replaces the previous overlay
/// WHY: Each tick draws its own overlay with a fresh timestamp
#[test]
fn given_text_when_next_frame_drawn_then_text_gone() {
    // Given: A black surface with one text line
    let mut surface = RgbaSurface::new(100, 50);
    let frame = solid_frame(100, 50, [0, 0, 0, 255]);
    surface.draw_frame(&frame, 100, 50);
    surface.draw_text(&order_line("Order: 1"));

    // When: Drawing the next frame
    surface.draw_frame(&frame, 100, 50);

    // Then: Every pixel black again
    let snapshot = surface.snapshot();
    let lit = count_in(&snapshot, 100, (0, 0, 100, 50), |p| p != [0, 0, 0, 255]);
    assert_eq!(lit, 0);
}

/// WHAT: Text outside the canvas is clipped, not a crash
/// WHY: Long product names run past the right edge
#[test]
fn given_text_past_edge_when_drawing_then_clipped() {
    // Given: A tiny surface
    let mut surface = RgbaSurface::new(10, 10);

    // When: Drawing a long line below the bottom edge
    surface.draw_text(&TextLine {
        text: "a very long product name".to_string(),
        x: 8,
        y: 40,
        font_px: 20,
        color: [255, 255, 255, 255],
    });

    // Then: Surface intact
    assert_eq!(surface.snapshot().len(), 10 * 10 * 4);
}

/// WHAT: A frame whose buffer doesn't match its size is skipped
/// WHY: A corrupt frame must not take down the render loop
#[test]
fn given_truncated_frame_when_drawing_then_surface_unchanged() {
    // Given: A frame claiming 4x4 with 2 pixels of data
    let mut surface = RgbaSurface::new(4, 4);
    let frame = VideoFrame {
        sequence: 0,
        width: 4,
        height: 4,
        data: vec![255u8; 8].into(),
    };

    // When: Drawing
    surface.draw_frame(&frame, 4, 4);

    // Then: Still black
    assert_eq!(pixel(&surface.snapshot(), 4, 0, 0), [0, 0, 0, 255]);
}
