//! Frame composition for the staging buffer.
//!
//! Each foreground cycle re-renders the whole frame: the wall-clock
//! text slowly orbiting the display, plus a marker column at the
//! estimated beacon angle while it is fresh. Glyph rasterization is
//! the external font collaborator's job; [`NullPainter`] is its
//! integration point.

use pov_core::hal::TextPainter;
use pov_core::image::{ImageBuffer, Rgb, IMAGE_HEIGHT};

const TEXT_COLOR: Rgb = Rgb::new(145, 145, 145);
const MARKER_COLOR: Rgb = Rgb::new(0, 180, 60);
/// Text drifts one column every 60 ms, one full lap in ~7.5 s.
const SCROLL_US_PER_COLUMN: u32 = 60_000;

/// Placeholder for the external bitmap-font renderer. Swap in the real
/// collaborator to see glyphs; everything else (scroll position,
/// wraparound writes, colors) is already wired through.
pub struct NullPainter;

impl TextPainter for NullPainter {
    fn draw_text(&mut self, _image: &mut ImageBuffer, _text: &str, _x: i32, _fg: Rgb, _bg: Rgb) {}
}

/// Render one frame into `staging`. Pure pixel writes; the caller owns
/// the buffer handoff.
pub fn compose(
    staging: &mut ImageBuffer,
    painter: &mut impl TextPainter,
    time_text: &str,
    now_us: u32,
    beacon_angle: Option<u16>,
) {
    staging.clear();

    let scroll = (now_us / SCROLL_US_PER_COLUMN) as i32;
    painter.draw_text(staging, time_text, -scroll, TEXT_COLOR, Rgb::BLACK);

    if let Some(column) = beacon_angle {
        for y in 0..IMAGE_HEIGHT {
            staging.set(column as usize, y, MARKER_COLOR);
        }
    }
}
