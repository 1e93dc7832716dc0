//! Double-buffered 2-D image raster.
//!
//! The foreground loop renders into the staging buffer; the column
//! interrupt only ever reads the active buffer. The swap is a full
//! copy performed at the beam-break boundary (column cursor 0), so
//! the reader can never observe a frame mixing two renders.

/// Raster width in columns, one column per angular slice.
pub const IMAGE_WIDTH: usize = 125;
/// Raster height in rows, one row per LED on the column.
pub const IMAGE_HEIGHT: usize = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub struct ImageBuffer {
    pixels: [[Rgb; IMAGE_HEIGHT]; IMAGE_WIDTH],
}

impl ImageBuffer {
    pub const fn new() -> Self {
        Self {
            pixels: [[Rgb::BLACK; IMAGE_HEIGHT]; IMAGE_WIDTH],
        }
    }

    pub fn clear(&mut self) {
        self.fill(Rgb::BLACK);
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels = [[color; IMAGE_HEIGHT]; IMAGE_WIDTH];
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < IMAGE_WIDTH && y < IMAGE_HEIGHT {
            self.pixels[x][y] = color;
        }
    }

    /// Write with horizontal wraparound: text scrolling off the right
    /// edge re-enters from the left without a seam. This is the write
    /// primitive the external font renderer is specified against.
    pub fn set_wrapped(&mut self, x: i32, y: usize, color: Rgb) {
        let w = IMAGE_WIDTH as i32;
        let x = ((x % w) + w) % w;
        self.set(x as usize, y, color);
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.pixels[x % IMAGE_WIDTH][y % IMAGE_HEIGHT]
    }

    /// One angular slice, in row order.
    pub fn column(&self, x: usize) -> &[Rgb; IMAGE_HEIGHT] {
        &self.pixels[x % IMAGE_WIDTH]
    }
}

impl Default for ImageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Staging + active buffer pair with the "staging is new" flag.
pub struct FrameBuffers {
    staging: ImageBuffer,
    active: ImageBuffer,
    staging_new: bool,
}

impl FrameBuffers {
    pub const fn new() -> Self {
        Self {
            staging: ImageBuffer::new(),
            active: ImageBuffer::new(),
            staging_new: false,
        }
    }

    /// Staging buffer for the renderer. A render that lands before the
    /// previous frame was swapped simply overwrites it in place
    /// (last-render-wins; there is no frame queue).
    pub fn staging_mut(&mut self) -> &mut ImageBuffer {
        &mut self.staging
    }

    /// Mark the staging buffer as a complete frame, ready to swap.
    pub fn stage_complete(&mut self) {
        self.staging_new = true;
    }

    pub fn staging_is_new(&self) -> bool {
        self.staging_new
    }

    /// Copy staging into active and clear the flag. The only mutation
    /// path for the active buffer; called exclusively from the
    /// beam-break handler, with the column cursor at 0.
    ///
    /// Returns whether a swap happened.
    pub fn swap_if_staged(&mut self) -> bool {
        if !self.staging_new {
            return false;
        }
        self.active.pixels = self.staging.pixels;
        self.staging_new = false;
        true
    }

    pub fn active(&self) -> &ImageBuffer {
        &self.active
    }

    /// Blank what the viewer sees: both buffers, flag untouched.
    pub fn blank(&mut self) {
        self.staging.clear();
        self.active.clear();
    }
}

impl Default for FrameBuffers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(v: u8) -> Rgb {
        Rgb::new(v, v, v)
    }

    fn render_frame(frames: &mut FrameBuffers, v: u8) {
        frames.staging_mut().fill(solid(v));
        frames.stage_complete();
    }

    fn assert_uniform(image: &ImageBuffer, v: u8) {
        for x in 0..IMAGE_WIDTH {
            for y in 0..IMAGE_HEIGHT {
                assert_eq!(image.get(x, y), solid(v), "mixed frame at ({x},{y})");
            }
        }
    }

    #[test]
    fn swap_only_when_staged() {
        let mut frames = FrameBuffers::new();
        assert!(!frames.swap_if_staged());
        render_frame(&mut frames, 7);
        assert!(frames.swap_if_staged());
        assert!(!frames.staging_is_new());
        assert!(!frames.swap_if_staged()); // flag cleared by the swap
    }

    #[test]
    fn active_never_mixes_two_staged_frames() {
        let mut frames = FrameBuffers::new();
        // Pseudo-random interleaving of renders and beam breaks; the
        // active buffer must always be uniformly one frame.
        let mut rendered = 0u8;
        let mut shown = 0u8;
        let mut lcg = 0x2545_f491u32;
        for _ in 0..200 {
            lcg = lcg.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            if lcg & 1 == 0 {
                rendered = rendered.wrapping_add(1);
                render_frame(&mut frames, rendered);
            } else if frames.swap_if_staged() {
                shown = rendered;
            }
            assert_uniform(frames.active(), shown);
        }
    }

    #[test]
    fn last_render_wins_before_swap() {
        let mut frames = FrameBuffers::new();
        render_frame(&mut frames, 1);
        render_frame(&mut frames, 2); // overwrites frame 1 in place
        assert!(frames.swap_if_staged());
        assert_uniform(frames.active(), 2);
    }

    #[test]
    fn wrapped_writes_reenter_from_the_left() {
        let mut image = ImageBuffer::new();
        image.set_wrapped(IMAGE_WIDTH as i32 + 3, 2, solid(9));
        assert_eq!(image.get(3, 2), solid(9));
        image.set_wrapped(-1, 0, solid(5));
        assert_eq!(image.get(IMAGE_WIDTH - 1, 0), solid(5));
    }

    #[test]
    fn blank_clears_both_buffers() {
        let mut frames = FrameBuffers::new();
        render_frame(&mut frames, 3);
        frames.swap_if_staged();
        render_frame(&mut frames, 4);
        frames.blank();
        assert_uniform(frames.active(), 0);
        assert_eq!(frames.staging_mut().get(5, 5), Rgb::BLACK);
        // A swap after blanking shows black, not the stale frame.
        assert!(frames.swap_if_staged());
        assert_uniform(frames.active(), 0);
    }

    #[test]
    fn out_of_range_set_is_ignored() {
        let mut image = ImageBuffer::new();
        image.set(IMAGE_WIDTH, 0, solid(1));
        image.set(0, IMAGE_HEIGHT, solid(1));
        assert_eq!(image.get(0, 0), Rgb::BLACK);
    }
}
