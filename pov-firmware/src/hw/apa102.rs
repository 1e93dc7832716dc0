//! APA102 LED column over SPI.
//!
//! One column is eight LEDs; a full refresh is a start frame, eight
//! 4-byte LED frames (global brightness + BGR) and an end frame. The
//! strip is shared between the column emitter and the hazard/blank
//! actuator paths, so it lives behind a blocking mutex.

use core::cell::RefCell;

use embassy_stm32::dma::NoDma;
use embassy_stm32::peripherals::SPI2;
use embassy_stm32::spi::Spi;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use pov_core::image::{Rgb, IMAGE_HEIGHT};

/// Full global-brightness field (0b111 + 5-bit current = max).
const LED_FRAME_HEADER: u8 = 0xE0 | 0x1F;
const FRAME_LEN: usize = 4 + IMAGE_HEIGHT * 4 + 4;

pub struct Apa102Strip {
    spi: Spi<'static, SPI2, NoDma, NoDma>,
}

impl Apa102Strip {
    pub fn new(spi: Spi<'static, SPI2, NoDma, NoDma>) -> Self {
        Self { spi }
    }

    /// Latch one column of pixels onto the strip, row 0 first.
    pub fn write_column(&mut self, column: &[Rgb; IMAGE_HEIGHT]) {
        let mut frame = [0u8; FRAME_LEN];
        for (i, px) in column.iter().enumerate() {
            let offset = 4 + i * 4;
            frame[offset] = LED_FRAME_HEADER;
            frame[offset + 1] = px.b;
            frame[offset + 2] = px.g;
            frame[offset + 3] = px.r;
        }
        frame[FRAME_LEN - 4..].fill(0xFF);
        // A failed transfer shows as one dim column; the next tick
        // rewrites it.
        let _ = self.spi.blocking_write(&frame);
    }

    pub fn write_solid(&mut self, color: Rgb) {
        self.write_column(&[color; IMAGE_HEIGHT]);
    }
}

static STRIP: Mutex<CriticalSectionRawMutex, RefCell<Option<Apa102Strip>>> =
    Mutex::new(RefCell::new(None));

/// Install the strip at boot, before any task runs.
pub fn install(strip: Apa102Strip) {
    STRIP.lock(|cell| {
        cell.borrow_mut().replace(strip);
    });
}

/// Run `f` with the strip. A no-op before [`install`].
pub fn with_strip(f: impl FnOnce(&mut Apa102Strip)) {
    STRIP.lock(|cell| {
        if let Some(strip) = cell.borrow_mut().as_mut() {
            f(strip);
        }
    });
}
