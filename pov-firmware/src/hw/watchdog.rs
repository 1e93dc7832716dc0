//! Independent watchdog, the liveness backstop.
//!
//! 250 ms window; the foreground loop pets it every cycle. A missed
//! window resets the MCU unconditionally, with no software recovery
//! path. The early-warning report belongs to the external watchdog
//! collaborator.

use embassy_stm32::peripherals::IWDG;
use embassy_stm32::wdg::IndependentWatchdog;

use pov_core::hal::Watchdog;

const WATCHDOG_WINDOW_US: u32 = 250_000;

pub struct IwdgWatchdog {
    inner: IndependentWatchdog<'static, IWDG>,
}

impl IwdgWatchdog {
    pub fn new(peri: IWDG) -> Self {
        Self {
            inner: IndependentWatchdog::new(peri, WATCHDOG_WINDOW_US),
        }
    }
}

impl Watchdog for IwdgWatchdog {
    fn arm(&mut self) {
        defmt::info!("watchdog armed, {} ms window", WATCHDOG_WINDOW_US / 1000);
        self.inner.unleash();
    }

    fn pet(&mut self) {
        self.inner.pet();
    }
}
