//! Software column clock.
//!
//! A retunable tick source in place of a hardware compare-match
//! timer: the beam-break handler programs a tick rate, the column
//! emitter task paces itself on the stored period. Two atomics, so
//! retuning from interrupt context is a plain store.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use pov_core::hal::ColumnClock;

pub struct SoftColumnClock {
    period_us: AtomicU32,
    running: AtomicBool,
}

impl SoftColumnClock {
    pub const fn new() -> Self {
        Self {
            period_us: AtomicU32::new(0),
            running: AtomicBool::new(false),
        }
    }

    /// Current tick period, `None` while stopped.
    pub fn period_us(&self) -> Option<u32> {
        if self.running.load(Ordering::Relaxed) {
            Some(self.period_us.load(Ordering::Relaxed))
        } else {
            None
        }
    }
}

impl ColumnClock for SoftColumnClock {
    fn set_tick_rate(&self, hz: u32) {
        self.period_us
            .store(1_000_000 / hz.max(1), Ordering::Relaxed);
        self.running.store(true, Ordering::Relaxed);
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

pub static COLUMN_CLOCK: SoftColumnClock = SoftColumnClock::new();
