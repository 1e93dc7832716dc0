//! Column emitter, paced by the software column clock.
//!
//! Each tick: sample the beacon input, write the active buffer's
//! current column to the LED strip, advance the cursor. The beacon
//! push is skipped while the foreground loop is draining the queue
//! (lossy on contention by design).

use core::sync::atomic::Ordering;

use embassy_executor::task;
use embassy_stm32::gpio::{AnyPin, Input};
use embassy_time::{Duration, Timer};

use pov_core::image::IMAGE_WIDTH;

use crate::hw::apa102::with_strip;
use crate::hw::column_clock::COLUMN_CLOCK;
use crate::shared;

/// Poll cadence while the clock is stopped.
const IDLE_POLL_MS: u64 = 2;

#[task]
pub async fn column_output_task(beacon_input: Input<'static, AnyPin>) {
    loop {
        let Some(period_us) = COLUMN_CLOCK.period_us() else {
            Timer::after(Duration::from_millis(IDLE_POLL_MS)).await;
            continue;
        };

        emit_column(&beacon_input);

        Timer::after(Duration::from_micros(period_us as u64)).await;
    }
}

fn emit_column(beacon_input: &Input<'static, AnyPin>) {
    let cursor = shared::COLUMN_CURSOR.load(Ordering::Relaxed);
    let column_index = cursor.min(IMAGE_WIDTH - 1);

    // Beacon is active-low while the emitter faces it.
    if beacon_input.is_low() && !shared::BEACON_DRAINING.load(Ordering::Acquire) {
        shared::LAST_BEACON_PULSE_US.store(shared::now_micros(), Ordering::Relaxed);
        shared::BEACON_SAMPLES.lock(|queue| {
            queue.borrow_mut().push(column_index as u16);
        });
    }

    let column = shared::FRAMES.lock(|frames| *frames.borrow().active().column(column_index));
    with_strip(|strip| strip.write_column(&column));

    shared::COLUMN_CURSOR.store(cursor + 1, Ordering::Relaxed);
}
