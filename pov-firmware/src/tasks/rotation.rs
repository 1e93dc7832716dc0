//! Beam-break handler — the rotation timer synchronizer.
//!
//! Fires once per physical rotation. Measures the rotation interval,
//! resets the column cursor, swaps the image buffers at this (and only
//! this) boundary, and re-derives the column tick rate so exactly one
//! image width is painted per rotation however fast the rotor actually
//! turns. A fixed-rate column clock would drift against the rotor
//! during spin-up and under load.

use core::sync::atomic::Ordering;

use embassy_executor::task;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::peripherals::PB4;

use pov_core::config::Config;
use pov_core::fsm::RotorState;
use pov_core::hal::ColumnClock;
use pov_core::image::IMAGE_WIDTH;
use pov_core::timing::column_tick_rate;

use crate::hw::column_clock::COLUMN_CLOCK;
use crate::shared;

#[task]
pub async fn beam_break_task(mut sensor: ExtiInput<'static, PB4>) {
    loop {
        sensor.wait_for_falling_edge().await;

        let now = shared::now_micros();
        let interval = now.wrapping_sub(shared::LAST_BEAM_BREAK_US.load(Ordering::Relaxed));
        shared::ROTATION_INTERVAL_US.store(interval, Ordering::Relaxed);
        shared::LAST_BEAM_BREAK_US.store(now, Ordering::Relaxed);
        shared::COLUMN_CURSOR.store(0, Ordering::Relaxed);

        if shared::current_state() != RotorState::Running {
            continue;
        }

        // Cursor is at 0 and the emitter starts a fresh sweep, so the
        // copy can never be observed half done.
        shared::FRAMES.lock(|frames| {
            frames.borrow_mut().swap_if_staged();
        });

        match column_tick_rate(
            IMAGE_WIDTH as u32,
            interval,
            Config::DEFAULT.min_column_rate_hz,
        ) {
            Some(rate) => COLUMN_CLOCK.set_tick_rate(rate),
            None => COLUMN_CLOCK.stop(),
        }
    }
}
