//! Foreground loop.
//!
//! Every 100 ms: sample the battery, step the FSM from a consistent
//! snapshot, fold the beacon queue into an angle estimate once the
//! beacon has gone quiet, render the next frame into staging and pet
//! the watchdog. Rendering never touches the active buffer; the
//! beam-break handler owns that handoff.

use core::sync::atomic::Ordering;

use embassy_executor::task;
use embassy_stm32::adc::Adc;
use embassy_stm32::peripherals::{ADC1, PA1};
use embassy_time::{Duration, Ticker};

use pov_core::angle;
use pov_core::clock::LocalClock;
use pov_core::config::Config;
use pov_core::hal::Watchdog;
use pov_core::image::IMAGE_WIDTH;
use pov_core::timing::elapsed;

use crate::hw::watchdog::IwdgWatchdog;
use crate::render::{compose, NullPainter};
use crate::shared;
use crate::tasks::{step_fsm, ActuatorsShared};

/// Volts per ADC count — calibration of the battery sense divider.
const BATTERY_VOLTS_PER_COUNT: f32 = 0.01;

const FOREGROUND_PERIOD_MS: u64 = 100;

#[task]
pub async fn foreground_task(
    mut adc: Adc<'static, ADC1>,
    mut battery_pin: PA1,
    actuators: &'static ActuatorsShared,
    wall_clock: LocalClock,
    mut watchdog: IwdgWatchdog,
) {
    let cfg = Config::DEFAULT;
    let mut painter = NullPainter;
    let mut ticker = Ticker::every(Duration::from_millis(FOREGROUND_PERIOD_MS));

    loop {
        let raw = adc.read(&mut battery_pin);
        let volts = raw as f32 * BATTERY_VOLTS_PER_COUNT;
        shared::BATTERY_MV.store((volts * 1000.0) as u32, Ordering::Relaxed);

        step_fsm(false, false, actuators);

        update_beacon_angle(&cfg);
        render_frame(&wall_clock, &mut painter, &cfg);

        watchdog.pet();
        ticker.next().await;
    }
}

/// Fold queued beacon pulses into an angle once the burst is over.
///
/// The draining flag makes the column emitter skip pushes for the few
/// microseconds the queue is held; those pulses are lost, which is the
/// accepted lossy-sampling policy.
fn update_beacon_angle(cfg: &Config) {
    let now = shared::now_micros();
    let last_pulse = shared::LAST_BEACON_PULSE_US.load(Ordering::Relaxed);
    if elapsed(now, last_pulse) <= cfg.beacon_quiet_window_us {
        return;
    }

    shared::BEACON_DRAINING.store(true, Ordering::Release);
    let estimate = shared::BEACON_SAMPLES.lock(|queue| {
        angle::estimate(&mut queue.borrow_mut(), IMAGE_WIDTH as u16)
    });
    shared::BEACON_DRAINING.store(false, Ordering::Release);

    if let Some(column) = estimate {
        shared::BEACON_ANGLE.lock(|beacon| beacon.borrow_mut().update(column, last_pulse));
    }
}

fn render_frame(wall_clock: &LocalClock, painter: &mut NullPainter, cfg: &Config) {
    let now = shared::now_micros();
    let time_text = wall_clock.now(shared::now_micros_u64()).render();
    let beacon_angle =
        shared::BEACON_ANGLE.lock(|beacon| beacon.borrow().current(now, cfg.beacon_stale_us));

    shared::FRAMES.lock(|frames| {
        let mut frames = frames.borrow_mut();
        compose(
            frames.staging_mut(),
            painter,
            time_text.as_str(),
            now,
            beacon_angle,
        );
        frames.stage_complete();
    });
}
