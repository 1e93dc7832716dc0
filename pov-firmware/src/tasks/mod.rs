pub mod buttons;
pub mod column;
pub mod foreground;
pub mod rotation;

use core::cell::RefCell;
use core::sync::atomic::Ordering;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use pov_core::fsm::FsmInput;
use pov_core::hal;

use crate::hw::actuators::HwActuators;
use crate::hw::column_clock::COLUMN_CLOCK;
use crate::shared;

pub type ActuatorsShared = Mutex<CriticalSectionRawMutex, RefCell<HwActuators>>;

/// Run one FSM step and apply its effects.
///
/// The input snapshot is assembled and consumed inside a single
/// critical section (the FSM mutex), so the beam-break and button
/// paths cannot interleave with it. Called from the foreground loop
/// (buttons false) and synchronously from the button tasks — a press
/// reacts immediately instead of waiting for the next foreground
/// cycle.
pub fn step_fsm(start_button: bool, stop_button: bool, actuators: &ActuatorsShared) {
    let (commands, prev, state) = shared::FSM.lock(|fsm| {
        let mut fsm = fsm.borrow_mut();
        let input = FsmInput {
            now: shared::now_micros(),
            start_button,
            stop_button,
            rotation_interval_us: shared::ROTATION_INTERVAL_US.load(Ordering::Relaxed),
            last_beam_break: shared::LAST_BEAM_BREAK_US.load(Ordering::Relaxed),
            battery_volts: shared::battery_volts(),
        };
        let prev = fsm.state();
        let commands = fsm.step(&input);
        (commands, prev, fsm.state())
    });

    shared::publish_state(state);
    if state != prev {
        defmt::info!("rotor {} -> {}", prev, state);
    }

    if commands.reset_rotation {
        shared::ROTATION_INTERVAL_US.store(0, Ordering::Relaxed);
    }
    if commands.clear_angle_samples {
        shared::BEACON_SAMPLES.lock(|queue| queue.borrow_mut().clear());
        shared::BEACON_ANGLE.lock(|beacon| beacon.borrow_mut().forget());
    }
    if commands.blank_display {
        // Drop the buffered frame too, so a restart shows black until
        // the first fresh render lands.
        shared::FRAMES.lock(|frames| frames.borrow_mut().blank());
    }
    if commands.stop_column_clock {
        defmt::warn!("interlock trip, column clock stopped");
    }

    actuators.lock(|actuators| {
        hal::apply(&commands, &mut *actuators.borrow_mut(), &COLUMN_CLOCK);
    });
}
