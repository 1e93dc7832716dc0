//! Cross-context shared state.
//!
//! Everything touched from more than one execution context is either a
//! single-word atomic or sits behind a `CriticalSectionRawMutex`
//! blocking mutex, so a foreground read-modify sequence can never
//! interleave with the beam-break or button paths.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Instant;

use pov_core::angle::{BeaconAngle, SampleQueue};
use pov_core::config::Config;
use pov_core::fsm::{RotorFsm, RotorState};
use pov_core::image::FrameBuffers;
use pov_core::timing::Micros;

/// µs between the two most recent beam breaks; 0 = no rotation
/// observed since the last reset.
pub static ROTATION_INTERVAL_US: AtomicU32 = AtomicU32::new(0);
/// Timestamp of the most recent beam break.
pub static LAST_BEAM_BREAK_US: AtomicU32 = AtomicU32::new(0);
/// Rotor state word published after every FSM step; decoded with the
/// fail-safe [`RotorState::from_raw`] wherever it is read back.
static ROTOR_STATE: AtomicU8 = AtomicU8::new(RotorState::MotorOff as u8);
/// Column cursor, reset to 0 by the beam-break handler.
pub static COLUMN_CURSOR: AtomicUsize = AtomicUsize::new(0);
/// Timestamp of the most recent beacon pulse.
pub static LAST_BEACON_PULSE_US: AtomicU32 = AtomicU32::new(0);
/// Set while the foreground loop drains the beacon queue. The column
/// emitter skips its push instead of waiting; pulses seen during a
/// drain are lost.
pub static BEACON_DRAINING: AtomicBool = AtomicBool::new(false);
/// Last battery reading in millivolts (no AtomicF32 on thumbv7em).
pub static BATTERY_MV: AtomicU32 = AtomicU32::new(0);

pub static FSM: Mutex<CriticalSectionRawMutex, RefCell<RotorFsm>> =
    Mutex::new(RefCell::new(RotorFsm::new(Config::DEFAULT)));

pub static FRAMES: Mutex<CriticalSectionRawMutex, RefCell<FrameBuffers>> =
    Mutex::new(RefCell::new(FrameBuffers::new()));

pub static BEACON_SAMPLES: Mutex<CriticalSectionRawMutex, RefCell<SampleQueue>> =
    Mutex::new(RefCell::new(SampleQueue::new()));

pub static BEACON_ANGLE: Mutex<CriticalSectionRawMutex, RefCell<BeaconAngle>> =
    Mutex::new(RefCell::new(BeaconAngle::new()));

/// Wrapping microsecond clock shared by every context.
pub fn now_micros() -> Micros {
    Instant::now().as_micros() as Micros
}

/// Full-width microsecond uptime for the wall clock, which must keep
/// counting long past the 71-minute range of [`now_micros`].
pub fn now_micros_u64() -> u64 {
    Instant::now().as_micros()
}

pub fn publish_state(state: RotorState) {
    ROTOR_STATE.store(state as u8, Ordering::Relaxed);
}

pub fn current_state() -> RotorState {
    RotorState::from_raw(ROTOR_STATE.load(Ordering::Relaxed))
}

pub fn battery_volts() -> f32 {
    BATTERY_MV.load(Ordering::Relaxed) as f32 / 1000.0
}
