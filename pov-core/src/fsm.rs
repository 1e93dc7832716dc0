//! Rotor state machine.
//!
//! The FSM is the single authority over motor drive: it consumes an
//! immutable [`FsmInput`] snapshot and returns a [`Commands`] value
//! describing every actuator effect of the transition. It performs no
//! I/O itself, which is what lets the whole transition table run as
//! host unit tests against a recording actuator fake.

use crate::config::Config;
use crate::pid::Pid;
use crate::timing::{elapsed, Micros};

/// Rotor lifecycle state. Exactly one value is live at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RotorState {
    MotorOff = 1,
    Wait = 2,
    SpinningUp = 3,
    Running = 4,
    SpinningDown = 5,
}

impl RotorState {
    /// Decode a state word published across execution contexts.
    ///
    /// Anything unrecognized fails toward `SpinningDown` so a corrupt
    /// word can never leave the actuators in an undefined state.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::MotorOff,
            2 => Self::Wait,
            3 => Self::SpinningUp,
            4 => Self::Running,
            5 => Self::SpinningDown,
            _ => Self::SpinningDown,
        }
    }
}

/// Immutable per-invocation input snapshot.
///
/// Built fresh by the caller (inside a critical section) before every
/// FSM step; never mutated afterwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsmInput {
    pub now: Micros,
    pub start_button: bool,
    pub stop_button: bool,
    /// µs between the two most recent beam breaks; 0 while no rotation
    /// has been observed since the last reset.
    pub rotation_interval_us: u32,
    pub last_beam_break: Micros,
    pub battery_volts: f32,
}

/// Audible cue per state transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tone {
    Wait,
    SpinUp,
    SpinDown,
}

impl Tone {
    pub fn frequency_hz(self) -> u32 {
        match self {
            Tone::Wait => 880,
            Tone::SpinUp => 1320,
            Tone::SpinDown => 1000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotorCommand {
    Off,
    Drive(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToneCommand {
    Silence,
    Play(Tone),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLedCommand {
    Off,
    Toggle,
}

/// Actuator effects of one FSM step.
///
/// `None` / `false` means "leave unchanged": tones and indicator
/// changes are edge-triggered, so a step that stays in state must not
/// re-issue them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Commands {
    pub motor: Option<MotorCommand>,
    pub tone: Option<ToneCommand>,
    pub status_led: Option<StatusLedCommand>,
    pub hazard_blink: bool,
    pub stop_column_clock: bool,
    pub blank_display: bool,
    /// Clear the measured rotation interval (entering spin-up).
    pub reset_rotation: bool,
    /// Drop queued beacon samples and forget the current angle
    /// (entering closed-loop running).
    pub clear_angle_samples: bool,
}

/// The rotor FSM. Owns its state, its start-of-phase timestamp and the
/// speed PID; the state is mutated only by [`RotorFsm::step`].
pub struct RotorFsm {
    state: RotorState,
    phase_started_at: Micros,
    pid: Pid,
    cfg: Config,
}

impl RotorFsm {
    pub const fn new(cfg: Config) -> Self {
        Self {
            state: RotorState::MotorOff,
            phase_started_at: 0,
            pid: Pid::new(cfg.pid, cfg.speed_unit_shift),
            cfg,
        }
    }

    pub fn state(&self) -> RotorState {
        self.state
    }

    /// Run one transition of the table and return its actuator effects.
    ///
    /// Total over all states and inputs: every branch assigns a state
    /// from the defined set and a fixed command set.
    pub fn step(&mut self, input: &FsmInput) -> Commands {
        let mut cmd = Commands::default();

        self.state = match self.state {
            RotorState::MotorOff => {
                if input.start_button {
                    self.phase_started_at = input.now;
                    cmd.tone = Some(ToneCommand::Play(Tone::Wait));
                    cmd.status_led = Some(StatusLedCommand::Off);
                    RotorState::Wait
                } else {
                    cmd.status_led = Some(StatusLedCommand::Toggle);
                    RotorState::MotorOff
                }
            }

            RotorState::Wait => {
                if input.stop_button {
                    cmd.tone = Some(ToneCommand::Silence);
                    RotorState::MotorOff
                } else if elapsed(input.now, self.phase_started_at) > self.cfg.wait_interval_us {
                    cmd.tone = Some(ToneCommand::Play(Tone::SpinUp));
                    cmd.reset_rotation = true;
                    self.phase_started_at = input.now;
                    RotorState::SpinningUp
                } else {
                    cmd.hazard_blink = true;
                    RotorState::Wait
                }
            }

            RotorState::SpinningUp => {
                if input.stop_button {
                    cmd.motor = Some(MotorCommand::Off);
                    cmd.tone = Some(ToneCommand::Play(Tone::SpinDown));
                    RotorState::SpinningDown
                } else if input.rotation_interval_us != 0
                    && input.rotation_interval_us <= self.cfg.target_period_us()
                {
                    cmd.tone = Some(ToneCommand::Silence);
                    cmd.clear_angle_samples = true;
                    self.pid.reset(input.now);
                    RotorState::Running
                } else if elapsed(input.now, self.phase_started_at) > self.cfg.spinup_timeout_us {
                    cmd.motor = Some(MotorCommand::Off);
                    cmd.tone = Some(ToneCommand::Play(Tone::SpinDown));
                    RotorState::SpinningDown
                } else {
                    cmd.hazard_blink = true;
                    cmd.motor = Some(MotorCommand::Drive(self.ramp_level(input.now)));
                    RotorState::SpinningUp
                }
            }

            RotorState::Running => {
                let stalled = elapsed(input.now, input.last_beam_break) > self.cfg.too_slow_interval_us;
                // interval 0 is caught by the under-period test below,
                // so the speed division in the else branch is always
                // defined.
                if input.stop_button
                    || stalled
                    || input.rotation_interval_us > self.cfg.too_slow_interval_us
                    || input.rotation_interval_us < self.cfg.too_fast_interval_us
                    || input.battery_volts < self.cfg.battery_low_volts
                {
                    cmd.stop_column_clock = true;
                    cmd.motor = Some(MotorCommand::Off);
                    cmd.tone = Some(ToneCommand::Play(Tone::SpinDown));
                    cmd.blank_display = true;
                    RotorState::SpinningDown
                } else {
                    let scale = 1i64 << self.cfg.speed_unit_shift;
                    let speed = (1_000_000 * scale / input.rotation_interval_us as i64) as i32;
                    let drive = self.pid.calculate(self.cfg.speed_setpoint, speed, input.now);
                    cmd.motor = Some(MotorCommand::Drive(drive as u8));
                    RotorState::Running
                }
            }

            RotorState::SpinningDown => {
                if elapsed(input.now, input.last_beam_break) > self.cfg.spin_down_time_us {
                    cmd.tone = Some(ToneCommand::Silence);
                    cmd.blank_display = true;
                    RotorState::MotorOff
                } else {
                    cmd.hazard_blink = true;
                    RotorState::SpinningDown
                }
            }
        };

        cmd
    }

    /// Open-loop spin-up ramp: one drive level per `spinup_divider_us`,
    /// clamped to the full PWM range.
    fn ramp_level(&self, now: Micros) -> u8 {
        (elapsed(now, self.phase_started_at) / self.cfg.spinup_divider_us).min(255) as u8
    }
}
