//! Narrow hardware capability traits.
//!
//! The control core depends only on these interfaces; the firmware
//! provides peripheral-backed implementations and the tests provide
//! recording fakes. Register-level programming never leaks above this
//! boundary.

use crate::fsm::{Commands, MotorCommand, StatusLedCommand, Tone, ToneCommand};
use crate::image::{ImageBuffer, Rgb};

/// Physical outputs the FSM commands: motor drive, piezo tone, status
/// LED and the hazard/display surface.
pub trait Actuators {
    /// Motor drive level, 0–255.
    fn drive_motor(&mut self, level: u8);
    fn play_tone(&mut self, tone: Tone);
    fn silence_tone(&mut self);
    fn status_led_off(&mut self);
    fn status_led_toggle(&mut self);
    /// One step of the blinking hazard pattern on the LED column.
    fn hazard_blink(&mut self);
    /// Immediately blank the visible display.
    fn blank_display(&mut self);
}

/// The retunable clock driving the column-output interrupt.
pub trait ColumnClock {
    fn set_tick_rate(&self, hz: u32);
    /// Stop emitting ticks. Idempotent: safe when already stopped.
    fn stop(&self);
}

/// Liveness backstop. `pet` must be called at least once per the
/// configured window or the system resets unconditionally.
pub trait Watchdog {
    fn arm(&mut self);
    fn pet(&mut self);
}

/// The excluded bitmap-font collaborator, at its interface. Writes
/// must wrap horizontally (see [`ImageBuffer::set_wrapped`]).
pub trait TextPainter {
    fn draw_text(&mut self, image: &mut ImageBuffer, text: &str, x: i32, fg: Rgb, bg: Rgb);
}

/// Route one FSM command set to the actuators and column clock.
///
/// The shared-state effects (`reset_rotation`, `clear_angle_samples`)
/// are left to the caller, which owns that state.
pub fn apply(cmd: &Commands, actuators: &mut impl Actuators, column_clock: &impl ColumnClock) {
    if cmd.stop_column_clock {
        column_clock.stop();
    }
    match cmd.motor {
        Some(MotorCommand::Off) => actuators.drive_motor(0),
        Some(MotorCommand::Drive(level)) => actuators.drive_motor(level),
        None => {}
    }
    match cmd.tone {
        Some(ToneCommand::Play(tone)) => actuators.play_tone(tone),
        Some(ToneCommand::Silence) => actuators.silence_tone(),
        None => {}
    }
    match cmd.status_led {
        Some(StatusLedCommand::Off) => actuators.status_led_off(),
        Some(StatusLedCommand::Toggle) => actuators.status_led_toggle(),
        None => {}
    }
    if cmd.hazard_blink {
        actuators.hazard_blink();
    }
    if cmd.blank_display {
        actuators.blank_display();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[derive(Default)]
    struct RecordingActuators {
        motor: Option<u8>,
        tone: Option<Option<Tone>>,
        status_led: Option<StatusLedCommand>,
        hazard_blinks: u32,
        display_blanked: bool,
    }

    impl Actuators for RecordingActuators {
        fn drive_motor(&mut self, level: u8) {
            self.motor = Some(level);
        }
        fn play_tone(&mut self, tone: Tone) {
            self.tone = Some(Some(tone));
        }
        fn silence_tone(&mut self) {
            self.tone = Some(None);
        }
        fn status_led_off(&mut self) {
            self.status_led = Some(StatusLedCommand::Off);
        }
        fn status_led_toggle(&mut self) {
            self.status_led = Some(StatusLedCommand::Toggle);
        }
        fn hazard_blink(&mut self) {
            self.hazard_blinks += 1;
        }
        fn blank_display(&mut self) {
            self.display_blanked = true;
        }
    }

    #[derive(Default)]
    struct RecordingClock {
        stops: Cell<u32>,
        rate: Cell<Option<u32>>,
    }

    impl ColumnClock for RecordingClock {
        fn set_tick_rate(&self, hz: u32) {
            self.rate.set(Some(hz));
        }
        fn stop(&self) {
            self.stops.set(self.stops.get() + 1);
        }
    }

    #[test]
    fn interlock_commands_reach_every_actuator() {
        let cmd = Commands {
            motor: Some(MotorCommand::Off),
            tone: Some(ToneCommand::Play(Tone::SpinDown)),
            stop_column_clock: true,
            blank_display: true,
            ..Default::default()
        };
        let mut actuators = RecordingActuators::default();
        let clock = RecordingClock::default();
        apply(&cmd, &mut actuators, &clock);

        assert_eq!(actuators.motor, Some(0));
        assert_eq!(actuators.tone, Some(Some(Tone::SpinDown)));
        assert!(actuators.display_blanked);
        assert_eq!(clock.stops.get(), 1);
        assert_eq!(clock.rate.get(), None);
    }

    #[test]
    fn empty_commands_touch_nothing() {
        let mut actuators = RecordingActuators::default();
        let clock = RecordingClock::default();
        apply(&Commands::default(), &mut actuators, &clock);

        assert_eq!(actuators.motor, None);
        assert_eq!(actuators.tone, None);
        assert_eq!(actuators.status_led, None);
        assert_eq!(actuators.hazard_blinks, 0);
        assert!(!actuators.display_blanked);
        assert_eq!(clock.stops.get(), 0);
    }

    #[test]
    fn stopping_twice_is_idempotent_for_the_caller() {
        let cmd = Commands {
            stop_column_clock: true,
            ..Default::default()
        };
        let mut actuators = RecordingActuators::default();
        let clock = RecordingClock::default();
        apply(&cmd, &mut actuators, &clock);
        apply(&cmd, &mut actuators, &clock);
        assert_eq!(clock.stops.get(), 2); // implementations must tolerate this
    }

    #[test]
    fn tone_frequencies_match_the_cues() {
        assert_eq!(Tone::Wait.frequency_hz(), 880);
        assert_eq!(Tone::SpinUp.frequency_hz(), 1320);
        assert_eq!(Tone::SpinDown.frequency_hz(), 1000);
    }
}
