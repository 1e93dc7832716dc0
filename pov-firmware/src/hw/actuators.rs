//! Peripheral-backed actuators.
//!
//! Motor drive is a 20 kHz PWM duty cycle mapped from the FSM's 0–255
//! level; the audible cues retune a second PWM timer to the cue
//! frequency at 50% duty; the hazard pattern and display blanking go
//! through the shared LED strip.

use embassy_stm32::gpio::{AnyPin, Output};
use embassy_stm32::peripherals::{TIM3, TIM4};
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_stm32::timer::Channel;

use pov_core::fsm::Tone;
use pov_core::hal::Actuators;
use pov_core::image::Rgb;

use crate::hw::apa102::with_strip;

const HAZARD_COLOR: Rgb = Rgb::new(255, 100, 0);

pub struct HwActuators {
    motor: SimplePwm<'static, TIM3>,
    tone: SimplePwm<'static, TIM4>,
    status_led: Output<'static, AnyPin>,
    hazard_lit: bool,
}

impl HwActuators {
    pub fn new(
        mut motor: SimplePwm<'static, TIM3>,
        tone: SimplePwm<'static, TIM4>,
        status_led: Output<'static, AnyPin>,
    ) -> Self {
        motor.set_duty(Channel::Ch1, 0);
        motor.enable(Channel::Ch1);
        // The tone channel stays disabled until a cue plays.
        Self {
            motor,
            tone,
            status_led,
            hazard_lit: false,
        }
    }
}

impl Actuators for HwActuators {
    fn drive_motor(&mut self, level: u8) {
        let max = self.motor.get_max_duty() as u32;
        self.motor
            .set_duty(Channel::Ch1, (max * level as u32 / 255) as u16);
    }

    fn play_tone(&mut self, tone: Tone) {
        self.tone.set_frequency(Hertz(tone.frequency_hz()));
        let half = self.tone.get_max_duty() / 2;
        self.tone.set_duty(Channel::Ch1, half);
        self.tone.enable(Channel::Ch1);
    }

    fn silence_tone(&mut self) {
        self.tone.disable(Channel::Ch1);
    }

    fn status_led_off(&mut self) {
        self.status_led.set_low();
    }

    fn status_led_toggle(&mut self) {
        self.status_led.toggle();
    }

    fn hazard_blink(&mut self) {
        self.hazard_lit = !self.hazard_lit;
        let color = if self.hazard_lit {
            HAZARD_COLOR
        } else {
            Rgb::BLACK
        };
        with_strip(|strip| strip.write_solid(color));
    }

    fn blank_display(&mut self) {
        with_strip(|strip| strip.write_solid(Rgb::BLACK));
    }
}
