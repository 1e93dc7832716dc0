//! Fixed-point PID speed regulator.
//!
//! All arithmetic is 32-bit integer with 64-bit intermediates; the
//! output is divided by `1 << out_shift` so gains can be expressed in
//! the same fixed-point base as the speed setpoint. No floats, so the
//! loop is deterministic across runs.

use crate::config::PidGains;
use crate::timing::{elapsed, Micros};

pub struct Pid {
    gains: PidGains,
    out_shift: u8,

    sum_error: i32,
    last_error: i32,
    last_update: Micros,
}

impl Pid {
    pub const fn new(gains: PidGains, out_shift: u8) -> Self {
        Self {
            gains,
            out_shift,
            sum_error: 0,
            last_error: 0,
            last_update: 0,
        }
    }

    /// Re-anchor the controller clock without touching the integral.
    ///
    /// Call before the first `calculate` after a pause, otherwise the
    /// first dt spans the whole pause and the integral jumps.
    pub fn initialize_time(&mut self, now: Micros) {
        self.last_update = now;
    }

    /// Full restart: integral and error history cleared, clock
    /// re-anchored. Used whenever closed-loop control begins.
    pub fn reset(&mut self, now: Micros) {
        self.sum_error = 0;
        self.last_error = 0;
        self.initialize_time(now);
    }

    /// Run one PID update and return the clamped output.
    ///
    /// dt is floored at 1 µs: a `calculate` in the same microsecond as
    /// the anchor sees dt = 1, which keeps the derivative division
    /// defined and contributes nothing measurable to the integral.
    pub fn calculate(&mut self, setpoint: i32, measured: i32, now: Micros) -> i32 {
        let dt = elapsed(now, self.last_update).max(1) as i64;
        self.last_update = now;

        let error = setpoint - measured;

        let scale = 1i64 << self.out_shift;
        self.sum_error = (self.sum_error as i64 + self.gains.i as i64 * error as i64 * dt / 1_000_000)
            .clamp(-self.windup_limit(), self.windup_limit()) as i32;

        let mut output = self.gains.p as i64 * error as i64
            + self.sum_error as i64
            + self.gains.d as i64 * (error - self.last_error) as i64 / dt;
        output += self.gains.k as i64 + self.gains.f as i64 * setpoint as i64;

        self.last_error = error;

        ((output / scale) as i32).clamp(self.gains.out_low, self.gains.out_high)
    }

    /// Anti-windup bound: ± scale·(high−low)/2.
    fn windup_limit(&self) -> i64 {
        (1i64 << self.out_shift) * (self.gains.out_high - self.gains.out_low) as i64 / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn reference_pid() -> Pid {
        let cfg = Config::DEFAULT;
        Pid::new(cfg.pid, cfg.speed_unit_shift)
    }

    #[test]
    fn output_stays_within_bounds() {
        let mut pid = reference_pid();
        pid.reset(0);
        let out = pid.calculate(10 << 12, 0, 1_000_000);
        assert!((0..=255).contains(&out));
        let out = pid.calculate(0, 10 << 12, 2_000_000);
        assert_eq!(out, 0); // negative raw output clamps to out_low
    }

    #[test]
    fn integral_never_exceeds_windup_limit() {
        let mut pid = reference_pid();
        pid.reset(0);
        let limit = (1i32 << 12) * 255 / 2;
        // Saturate the error for 100 simulated seconds.
        let mut now = 0u32;
        for _ in 0..1000 {
            now = now.wrapping_add(100_000);
            pid.calculate(10 << 12, 0, now);
            assert!(pid.sum_error.abs() <= limit);
        }
        assert_eq!(pid.sum_error, limit);
    }

    #[test]
    fn zero_dt_after_anchor_is_defined() {
        let mut pid = reference_pid();
        pid.reset(5_000);
        // Same timestamp as the anchor: dt floors to 1 µs, no division
        // by zero and a bounded result.
        let out = pid.calculate(10 << 12, 9 << 12, 5_000);
        assert!((0..=255).contains(&out));
    }

    #[test]
    fn reset_clears_integral() {
        let mut pid = reference_pid();
        pid.reset(0);
        for step in 1..=50u32 {
            pid.calculate(10 << 12, 0, step * 100_000);
        }
        assert!(pid.sum_error > 0);
        pid.reset(123);
        assert_eq!(pid.sum_error, 0);
        assert_eq!(pid.last_error, 0);
    }

    #[test]
    fn feedforward_holds_nominal_drive_at_zero_error() {
        let mut pid = reference_pid();
        pid.reset(0);
        // error = 0: output is pure K + F·setpoint, scaled.
        let out = pid.calculate(10 << 12, 10 << 12, 1_000_000);
        assert_eq!(out, (18i64 * (10 << 12) >> 12) as i32);
    }

    #[test]
    fn wrapping_timestamps_produce_sane_dt() {
        let mut pid = reference_pid();
        pid.reset(u32::MAX - 50_000);
        let out = pid.calculate(10 << 12, 9 << 12, 50_000); // dt = 100_001 across wrap
        assert!((0..=255).contains(&out));
    }
}
