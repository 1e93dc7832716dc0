//! Boot-time configuration for the rotor control loop.
//!
//! All thresholds, gains and scale factors live here so the FSM, PID
//! and synchronizer are constructed from one explicit structure
//! instead of scattered globals.

/// Fixed-point PID gains and output bounds.
#[derive(Clone, Copy, Debug)]
pub struct PidGains {
    /// Constant offset added to the raw output.
    pub k: i32,
    /// Feedforward gain (raw output += f·setpoint).
    pub f: i32,
    /// Proportional gain.
    pub p: i32,
    /// Integral gain.
    pub i: i32,
    /// Derivative gain.
    pub d: i32,
    /// Low bound of the scaled output.
    pub out_low: i32,
    /// High bound of the scaled output.
    pub out_high: i32,
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Dwell in WAIT before spin-up starts (operator clearance window).
    pub wait_interval_us: u32,
    /// SPINNING_UP gives up and spins down after this long without
    /// reaching the target period.
    pub spinup_timeout_us: u32,
    /// SPINNING_DOWN is declared complete this long after the last
    /// beam break.
    pub spin_down_time_us: u32,
    /// Spin-up ramp slope: one motor drive level per this many µs.
    pub spinup_divider_us: u32,

    /// Speed setpoint in rev/s, pre-scaled by `1 << speed_unit_shift`.
    pub speed_setpoint: i32,
    /// Fixed-point base shared by the setpoint, the measured speed and
    /// the PID output divisor. Chosen once, never changed mid-run.
    pub speed_unit_shift: u8,

    /// Rotation slower than this trips the over-period interlock.
    /// Doubles as the stall threshold.
    pub too_slow_interval_us: u32,
    /// Rotation faster than this trips the under-period interlock.
    pub too_fast_interval_us: u32,
    /// Battery voltage below this trips the low-battery interlock.
    pub battery_low_volts: f32,

    pub pid: PidGains,

    /// Floor for the column-output tick rate.
    pub min_column_rate_hz: u32,
    /// Beacon pulses are aggregated until the input has been quiet
    /// this long; only then is an angle estimate attempted.
    pub beacon_quiet_window_us: u32,
    /// An estimated angle is treated as unknown this long after the
    /// last beacon pulse.
    pub beacon_stale_us: u32,
}

impl Config {
    /// Reference tuning: 10 rev/s setpoint, 9–13 rev/s safe band.
    pub const DEFAULT: Config = Config {
        wait_interval_us: 2_000_000,
        spinup_timeout_us: 5_000_000,
        spin_down_time_us: 1_500_000,
        spinup_divider_us: 2000,

        speed_setpoint: 10 << 12,
        speed_unit_shift: 12,

        too_slow_interval_us: 1_000_000 / 9,
        too_fast_interval_us: 1_000_000 / 13,
        battery_low_volts: 6.5,

        pid: PidGains {
            k: 0,
            f: 18,
            p: 100,
            i: 20,
            d: 0,
            out_low: 0,
            out_high: 255,
        },

        min_column_rate_hz: 30,
        beacon_quiet_window_us: 400_000,
        beacon_stale_us: 5_000_000,
    };

    /// Rotation period that counts as "at speed": `1e6·scale/setpoint`.
    pub fn target_period_us(&self) -> u32 {
        (1_000_000i64 * (1i64 << self.speed_unit_shift) / self.speed_setpoint as i64) as u32
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_period_matches_setpoint() {
        // 10 rev/s -> 100 ms per rotation.
        assert_eq!(Config::DEFAULT.target_period_us(), 100_000);
    }

    #[test]
    fn safe_band_brackets_the_setpoint() {
        let cfg = Config::DEFAULT;
        assert!(cfg.too_fast_interval_us < cfg.target_period_us());
        assert!(cfg.target_period_us() < cfg.too_slow_interval_us);
    }
}
