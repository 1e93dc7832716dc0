//! Wrapping microsecond timestamps and column-rate derivation.

/// Monotonic microsecond timestamp. Wraps around roughly every 71
/// minutes; all comparisons must go through [`elapsed`].
pub type Micros = u32;

/// Duration in microseconds since `since`, correct across wraparound.
#[inline]
pub fn elapsed(now: Micros, since: Micros) -> u32 {
    now.wrapping_sub(since)
}

/// Column-output tick rate for one full image per physical rotation.
///
/// `width` columns must be emitted per rotation, so the rate is
/// re-derived from the freshly measured rotation interval at every
/// beam break. Returns `None` while no rotation has been observed
/// (interval 0); the caller stops the column clock instead.
pub fn column_tick_rate(width: u32, rotation_interval_us: u32, min_rate_hz: u32) -> Option<u32> {
    if rotation_interval_us == 0 {
        return None;
    }
    let rate = (width as u64 * 1_000_000 / rotation_interval_us as u64) as u32;
    Some(rate.max(min_rate_hz))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_wrap_safe() {
        assert_eq!(elapsed(100, 40), 60);
        assert_eq!(elapsed(10, u32::MAX - 9), 20);
    }

    #[test]
    fn rate_emits_width_columns_per_rotation() {
        // 10 rev/s -> 100 ms interval -> 125 columns in 100 ms = 1250 Hz
        assert_eq!(column_tick_rate(125, 100_000, 30), Some(1250));
    }

    #[test]
    fn rate_is_floored() {
        // Absurdly slow rotation still ticks at the minimum rate.
        assert_eq!(column_tick_rate(125, 100_000_000, 30), Some(30));
    }

    #[test]
    fn unknown_interval_yields_no_rate() {
        assert_eq!(column_tick_rate(125, 0, 30), None);
    }
}
