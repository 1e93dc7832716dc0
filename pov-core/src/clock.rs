//! Local wall clock.
//!
//! The network time collaborator is consulted exactly once at boot
//! (it may block while connectivity comes up; nothing else is running
//! yet). Afterwards the time of day is advanced locally from the
//! 64-bit microsecond uptime, wrapping explicitly at 24 h. The 32-bit
//! wrapping timestamps used for rotor timing are too short here: they
//! roll over after 71 minutes and would snap the display back to the
//! boot epoch.

use core::fmt::Write;

use heapless::String;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Time of day with second resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimeOfDay {
    /// Parse "HH:MM:SS" (the collaborator's wire format).
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 8 || bytes[2] != b':' || bytes[5] != b':' {
            return None;
        }
        let two = |i: usize| -> Option<u8> {
            let hi = (bytes[i] as char).to_digit(10)?;
            let lo = (bytes[i + 1] as char).to_digit(10)?;
            Some((hi * 10 + lo) as u8)
        };
        let (hours, minutes, seconds) = (two(0)?, two(3)?, two(6)?);
        if hours > 23 || minutes > 59 || seconds > 59 {
            return None;
        }
        Some(Self {
            hours,
            minutes,
            seconds,
        })
    }

    pub fn as_seconds(&self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }

    pub fn from_seconds(total: u32) -> Self {
        let total = total % SECONDS_PER_DAY;
        Self {
            hours: (total / 3600) as u8,
            minutes: (total / 60 % 60) as u8,
            seconds: (total % 60) as u8,
        }
    }

    /// Advance by whole seconds, wrapping at midnight.
    pub fn advanced_by(&self, secs: u32) -> Self {
        Self::from_seconds(self.as_seconds().wrapping_add(secs % SECONDS_PER_DAY) % SECONDS_PER_DAY)
    }

    /// Render as "HH:MM:SS".
    pub fn render(&self) -> String<8> {
        let mut out = String::new();
        // Infallible: 8 bytes fit the capacity exactly.
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        );
        out
    }
}

/// The excluded network-time collaborator, at its interface.
pub trait TimeSource {
    /// Blocking fetch of the current wall-clock time. Retries with
    /// backoff internally; only returns once a time is known.
    fn fetch(&mut self) -> TimeOfDay;
}

/// Wall clock anchored to one boot-time fetch.
pub struct LocalClock {
    epoch: TimeOfDay,
    anchored_at_us: u64,
}

impl LocalClock {
    pub fn sync(source: &mut dyn TimeSource, now_us: u64) -> Self {
        Self {
            epoch: source.fetch(),
            anchored_at_us: now_us,
        }
    }

    pub fn now(&self, now_us: u64) -> TimeOfDay {
        let secs = now_us.wrapping_sub(self.anchored_at_us) / 1_000_000;
        self.epoch.advanced_by((secs % SECONDS_PER_DAY as u64) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips() {
        let t = TimeOfDay::parse("23:59:07").unwrap();
        assert_eq!(
            t,
            TimeOfDay {
                hours: 23,
                minutes: 59,
                seconds: 7
            }
        );
        assert_eq!(t.render().as_str(), "23:59:07");
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert_eq!(TimeOfDay::parse("24:00:00"), None);
        assert_eq!(TimeOfDay::parse("12:60:00"), None);
        assert_eq!(TimeOfDay::parse("12-30-00"), None);
        assert_eq!(TimeOfDay::parse("12:30"), None);
        assert_eq!(TimeOfDay::parse("ab:cd:ef"), None);
    }

    #[test]
    fn advancing_wraps_at_midnight() {
        let t = TimeOfDay::parse("23:59:30").unwrap();
        assert_eq!(t.advanced_by(45).render().as_str(), "00:00:15");
    }

    struct FixedSource(TimeOfDay);
    impl TimeSource for FixedSource {
        fn fetch(&mut self) -> TimeOfDay {
            self.0
        }
    }

    #[test]
    fn local_clock_advances_from_elapsed_ticks() {
        let mut source = FixedSource(TimeOfDay::parse("10:00:00").unwrap());
        let clock = LocalClock::sync(&mut source, 1_000_000);
        assert_eq!(clock.now(1_000_000).render().as_str(), "10:00:00");
        assert_eq!(clock.now(91_000_000).render().as_str(), "10:01:30");
    }

    #[test]
    fn local_clock_advances_past_the_32_bit_microsecond_range() {
        let mut source = FixedSource(TimeOfDay::parse("10:00:00").unwrap());
        let clock = LocalClock::sync(&mut source, 0);
        // 2^32 µs is just under 1 h 12 min of uptime; the clock must
        // keep counting, not snap back to the sync epoch.
        assert_eq!(clock.now(u32::MAX as u64).render().as_str(), "11:11:34");
        assert_eq!(
            clock.now(u32::MAX as u64 + 1_000_000).render().as_str(),
            "11:11:35"
        );
    }

    #[test]
    fn local_clock_runs_for_days() {
        let mut source = FixedSource(TimeOfDay::parse("23:00:00").unwrap());
        let clock = LocalClock::sync(&mut source, 0);
        // 50 h of uptime: two midnight wraps.
        assert_eq!(clock.now(50 * 3_600_000_000).render().as_str(), "01:00:00");
    }
}
