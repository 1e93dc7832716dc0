//! Beacon angle estimation from column-indexed pulse samples.
//!
//! The column interrupt pushes the current column index whenever the
//! infrared beacon is seen; once the beacon has been quiet for the
//! configured window, the foreground loop collapses the queue into a
//! single angle with a circular mean. Averaging the sine/cosine
//! components instead of the raw indices keeps a cluster that
//! straddles column 0 from averaging to the opposite side of the
//! display.

use core::f32::consts::PI;

use heapless::Deque;
use micromath::F32Ext;

use crate::timing::Micros;

/// Bounded FIFO capacity, one entry per detected beacon pulse.
pub const SAMPLE_CAPACITY: usize = 50;
/// Below this many samples an estimate attempt yields "unknown".
pub const MIN_SAMPLES: usize = 10;

/// Ring of column indices with drop-oldest overflow semantics.
pub struct SampleQueue {
    samples: Deque<u16, SAMPLE_CAPACITY>,
}

impl SampleQueue {
    pub const fn new() -> Self {
        Self {
            samples: Deque::new(),
        }
    }

    /// Push a sample, dropping the oldest entry when full.
    pub fn push(&mut self, column: u16) {
        if self.samples.is_full() {
            self.samples.pop_front();
        }
        // Cannot fail: a slot was just freed if needed.
        let _ = self.samples.push_back(column);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for SampleQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse the queue into an angular position via circular mean.
///
/// The queue is drained on every attempt, win or not: estimator
/// latency stays bounded and stale samples never blend into the next
/// burst. Returns `None` with fewer than [`MIN_SAMPLES`] samples or a
/// degenerate (near-zero) resultant vector.
pub fn estimate(queue: &mut SampleQueue, width: u16) -> Option<u16> {
    let enough = queue.len() >= MIN_SAMPLES;

    let mut x = 0.0f32;
    let mut y = 0.0f32;
    if enough {
        for &column in queue.samples.iter() {
            let theta = 2.0 * PI * column as f32 / width as f32;
            x += theta.cos();
            y += theta.sin();
        }
    }
    queue.clear();

    if !enough || (x == 0.0 && y == 0.0) {
        return None;
    }

    // atan2(-y,-x) + PI recovers the mean direction in [0, 2π).
    let theta = (-y).atan2(-x) + PI;
    let angle = (theta * width as f32 / (2.0 * PI)).round() as i32;
    Some(angle.clamp(0, width as i32 - 1) as u16)
}

/// Freshness bookkeeping for the most recent estimate.
///
/// An angle is only meaningful while the beacon keeps pulsing; after
/// `stale_after_us` of silence the caller must treat it as unknown.
#[derive(Clone, Copy, Default)]
pub struct BeaconAngle {
    angle: Option<u16>,
    last_pulse_at: Micros,
}

impl BeaconAngle {
    pub const fn new() -> Self {
        Self {
            angle: None,
            last_pulse_at: 0,
        }
    }

    pub fn update(&mut self, angle: u16, last_pulse_at: Micros) {
        self.angle = Some(angle);
        self.last_pulse_at = last_pulse_at;
    }

    pub fn forget(&mut self) {
        self.angle = None;
    }

    pub fn current(&self, now: Micros, stale_after_us: u32) -> Option<u16> {
        let fresh = crate::timing::elapsed(now, self.last_pulse_at) <= stale_after_us;
        self.angle.filter(|_| fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: u16 = 125;

    #[test]
    fn cluster_recovers_its_center() {
        let mut queue = SampleQueue::new();
        for c in 25..35 {
            queue.push(c);
        }
        let angle = estimate(&mut queue, WIDTH).unwrap();
        assert!((29..=30).contains(&angle), "got {angle}");
        assert!(queue.is_empty(), "queue must drain after an estimate");
    }

    #[test]
    fn cluster_straddling_zero_does_not_average_across() {
        let mut queue = SampleQueue::new();
        for c in [120, 121, 122, 123, 124, 0, 1, 2, 3, 4] {
            queue.push(c);
        }
        let angle = estimate(&mut queue, WIDTH).unwrap();
        // A naive arithmetic mean would land near column 62.
        assert!(angle >= 123 || angle <= 1, "got {angle}");
    }

    #[test]
    fn too_few_samples_is_unknown_and_still_drains() {
        let mut queue = SampleQueue::new();
        for c in 0..(MIN_SAMPLES as u16 - 1) {
            queue.push(c);
        }
        assert_eq!(estimate(&mut queue, WIDTH), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_drops_oldest_past_capacity() {
        let mut queue = SampleQueue::new();
        for c in 0..(SAMPLE_CAPACITY as u16 + 10) {
            queue.push(c);
        }
        assert_eq!(queue.len(), SAMPLE_CAPACITY);
        assert_eq!(queue.samples.front(), Some(&10));
        assert_eq!(queue.samples.back(), Some(&(SAMPLE_CAPACITY as u16 + 9)));
    }

    #[test]
    fn estimate_is_clamped_to_the_raster() {
        let mut queue = SampleQueue::new();
        // All samples at the last column round to the seam.
        for _ in 0..MIN_SAMPLES {
            queue.push(WIDTH - 1);
        }
        let angle = estimate(&mut queue, WIDTH).unwrap();
        assert!(angle <= WIDTH - 1);
    }

    #[test]
    fn beacon_angle_goes_stale() {
        let mut beacon = BeaconAngle::default();
        beacon.update(42, 1_000_000);
        assert_eq!(beacon.current(2_000_000, 5_000_000), Some(42));
        assert_eq!(beacon.current(6_000_001, 5_000_000), None);
    }

    #[test]
    fn forgotten_angle_is_unknown_even_when_fresh() {
        let mut beacon = BeaconAngle::default();
        beacon.update(42, 0);
        beacon.forget();
        assert_eq!(beacon.current(1, 5_000_000), None);
    }
}
