// Chronological history of pointer positions.
//
// Samples are appended at the back and expire from the front, so the
// storage is a ring buffer and eviction is a run of `pop_front`s.

use crate::mode::Mode;
use crate::types::PointerSample;
use std::collections::VecDeque;

/// True when `sample` should be punched into the mask at time `now`.
#[inline]
pub fn is_visible(sample: &PointerSample, mode: Mode, now: f64, lag_secs: f64) -> bool {
    !mode.expires_samples() || now - sample.timestamp <= lag_secs
}

#[derive(Debug, Default)]
pub struct Trail {
    samples: VecDeque<PointerSample>,
    next_seq: u64,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&PointerSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointerSample> {
        self.samples.iter()
    }

    /// Append `(x, y)` unless it equals the most recent sample's position.
    ///
    /// Timestamps never go backwards: a clock that regresses is clamped to the
    /// last recorded time so the trail stays sorted.
    pub fn push_if_changed(&mut self, x: f32, y: f32, timestamp: f64) -> bool {
        let timestamp = match self.samples.back() {
            Some(last) if last.same_position(x, y) => return false,
            Some(last) => timestamp.max(last.timestamp),
            None => timestamp,
        };
        self.samples.push_back(PointerSample { seq: self.next_seq, x, y, timestamp });
        self.next_seq += 1;
        true
    }

    /// Samples that are drawn this frame, oldest first.
    pub fn visible(&self, mode: Mode, now: f64, lag_secs: f64) -> impl Iterator<Item = &PointerSample> {
        self.samples.iter().filter(move |s| is_visible(s, mode, now, lag_secs))
    }

    /// Drop samples older than `lag_secs`, always keeping the newest one.
    ///
    /// The newest sample mirrors the live pointer; removing it would let the
    /// next tick re-append the same position with a fresh timestamp.
    pub fn evict_expired(&mut self, now: f64, lag_secs: f64) -> usize {
        let mut removed = 0;
        while self.samples.len() > 1 {
            match self.samples.front() {
                Some(front) if now - front.timestamp > lag_secs => {
                    self.samples.pop_front();
                    removed += 1;
                }
                _ => break,
            }
        }
        removed
    }

    /// Forget every sample. Sequence numbers keep counting up.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(trail: &Trail) -> Vec<(f32, f32)> {
        trail.iter().map(|s| (s.x, s.y)).collect()
    }

    #[test]
    fn consecutive_duplicates_are_skipped() {
        let mut trail = Trail::new();
        assert!(trail.push_if_changed(1.0, 1.0, 0.0));
        assert!(!trail.push_if_changed(1.0, 1.0, 0.5));
        assert!(trail.push_if_changed(2.0, 1.0, 1.0));
        assert!(trail.push_if_changed(1.0, 1.0, 2.0));
        assert_eq!(positions(&trail), vec![(1.0, 1.0), (2.0, 1.0), (1.0, 1.0)]);
    }

    #[test]
    fn regressing_clock_is_clamped() {
        let mut trail = Trail::new();
        trail.push_if_changed(0.0, 1.0, 5.0);
        trail.push_if_changed(0.0, 2.0, 3.0);
        let stamps: Vec<f64> = trail.iter().map(|s| s.timestamp).collect();
        assert_eq!(stamps, vec![5.0, 5.0]);
    }

    #[test]
    fn sequence_numbers_survive_clear() {
        let mut trail = Trail::new();
        trail.push_if_changed(1.0, 1.0, 0.0);
        trail.push_if_changed(2.0, 2.0, 0.0);
        trail.clear();
        assert!(trail.is_empty());
        trail.push_if_changed(3.0, 3.0, 1.0);
        assert_eq!(trail.last().map(|s| s.seq), Some(2));
    }

    #[test]
    fn lag_boundary_is_inclusive() {
        let mut trail = Trail::new();
        trail.push_if_changed(1.0, 1.0, 0.0);
        assert_eq!(trail.visible(Mode::Disappear, 10.0, 10.0).count(), 1);
        assert_eq!(trail.visible(Mode::Disappear, 10.001, 10.0).count(), 0);
        assert_eq!(trail.visible(Mode::Photo, 1e6, 10.0).count(), 1);
    }

    #[test]
    fn eviction_keeps_the_newest_sample() {
        let mut trail = Trail::new();
        trail.push_if_changed(1.0, 1.0, 0.0);
        trail.push_if_changed(2.0, 2.0, 1.0);
        trail.push_if_changed(3.0, 3.0, 8.0);

        assert_eq!(trail.evict_expired(12.0, 10.0), 2);
        assert_eq!(positions(&trail), vec![(3.0, 3.0)]);

        assert_eq!(trail.evict_expired(100.0, 10.0), 0);
        assert_eq!(trail.len(), 1);
    }
}
