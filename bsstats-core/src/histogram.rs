//! Frame-size histogram and aggregates

use crate::types::Frame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts of frames per declared length, with running extremes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Occurrences of each frame length, in units
    counts: BTreeMap<u16, u64>,

    /// Longest length seen (0 until a longer frame arrives)
    max_len: u16,

    /// Shortest length seen
    min_len: Option<u16>,

    /// Times a new maximum or a new minimum was set
    extreme_updates: u64,

    /// Total number of frames folded
    total_frames: u64,
}

impl Histogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame into the histogram
    pub fn record(&mut self, frame: &Frame) {
        self.record_len(frame.length_in_units);
    }

    /// Fold one frame length into the histogram
    pub fn record_len(&mut self, len: u16) {
        *self.counts.entry(len).or_insert(0) += 1;

        if len > self.max_len {
            self.max_len = len;
            self.extreme_updates += 1;
        }
        if self.min_len.map_or(true, |min| len < min) {
            self.min_len = Some(len);
            self.extreme_updates += 1;
        }

        self.total_frames += 1;
    }

    /// Fold every frame of an iterator
    pub fn fold<'a, I>(iter: I) -> Self
    where
        I: IntoIterator<Item = &'a Frame>,
    {
        let mut histogram = Self::new();
        for frame in iter {
            histogram.record(frame);
        }
        histogram
    }

    /// Occurrences of `len`
    pub fn count(&self, len: u16) -> u64 {
        self.counts.get(&len).copied().unwrap_or(0)
    }

    /// Non-zero counts in ascending length order
    pub fn iter(&self) -> impl Iterator<Item = (u16, u64)> + '_ {
        self.counts.iter().map(|(&len, &count)| (len, count))
    }

    /// Longest frame length seen
    pub fn max_len(&self) -> u16 {
        self.max_len
    }

    /// Shortest frame length seen, `None` for an empty histogram
    pub fn min_len(&self) -> Option<u16> {
        self.min_len
    }

    /// Total number of frames
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// The "frame sizes found" statistic of the classic report
    ///
    /// Counts new maxima and new minima, starting from -1. This is not the
    /// number of unique lengths: lengths that rise on every frame bump it
    /// on every frame. Empty histograms report 0.
    pub fn distinct_sizes_seen(&self) -> u64 {
        self.extreme_updates.saturating_sub(1)
    }

    /// Number of different lengths actually present
    pub fn unique_lengths(&self) -> usize {
        self.counts.len()
    }

    /// Longest-frame count over total frames
    pub fn longest_ratio(&self) -> f64 {
        self.ratio(self.count(self.max_len))
    }

    /// Shortest-frame count over total frames
    ///
    /// Reported as 0.0 when [`Self::distinct_sizes_seen`] is 1.
    pub fn shortest_ratio(&self) -> f64 {
        if self.distinct_sizes_seen() == 1 {
            return 0.0;
        }
        self.ratio(self.min_len.map_or(0, |min| self.count(min)))
    }

    /// Longest-frame count over shortest-frame count
    pub fn extremes_ratio(&self) -> f64 {
        match self.min_len.map(|min| self.count(min)) {
            Some(shortest) if shortest > 0 => self.count(self.max_len) as f64 / shortest as f64,
            _ => 0.0,
        }
    }

    fn ratio(&self, count: u64) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            count as f64 / self.total_frames as f64
        }
    }
}

impl<'a> Extend<&'a Frame> for Histogram {
    fn extend<T: IntoIterator<Item = &'a Frame>>(&mut self, iter: T) {
        for frame in iter {
            self.record(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_lens(lens: &[u16]) -> Histogram {
        let mut h = Histogram::new();
        for &len in lens {
            h.record_len(len);
        }
        h
    }

    #[test]
    fn test_counts_and_extremes() {
        let h = from_lens(&[10, 20, 10, 20, 20]);
        assert_eq!(h.count(10), 2);
        assert_eq!(h.count(20), 3);
        assert_eq!(h.count(15), 0);
        assert_eq!(h.total_frames(), 5);
        assert_eq!(h.max_len(), 20);
        assert_eq!(h.min_len(), Some(10));
        assert_eq!(h.distinct_sizes_seen(), 2);
        assert_eq!(h.iter().collect::<Vec<_>>(), vec![(10, 2), (20, 3)]);
    }

    #[test]
    fn test_ratios() {
        let h = from_lens(&[10, 20, 10, 20, 20]);
        assert!((h.longest_ratio() - 0.6).abs() < 1e-9);
        assert!((h.shortest_ratio() - 0.4).abs() < 1e-9);
        assert!((h.extremes_ratio() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_new_extreme_counting_rule() {
        // Rising lengths set a new maximum on every frame
        let h = from_lens(&[1, 2, 3, 4]);
        assert_eq!(h.distinct_sizes_seen(), 4);
        assert_eq!(h.unique_lengths(), 4);

        // Revisiting the middle does not count
        let h = from_lens(&[5, 1, 9, 5, 3]);
        assert_eq!(h.distinct_sizes_seen(), 3);
        assert_eq!(h.unique_lengths(), 4);
    }

    #[test]
    fn test_single_size_has_no_shortest_ratio() {
        let h = from_lens(&[80, 80, 80]);
        assert_eq!(h.distinct_sizes_seen(), 1);
        assert!((h.longest_ratio() - 1.0).abs() < 1e-9);
        assert_eq!(h.shortest_ratio(), 0.0);
    }

    #[test]
    fn test_zero_length_first_frame() {
        let h = from_lens(&[0]);
        assert_eq!(h.max_len(), 0);
        assert_eq!(h.min_len(), Some(0));
        assert_eq!(h.distinct_sizes_seen(), 0);
    }

    #[test]
    fn test_empty() {
        let h = Histogram::new();
        assert_eq!(h.total_frames(), 0);
        assert_eq!(h.distinct_sizes_seen(), 0);
        assert_eq!(h.longest_ratio(), 0.0);
        assert_eq!(h.shortest_ratio(), 0.0);
        assert_eq!(h.extremes_ratio(), 0.0);
    }

    #[test]
    fn test_fold_frames() {
        let frames: Vec<Frame> = [3u16, 3, 7]
            .iter()
            .enumerate()
            .map(|(i, &len)| Frame {
                index: i as u64 + 1,
                length_in_units: len,
                byte_offset: 0,
            })
            .collect();
        let h = Histogram::fold(&frames);
        assert_eq!(h.total_frames(), 3);
        assert_eq!(h.count(3), 2);

        let mut extended = Histogram::new();
        extended.extend(&frames);
        assert_eq!(extended, h);
    }
}
