use crate::error::PipelineError;

/// Fixed-capacity sliding window over a multi-channel sample stream.
///
/// Backing storage is a ring: each `push` overwrites the oldest slot
/// across every channel and the time axis in O(1). Reads map ring
/// positions back to insertion order, so callers always see the window
/// oldest first. Slots are zero-filled until `capacity` samples have
/// arrived; rolling statistics intentionally include that zero fill,
/// biasing early readings toward zero.
pub struct SlidingWindow {
    capacity: usize,
    channels: usize,
    head: usize,
    count: u64,
    t: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl SlidingWindow {
    pub fn new(channels: usize, capacity: usize) -> Self {
        assert!(channels > 0, "window needs at least one channel");
        assert!(capacity > 0, "window needs a non-zero capacity");
        Self {
            capacity,
            channels,
            head: 0,
            count: 0,
            t: vec![0.0; capacity],
            values: vec![vec![0.0; capacity]; channels],
        }
    }

    /// Append one sample across all channels, evicting the oldest slot.
    pub fn push(&mut self, sample: &[f64]) -> Result<(), PipelineError> {
        if sample.len() != self.channels {
            return Err(PipelineError::ChannelMismatch {
                expected: self.channels,
                got: sample.len(),
            });
        }

        self.t[self.head] = self.count as f64;
        for (channel, &value) in sample.iter().enumerate() {
            self.values[channel][self.head] = value;
        }
        self.head = (self.head + 1) % self.capacity;
        self.count += 1;
        Ok(())
    }

    /// Total samples pushed since creation, monotonic.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Window contents for one channel, oldest first.
    pub fn channel(&self, channel: usize) -> Vec<f64> {
        (0..self.capacity)
            .map(|i| self.values[channel][self.slot(i)])
            .collect()
    }

    /// Sample-index axis aligned with `channel()`, oldest first.
    pub fn times(&self) -> Vec<f64> {
        (0..self.capacity).map(|i| self.t[self.slot(i)]).collect()
    }

    /// Most recent value for one channel.
    pub fn latest(&self, channel: usize) -> f64 {
        self.values[channel][self.slot(self.capacity - 1)]
    }

    /// Population mean over the full (zero-filled) window.
    pub fn mean(&self, channel: usize) -> f64 {
        self.values[channel].iter().sum::<f64>() / self.capacity as f64
    }

    /// Population standard deviation over the full window.
    pub fn std(&self, channel: usize) -> f64 {
        let mean = self.mean(channel);
        let variance = self.values[channel]
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.capacity as f64;
        variance.sqrt()
    }

    /// Absolute deviation from the channel mean per slot, oldest first.
    pub fn deviation(&self, channel: usize) -> Vec<f64> {
        let mean = self.mean(channel);
        (0..self.capacity)
            .map(|i| (self.values[channel][self.slot(i)] - mean).abs())
            .collect()
    }

    /// Mean of the newest `n` slots of one channel. `n` is clamped to
    /// the window capacity; zero fill is included while the window
    /// warms up.
    pub fn tail_mean(&self, channel: usize, n: usize) -> f64 {
        let n = n.clamp(1, self.capacity);
        let sum: f64 = (self.capacity - n..self.capacity)
            .map(|i| self.values[channel][self.slot(i)])
            .sum();
        sum / n as f64
    }

    // Maps an oldest-first position to its ring slot.
    fn slot(&self, ordered: usize) -> usize {
        (self.head + ordered) % self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn push_increments_count_and_rejects_bad_width() {
        let mut window = SlidingWindow::new(2, 4);
        window.push(&[1.0, 2.0]).unwrap();
        assert_eq!(window.count(), 1);

        let err = window.push(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ChannelMismatch { expected: 2, got: 1 }
        ));
        assert_eq!(window.count(), 1);
    }

    #[test]
    fn full_window_round_trips_in_insertion_order() {
        let capacity = 8;
        let mut window = SlidingWindow::new(1, capacity);
        for i in 0..capacity {
            window.push(&[i as f64]).unwrap();
        }
        let expected: Vec<f64> = (0..capacity).map(|i| i as f64).collect();
        assert_eq!(window.channel(0), expected);
        assert_eq!(window.times(), expected);
    }

    #[test]
    fn oldest_sample_is_evicted_past_capacity() {
        let mut window = SlidingWindow::new(1, 3);
        for i in 0..5 {
            window.push(&[i as f64]).unwrap();
        }
        assert_eq!(window.channel(0), vec![2.0, 3.0, 4.0]);
        assert_eq!(window.times(), vec![2.0, 3.0, 4.0]);
        assert_eq!(window.latest(0), 4.0);
        assert_eq!(window.count(), 5);
    }

    #[test]
    fn statistics_are_population_statistics() {
        let mut window = SlidingWindow::new(1, 4);
        for v in [2.0, 4.0, 4.0, 6.0] {
            window.push(&[v]).unwrap();
        }
        assert_relative_eq!(window.mean(0), 4.0);
        assert_relative_eq!(window.std(0), 2.0_f64.sqrt());

        let deviation = window.deviation(0);
        assert_eq!(deviation, vec![2.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn early_statistics_include_zero_fill() {
        let mut window = SlidingWindow::new(1, 4);
        window.push(&[8.0]).unwrap();
        // Three zero slots still count toward the mean.
        assert_relative_eq!(window.mean(0), 2.0);
        assert!(window.std(0) > 0.0);
    }

    #[test]
    fn tail_mean_covers_the_newest_slots() {
        let mut window = SlidingWindow::new(1, 5);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            window.push(&[v]).unwrap();
        }
        assert_relative_eq!(window.tail_mean(0, 2), 4.5);
        // Clamped to capacity.
        assert_relative_eq!(window.tail_mean(0, 50), 3.0);
    }

    #[test]
    fn constant_signal_has_zero_std() {
        let mut window = SlidingWindow::new(1, 6);
        for _ in 0..6 {
            window.push(&[3.3]).unwrap();
        }
        // Sum-order roundoff leaves the std at ~1e-16, not exactly zero.
        assert!(window.std(0) < 1e-12);
        assert!(window.deviation(0).iter().all(|d| *d < 1e-12));
    }
}
