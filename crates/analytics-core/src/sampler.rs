/// Time-based gate admitting at most one frame per `1 / sample_fps` window.
///
/// Timestamps are the host's microsecond timeline. A non-positive target
/// rate passes every frame; non-positive timestamps pass without touching
/// the gate (malformed timestamps are not the sampler's concern).
#[derive(Debug)]
pub struct FrameSampler {
    min_frame_interval_us: i64,
    last_accepted_timestamp_us: i64,
}

impl FrameSampler {
    pub fn new(sample_fps: f64) -> Self {
        let min_frame_interval_us = if sample_fps > 0.0 {
            (1_000_000.0 / sample_fps).round() as i64
        } else {
            0
        };
        Self {
            min_frame_interval_us,
            last_accepted_timestamp_us: 0,
        }
    }

    /// Returns true when the frame should be processed.
    pub fn accept(&mut self, timestamp_us: i64) -> bool {
        if self.min_frame_interval_us <= 0 {
            self.last_accepted_timestamp_us = timestamp_us;
            return true;
        }

        if timestamp_us <= 0 {
            return true;
        }

        if self.last_accepted_timestamp_us > 0
            && timestamp_us - self.last_accepted_timestamp_us < self.min_frame_interval_us
        {
            return false;
        }

        self.last_accepted_timestamp_us = timestamp_us;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_rate_passes_everything() {
        let mut sampler = FrameSampler::new(0.0);
        for ts in [1, 2, 3, 4, 5] {
            assert!(sampler.accept(ts));
        }
    }

    #[test]
    fn first_frame_is_always_accepted() {
        let mut sampler = FrameSampler::new(5.0);
        assert!(sampler.accept(1_000_000));
    }

    #[test]
    fn frames_within_the_window_are_suppressed() {
        let mut sampler = FrameSampler::new(5.0); // 200ms window
        assert!(sampler.accept(1_000_000));
        assert!(!sampler.accept(1_100_000));
        assert!(!sampler.accept(1_199_999));
        assert!(sampler.accept(1_200_000));
    }

    #[test]
    fn non_positive_timestamps_pass_without_updating_state() {
        let mut sampler = FrameSampler::new(5.0);
        assert!(sampler.accept(1_000_000));
        assert!(sampler.accept(0));
        assert!(sampler.accept(-50));
        // The gate still keys off the last real timestamp.
        assert!(!sampler.accept(1_100_000));
    }

    #[test]
    fn backwards_timestamp_suppresses_at_most_one_interval() {
        let mut sampler = FrameSampler::new(5.0);
        assert!(sampler.accept(10_000_000));
        // Stream restart: earlier timestamps fall inside the last window.
        assert!(!sampler.accept(5_000_000));
        assert!(sampler.accept(10_200_000));
    }

    #[test]
    fn sampling_ratio_approximates_target_rate() {
        // 30 fps input stream, 5 fps target, over 10 seconds.
        let mut sampler = FrameSampler::new(5.0);
        let mut accepted = 0;
        for i in 0..300i64 {
            if sampler.accept(1_000_000 + i * 33_333) {
                accepted += 1;
            }
        }
        // Target is 50; the discrete 33ms grid lands on ~43.
        assert!((40..=55).contains(&accepted), "accepted {}", accepted);
    }
}
