//! Time management utilities

/// Frame clock fed by the external driving loop
///
/// The driver reports the absolute time of each frame; the clock derives the
/// delta since the previous frame. The first frame has a delta of zero.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_time: Option<f64>,
    frame_count: u64,
}

impl FrameClock {
    /// Create a new clock that has not seen a frame yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `time` and return the delta since the last frame
    ///
    /// Time must be non-decreasing. A time earlier than the previous frame
    /// yields a zero delta and leaves the reference time unchanged.
    pub fn advance(&mut self, time: f64) -> f64 {
        self.frame_count += 1;
        match self.last_time {
            Some(last) if time < last => {
                log::warn!(
                    "frame time went backwards ({time} < {last}); using a zero delta"
                );
                0.0
            }
            Some(last) => {
                self.last_time = Some(time);
                time - last
            }
            None => {
                self.last_time = Some(time);
                0.0
            }
        }
    }

    /// Time of the most recent accepted frame
    pub fn last_time(&self) -> Option<f64> {
        self.last_time
    }

    /// Number of frames recorded so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Forget the previous frame (e.g. after a pause of the driving loop)
    pub fn reset(&mut self) {
        self.last_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_frame_has_zero_delta() {
        let mut clock = FrameClock::new();
        assert_relative_eq!(clock.advance(10.0), 0.0);
        assert_relative_eq!(clock.advance(10.5), 0.5);
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn test_backwards_time_is_ignored() {
        let mut clock = FrameClock::new();
        clock.advance(2.0);
        assert_relative_eq!(clock.advance(1.0), 0.0);
        assert_eq!(clock.last_time(), Some(2.0));
        assert_relative_eq!(clock.advance(3.0), 1.0);
    }

    #[test]
    fn test_reset_restarts_delta() {
        let mut clock = FrameClock::new();
        clock.advance(1.0);
        clock.reset();
        assert_relative_eq!(clock.advance(5.0), 0.0);
    }
}
