//! Frame timing for the per-frame control loop.
//!
//! The controller integrates velocities by the elapsed time between
//! processed frames, derived here from capture timestamps.

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Nanoseconds to seconds.
pub fn ns_to_secs(ns: u64) -> f64 {
    ns as f64 / NANOS_PER_SEC
}

/// Seconds to nanoseconds, saturating at zero for negative input.
pub fn secs_to_ns(secs: f64) -> u64 {
    (secs * NANOS_PER_SEC) as u64
}

/// Derives the controller time step from successive frame timestamps.
#[derive(Debug, Default)]
pub struct FrameClock {
    last_ns: Option<u64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous call.
    ///
    /// The first frame yields `0.0`, as does a timestamp that does not move
    /// forward; the controller treats both as hold frames. A backwards
    /// timestamp re-anchors the clock.
    pub fn delta_secs(&mut self, timestamp_ns: u64) -> f64 {
        let dt = match self.last_ns {
            Some(last) if timestamp_ns > last => ns_to_secs(timestamp_ns - last),
            _ => 0.0,
        };
        self.last_ns = Some(timestamp_ns);
        dt
    }

    /// Forget the previous timestamp (e.g. after a capture pause).
    pub fn reset(&mut self) {
        self.last_ns = None;
    }
}

/// Lets every Nth frame through to the controller.
#[derive(Debug)]
pub struct FrameThrottle {
    interval: u32,
    counter: u32,
}

impl FrameThrottle {
    /// Create a throttle passing one frame out of `interval` (minimum 1).
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            counter: 0,
        }
    }

    /// Count a frame; returns true when it should be processed.
    /// With an interval of N, the Nth, 2Nth, ... frames pass.
    pub fn should_process(&mut self) -> bool {
        self.counter = self.counter.wrapping_add(1);
        self.counter % self.interval == 0
    }

    /// Frames per processed frame.
    pub fn interval(&self) -> u32 {
        self.interval
    }
}

/// Time step between processed frames at a nominal capture rate.
pub fn nominal_dt(fps: u32, frame_skip: u32) -> f64 {
    if fps == 0 {
        return 0.0;
    }
    frame_skip.max(1) as f64 / fps as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ns_secs_conversion() {
        assert!((ns_to_secs(1_500_000_000) - 1.5).abs() < 1e-9);
        assert_eq!(secs_to_ns(2.0), 2_000_000_000);
        assert_eq!(secs_to_ns(-1.0), 0);
    }

    #[test]
    fn test_frame_clock_deltas() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta_secs(1_000_000_000), 0.0); // first frame
        assert!((clock.delta_secs(1_033_000_000) - 0.033).abs() < 1e-9);
        assert_eq!(clock.delta_secs(1_033_000_000), 0.0); // repeated timestamp
        assert_eq!(clock.delta_secs(900_000_000), 0.0); // backwards
        assert!((clock.delta_secs(950_000_000) - 0.05).abs() < 1e-9);

        clock.reset();
        assert_eq!(clock.delta_secs(2_000_000_000), 0.0);
    }

    #[test]
    fn test_frame_throttle() {
        let mut throttle = FrameThrottle::new(3);
        let passed: Vec<bool> = (0..6).map(|_| throttle.should_process()).collect();
        assert_eq!(passed, vec![false, false, true, false, false, true]);

        let mut every = FrameThrottle::new(0);
        assert_eq!(every.interval(), 1);
        assert!(every.should_process());
        assert!(every.should_process());
    }

    #[test]
    fn test_nominal_dt() {
        assert!((nominal_dt(60, 3) - 0.05).abs() < 1e-12);
        assert!((nominal_dt(30, 1) - 1.0 / 30.0).abs() < 1e-12);
        assert_eq!(nominal_dt(0, 1), 0.0);
    }
}
