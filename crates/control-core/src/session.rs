//! Stream driver around [`AutoZoomManager`].
//!
//! Feeds timestamped subject observations to the controller: derives `dt`
//! from capture timestamps, skips frames per the configured interval, holds
//! the viewport while the subject is lost, and suspends automatic framing
//! while the operator zooms by hand.
//!
//! Streams without capture timestamps (every `t` is zero) are stepped at the
//! nominal frame rate instead.

use chrono::{DateTime, Utc};
use serde::Serialize;
use skicam_common::clock::{nominal_dt, FrameClock, FrameThrottle};
use skicam_common::config::FramingConfig;
use skicam_framing_model::geometry::Rect;
use skicam_framing_model::observation::{SubjectObservation, ViewportSample};

use crate::auto_zoom::AutoZoomManager;

/// Who is driving the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FramingMode {
    Auto,
    Manual,
}

/// Frame counters for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Wall-clock time the session was created.
    pub started_at: DateTime<Utc>,
    /// Observations received.
    pub frames: u64,
    /// Observations that produced a viewport sample.
    pub processed: u64,
    /// Observations dropped by the frame-skip interval.
    pub throttled: u64,
    /// Processed frames without a detection.
    pub missing: u64,
    /// Processed frames while in manual mode.
    pub manual: u64,
}

impl SessionStats {
    fn starting_now() -> Self {
        Self {
            started_at: Utc::now(),
            frames: 0,
            processed: 0,
            throttled: 0,
            missing: 0,
            manual: 0,
        }
    }
}

#[derive(Debug)]
pub struct FramingSession {
    manager: AutoZoomManager,
    clock: FrameClock,
    throttle: FrameThrottle,
    /// Step used when observations carry no timestamps.
    nominal_dt: Option<f64>,
    mode: FramingMode,
    stats: SessionStats,
}

impl FramingSession {
    pub fn new(manager: AutoZoomManager, frame_skip: u32) -> Self {
        Self {
            manager,
            clock: FrameClock::new(),
            throttle: FrameThrottle::new(frame_skip),
            nominal_dt: None,
            mode: FramingMode::Auto,
            stats: SessionStats::starting_now(),
        }
    }

    /// Session over `frame` using the controller settings, frame-skip
    /// interval and nominal frame rate from `config`.
    pub fn from_config(config: &FramingConfig, frame: Rect) -> Self {
        Self::new(
            AutoZoomManager::from_config(config).with_frame(frame),
            config.frame_skip,
        )
        .with_nominal_dt(nominal_dt(config.nominal_fps, config.frame_skip))
    }

    /// Time step between processed frames for untimestamped streams.
    /// Non-positive or non-finite values disable the fallback.
    pub fn with_nominal_dt(mut self, dt: f64) -> Self {
        self.nominal_dt = (dt.is_finite() && dt > 0.0).then_some(dt);
        self
    }

    /// Process one observation.
    ///
    /// Returns `None` when the frame is skipped by the throttle. Skipped
    /// frames do not advance the clock, so the next `dt` spans them.
    pub fn process(&mut self, observation: &SubjectObservation) -> Option<ViewportSample> {
        self.stats.frames += 1;
        if !self.throttle.should_process() {
            self.stats.throttled += 1;
            return None;
        }

        let mut dt = self.clock.delta_secs(observation.timestamp_ns);
        if dt == 0.0 && observation.timestamp_ns == 0 && self.stats.processed > 0 {
            dt = self.nominal_dt.unwrap_or(0.0);
        }
        self.stats.processed += 1;

        let viewport = match (self.mode, observation.rect) {
            (FramingMode::Manual, _) => {
                self.stats.manual += 1;
                self.manager.viewport()
            }
            (FramingMode::Auto, None) => {
                self.stats.missing += 1;
                tracing::trace!(t = observation.timestamp_ns, "No subject, holding viewport");
                self.manager.viewport()
            }
            (FramingMode::Auto, Some(rect)) => self.manager.update(rect, dt),
        };

        Some(ViewportSample {
            timestamp_ns: observation.timestamp_ns,
            viewport,
            zoom_factor: self.manager.zoom_factor(),
        })
    }

    /// Process a recorded stream, returning one sample per processed frame.
    pub fn run(&mut self, observations: &[SubjectObservation]) -> Vec<ViewportSample> {
        observations
            .iter()
            .filter_map(|obs| self.process(obs))
            .collect()
    }

    /// Hand the viewport to the operator at `zoom_factor`.
    pub fn set_manual_zoom(&mut self, zoom_factor: f64) {
        self.manager.sync_zoom(zoom_factor);
        if self.mode != FramingMode::Manual {
            tracing::info!(zoom_factor, "Manual zoom engaged");
        }
        self.mode = FramingMode::Manual;
    }

    /// Return to automatic framing, starting from the operator's zoom level.
    pub fn resume_auto(&mut self, zoom_factor: f64) {
        self.manager.sync_zoom(zoom_factor);
        if self.mode != FramingMode::Auto {
            tracing::info!(zoom_factor, "Automatic framing resumed");
        }
        self.mode = FramingMode::Auto;
    }

    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn manager(&self) -> &AutoZoomManager {
        &self.manager
    }

    /// Mutable access for live tuning between frames.
    pub fn manager_mut(&mut self) -> &mut AutoZoomManager {
        &mut self.manager
    }

    /// End the session and log its counters.
    pub fn finish(self) -> SessionStats {
        let stats = self.stats;
        tracing::info!(
            started_at = %stats.started_at.to_rfc3339(),
            wall_secs = (Utc::now() - stats.started_at).num_milliseconds() as f64 / 1000.0,
            frames = stats.frames,
            processed = stats.processed,
            throttled = stats.throttled,
            missing = stats.missing,
            manual = stats.manual,
            final_zoom = self.manager.zoom_factor(),
            "Framing session finished"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_NS: u64 = 33_000_000;

    fn stream(count: u64, rect: Option<Rect>) -> Vec<SubjectObservation> {
        (0..count)
            .map(|i| SubjectObservation {
                timestamp_ns: i * FRAME_NS,
                rect,
            })
            .collect()
    }

    #[test]
    fn test_every_frame_processed_by_default() {
        let mut session = FramingSession::new(AutoZoomManager::new(), 1);
        let samples = session.run(&stream(10, Some(Rect::new(0.6, 0.3, 0.7, 0.6))));
        assert_eq!(samples.len(), 10);
        assert_eq!(samples[3].timestamp_ns, 3 * FRAME_NS);

        // First frame has no dt yet, so it holds the full frame.
        assert_eq!(samples[0].viewport, Rect::UNIT);
        assert_ne!(samples[9].viewport, Rect::UNIT);
    }

    #[test]
    fn test_throttled_frames_are_skipped_and_spanned() {
        let rect = Some(Rect::new(0.6, 0.3, 0.7, 0.6));
        let mut skipping = FramingSession::new(AutoZoomManager::new(), 2);
        let samples = skipping.run(&stream(10, rect));
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].timestamp_ns, FRAME_NS);

        // Same motion as a session that only ever sees every other frame.
        let mut sparse = FramingSession::new(AutoZoomManager::new(), 1);
        let odd: Vec<_> = stream(10, rect).into_iter().skip(1).step_by(2).collect();
        assert_eq!(sparse.run(&odd), samples);

        let stats = skipping.finish();
        assert_eq!(stats.frames, 10);
        assert_eq!(stats.processed, 5);
        assert_eq!(stats.throttled, 5);
    }

    #[test]
    fn test_missing_detection_holds_viewport() {
        let mut session = FramingSession::new(AutoZoomManager::new(), 1);
        session.run(&stream(5, Some(Rect::new(0.6, 0.3, 0.7, 0.6))));
        let held = session.manager().viewport();

        let lost: Vec<_> = (5..10)
            .map(|i| SubjectObservation::missing(i * FRAME_NS))
            .collect();
        for sample in session.run(&lost) {
            assert_eq!(sample.viewport, held);
        }
        assert_eq!(session.stats().missing, 5);
    }

    #[test]
    fn test_manual_mode_suspends_and_resumes() {
        let rect = Some(Rect::new(0.6, 0.3, 0.7, 0.6));
        let mut session = FramingSession::new(AutoZoomManager::new(), 1);
        session.set_manual_zoom(2.0);
        assert_eq!(session.mode(), FramingMode::Manual);

        let samples = session.run(&stream(5, rect));
        for sample in &samples {
            assert!((sample.zoom_factor - 2.0).abs() < 1e-9);
            assert_eq!(sample.viewport, samples[0].viewport);
        }
        assert_eq!(session.stats().manual, 5);

        session.resume_auto(2.0);
        assert_eq!(session.mode(), FramingMode::Auto);
        let later: Vec<_> = (5..15)
            .map(|i| SubjectObservation::detected(i * FRAME_NS, Rect::new(0.6, 0.3, 0.7, 0.6)))
            .collect();
        let resumed = session.run(&later);
        assert_ne!(resumed.last().map(|s| s.viewport), Some(samples[0].viewport));
    }

    #[test]
    fn test_from_config_uses_frame_skip_and_frame() {
        let config = FramingConfig {
            frame_skip: 3,
            ..Default::default()
        };
        let frame = Rect::new(0.0, 0.0, 1280.0, 720.0);
        let mut session = FramingSession::from_config(&config, frame);
        assert_eq!(session.manager().frame(), frame);
        let samples = session.run(&stream(9, None));
        assert_eq!(samples.len(), 3);
    }

    #[test]
    fn test_untimestamped_stream_steps_at_nominal_rate() {
        let config = FramingConfig {
            nominal_fps: 30,
            ..Default::default()
        };
        let rect = Rect::new(0.6, 0.3, 0.7, 0.6);
        let untimed: Vec<_> = (0..10).map(|_| SubjectObservation::detected(0, rect)).collect();

        let mut session = FramingSession::from_config(&config, Rect::UNIT);
        let samples = session.run(&untimed);
        assert_eq!(samples[0].viewport, Rect::UNIT);

        let max_step = session.manager().max_pan_speed / 30.0;
        for pair in samples.windows(2) {
            let dx = pair[1].viewport.center_x() - pair[0].viewport.center_x();
            assert!(dx > 0.0, "viewport should follow the skier");
            assert!(dx <= max_step + 1e-12);
        }
    }

    #[test]
    fn test_untimestamped_stream_holds_without_nominal_rate() {
        let rect = Rect::new(0.6, 0.3, 0.7, 0.6);
        let untimed: Vec<_> = (0..5).map(|_| SubjectObservation::detected(0, rect)).collect();

        let mut session = FramingSession::new(AutoZoomManager::new(), 1).with_nominal_dt(f64::NAN);
        for sample in session.run(&untimed) {
            assert_eq!(sample.viewport, Rect::UNIT);
        }
    }

    #[test]
    fn test_stats_carry_session_start() {
        let before = Utc::now();
        let mut session = FramingSession::new(AutoZoomManager::new(), 1);
        session.run(&stream(3, None));
        let stats = session.finish();
        assert!(stats.started_at >= before);
        assert!(stats.started_at <= Utc::now());
        assert_eq!(stats.frames, 3);
    }
}
