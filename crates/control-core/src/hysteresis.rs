//! Start/stop gate for zoom motion.
//!
//! Zooming starts only once the framing error is clearly large and keeps
//! going until it is clearly small, so the zoom does not "breathe" on
//! detection noise around the target size.

use skicam_common::config::HysteresisConfig;

#[derive(Debug, Clone)]
pub struct HysteresisGate {
    trigger: f64,
    stop: f64,
    active: bool,
}

impl HysteresisGate {
    /// `trigger` must be at least `stop`; the two are swapped otherwise.
    pub fn new(trigger: f64, stop: f64) -> Self {
        Self {
            trigger: trigger.max(stop),
            stop: stop.min(trigger),
            active: false,
        }
    }

    pub fn from_config(config: &HysteresisConfig) -> Self {
        Self::new(config.trigger, config.stop)
    }

    /// Update the gate with the current relative error and report whether
    /// zoom motion is allowed this frame.
    pub fn should_zoom(&mut self, relative_error: f64) -> bool {
        let magnitude = relative_error.abs();
        if !magnitude.is_finite() {
            return self.active;
        }

        if !self.active && magnitude > self.trigger {
            tracing::debug!(relative_error, "Zoom gate opened");
            self.active = true;
        } else if self.active && magnitude < self.stop {
            tracing::debug!(relative_error, "Zoom gate closed");
            self.active = false;
        }
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reset(&mut self) {
        self.active = false;
    }

    pub fn thresholds(&self) -> (f64, f64) {
        (self.trigger, self.stop)
    }
}

impl Default for HysteresisGate {
    fn default() -> Self {
        Self::from_config(&HysteresisConfig::default())
    }
}
