//! Live tuning deltas for the framing controller.
//!
//! A [`TuningDelta`] carries any subset of gains and smoothing factor.
//! Absent fields leave the current value alone, so a debug UI can move one
//! slider at a time without resetting controller memory.

use serde::{Deserialize, Serialize};

use crate::pid::PidController;
use crate::smoothing::SmoothingFilter;

/// Control axes owned by the auto-zoom manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    PanX,
    PanY,
    Zoom,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::PanX, Axis::PanY, Axis::Zoom];
}

/// Optional gain and smoothing updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TuningDelta {
    pub kp: Option<f64>,
    pub kd: Option<f64>,
    pub alpha: Option<f64>,
}

impl TuningDelta {
    pub fn new(kp: Option<f64>, kd: Option<f64>, alpha: Option<f64>) -> Self {
        Self { kp, kd, alpha }
    }

    pub fn with_kp(mut self, kp: f64) -> Self {
        self.kp = Some(kp);
        self
    }

    pub fn with_kd(mut self, kd: f64) -> Self {
        self.kd = Some(kd);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// `kp` with `kd = 2·√kp`, the critically damped pairing.
    pub fn critically_damped(kp: f64) -> Self {
        Self {
            kp: Some(kp),
            kd: Some(2.0 * kp.max(0.0).sqrt()),
            alpha: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kp.is_none() && self.kd.is_none() && self.alpha.is_none()
    }

    /// Apply the gains to one controller, skipping invalid values.
    pub(crate) fn apply_gains(&self, axis: Axis, pid: &mut PidController) {
        if let Some(kp) = self.kp {
            if kp.is_finite() && kp > 0.0 {
                pid.kp = kp;
            } else {
                tracing::warn!(?axis, kp, "Rejected proportional gain");
            }
        }
        if let Some(kd) = self.kd {
            if kd.is_finite() && kd >= 0.0 {
                pid.kd = kd;
            } else {
                tracing::warn!(?axis, kd, "Rejected derivative gain");
            }
        }
    }

    /// Apply the smoothing factor to one error filter.
    pub(crate) fn apply_alpha(&self, filter: &mut SmoothingFilter) {
        if let Some(alpha) = self.alpha {
            filter.set_alpha(alpha);
        }
    }
}
