//! Single-axis proportional-derivative controller.
//!
//! The integral term is omitted on purpose: the camera tolerates a small
//! steady-state offset, and without an integrator there is nothing to wind
//! up while a velocity clamp is saturated.

/// A PD controller turning an error signal into a velocity.
#[derive(Debug, Clone)]
pub struct PidController {
    /// Proportional gain. Changes apply on the next `update`.
    pub kp: f64,
    /// Derivative gain. Changes apply on the next `update`.
    pub kd: f64,
    prev_error: Option<f64>,
}

impl PidController {
    pub fn new(kp: f64, kd: f64) -> Self {
        Self {
            kp,
            kd,
            prev_error: None,
        }
    }

    /// Compute the control output for `error` after `dt` seconds.
    ///
    /// The derivative term is zero on the first call after construction or
    /// [`reset`](Self::reset), and whenever `dt` is not a positive finite
    /// number. A non-finite `error` yields `0.0` and is not remembered.
    /// The output is not clamped.
    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        if !error.is_finite() {
            return 0.0;
        }

        let derivative = match self.prev_error {
            Some(prev) if dt.is_finite() && dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);

        self.kp * error + self.kd * derivative
    }

    /// Clear the derivative memory. Gains are kept.
    pub fn reset(&mut self) {
        self.prev_error = None;
    }

    /// Error seen on the last accepted update.
    pub fn previous_error(&self) -> Option<f64> {
        self.prev_error
    }
}
