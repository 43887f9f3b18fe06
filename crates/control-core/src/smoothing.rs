//! Exponential moving-average filter for a single noisy scalar.

/// Alpha used when a non-positive or non-finite value is supplied at construction.
pub const DEFAULT_ALPHA: f64 = 0.5;

/// Single-value EMA: `smoothed = alpha * raw + (1 - alpha) * previous`.
///
/// `alpha` near 1 follows the input closely; near 0 it damps heavily and lags.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    alpha: f64,
    value: Option<f64>,
}

impl SmoothingFilter {
    /// Create a filter. `alpha` is clamped to `(0, 1]`.
    pub fn new(alpha: f64) -> Self {
        let alpha = sanitize_alpha(alpha).unwrap_or_else(|| {
            tracing::warn!(alpha, fallback = DEFAULT_ALPHA, "Invalid smoothing alpha");
            DEFAULT_ALPHA
        });
        Self { alpha, value: None }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Change the smoothing factor, keeping the current estimate.
    ///
    /// Values above 1 are clamped; non-positive or non-finite values are
    /// rejected and the old alpha stays. Returns whether the value was applied.
    pub fn set_alpha(&mut self, alpha: f64) -> bool {
        match sanitize_alpha(alpha) {
            Some(alpha) => {
                self.alpha = alpha;
                true
            }
            None => {
                tracing::warn!(alpha, kept = self.alpha, "Rejected smoothing alpha");
                false
            }
        }
    }

    /// Feed a raw sample and return the new estimate.
    ///
    /// The first sample is returned as-is. A non-finite sample is not
    /// stored; the current estimate (or the sample, if there is none yet)
    /// is returned instead.
    pub fn filter(&mut self, raw: f64) -> f64 {
        if !raw.is_finite() {
            return self.value.unwrap_or(raw);
        }

        let next = match self.value {
            Some(prev) => self.alpha * raw + (1.0 - self.alpha) * prev,
            None => raw,
        };
        self.value = Some(next);
        next
    }

    /// Latest estimate, or `None` before the first sample.
    pub fn current_value(&self) -> Option<f64> {
        self.value
    }

    /// Forget the estimate; the next sample is taken as-is.
    pub fn reset(&mut self) {
        self.value = None;
    }
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

fn sanitize_alpha(alpha: f64) -> Option<f64> {
    if !alpha.is_finite() || alpha <= 0.0 {
        None
    } else {
        Some(alpha.min(1.0))
    }
}
