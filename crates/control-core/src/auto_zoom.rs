//! Auto-Zoom and Auto-Pan: the per-frame framing controller.
//!
//! Keeps a tracked subject centered in the camera viewport and sized to a
//! target fraction of the viewport height.
//!
//! # Algorithm
//!
//! Each call to [`AutoZoomManager::update`] runs one control step:
//!
//! 1. **Target**: the desired viewport is centered on the subject, with a
//!    scale at which the subject fills `target_subject_height_ratio` of it.
//! 2. **Error**: signed pan-x, pan-y and scale errors against the current
//!    viewport. All three are zero when the subject is already framed.
//! 3. **Smoothing**: each error passes through its own EMA filter.
//! 4. **Control**: each smoothed error drives its own PD controller.
//! 5. **Rate limit**: pan velocities are clamped to `±max_pan_speed`, the
//!    zoom velocity to `±max_zoom_speed`.
//! 6. **Integration**: velocities are integrated over `dt`. The viewport
//!    keeps the frame's aspect ratio and, by default, stays inside the frame.
//!
//! # Units
//!
//! The viewport is stored as a center plus a *scale*: the viewport size as a
//! fraction of the frame size (`1.0` = full frame, zoom factor = `1/scale`).
//! Pan errors are measured as fractions of the frame width and height, so
//! gains and `max_pan_speed` (frames per second) mean the same thing on a
//! unit frame and on a pixel frame. Zoom speed is in scale units per second.

use serde::{Deserialize, Serialize};
use skicam_common::config::FramingConfig;
use skicam_framing_model::geometry::{Point, Rect};

use crate::hysteresis::HysteresisGate;
use crate::pid::PidController;
use crate::smoothing::SmoothingFilter;
use crate::tuning::{Axis, TuningDelta};

/// Center and scale of the viewport within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub center_x: f64,
    pub center_y: f64,
    /// Viewport size as a fraction of the frame size.
    pub scale: f64,
}

impl ViewportState {
    /// The whole frame.
    pub fn full(frame: &Rect) -> Self {
        Self {
            center_x: frame.center_x(),
            center_y: frame.center_y(),
            scale: 1.0,
        }
    }

    /// Viewport rectangle in frame coordinates.
    pub fn to_rect(&self, frame: &Rect) -> Rect {
        Rect::from_center(
            self.center_x,
            self.center_y,
            self.scale * frame.width(),
            self.scale * frame.height(),
        )
    }

    fn is_finite(&self) -> bool {
        self.center_x.is_finite() && self.center_y.is_finite() && self.scale.is_finite()
    }
}

/// Smoothing and control for one axis.
#[derive(Debug, Clone)]
struct AxisChannel {
    filter: SmoothingFilter,
    pid: PidController,
}

struct AxisOutput {
    /// Smoothed error.
    error: f64,
    /// Unclamped controller output.
    velocity: f64,
}

impl AxisChannel {
    fn new(kp: f64, kd: f64, alpha: f64) -> Self {
        Self {
            filter: SmoothingFilter::new(alpha),
            pid: PidController::new(kp, kd),
        }
    }

    fn step(&mut self, raw_error: f64, dt: f64) -> AxisOutput {
        let error = self.filter.filter(raw_error);
        let velocity = self.pid.update(error, dt);
        AxisOutput { error, velocity }
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.pid.reset();
    }
}

/// Tunables as used for one step, after replacing invalid values.
struct StepLimits {
    max_pan_speed: f64,
    max_zoom_speed: f64,
    ratio: f64,
}

/// The framing controller.
///
/// One instance per camera session. Call [`update`](Self::update) once per
/// processed frame; tune at any time between updates. The manager does no
/// locking of its own: callers sharing it across threads wrap it in a
/// `Mutex` or otherwise guarantee a single writer.
#[derive(Debug, Clone)]
pub struct AutoZoomManager {
    /// Maximum pan velocity in frame widths (x) or heights (y) per second.
    pub max_pan_speed: f64,

    /// Maximum zoom velocity in scale units per second.
    pub max_zoom_speed: f64,

    /// Fraction of the viewport height the subject should fill.
    pub target_subject_height_ratio: f64,

    pan_x: AxisChannel,
    pan_y: AxisChannel,
    zoom: AxisChannel,

    /// Sticky-framing filters on the target center.
    intent: Option<(SmoothingFilter, SmoothingFilter)>,

    gate: Option<HysteresisGate>,

    frame: Rect,
    min_scale: f64,
    max_scale: f64,
    confine_to_frame: bool,

    state: ViewportState,
}

impl AutoZoomManager {
    /// Create a manager with default gains over the unit frame.
    pub fn new() -> Self {
        Self::from_config(&FramingConfig::default())
    }

    /// Create a manager from configuration over the unit frame.
    ///
    /// Out-of-range values are replaced rather than rejected; use
    /// [`FramingConfig::validate`] to refuse bad files up front.
    pub fn from_config(config: &FramingConfig) -> Self {
        let defaults = FramingConfig::default();

        let mut min_scale = positive_or(config.min_scale, defaults.min_scale);
        let mut max_scale = positive_or(config.max_scale, defaults.max_scale);
        if config.confine_to_frame {
            max_scale = max_scale.min(1.0);
        }
        if min_scale > max_scale {
            tracing::warn!(min_scale, max_scale, "Scale range inverted, using defaults");
            min_scale = defaults.min_scale;
            max_scale = defaults.max_scale;
        }

        let intent = config
            .intent_alpha
            .map(|alpha| (SmoothingFilter::new(alpha), SmoothingFilter::new(alpha)));

        let mut manager = Self {
            max_pan_speed: config.max_pan_speed,
            max_zoom_speed: config.max_zoom_speed,
            target_subject_height_ratio: config.target_subject_height_ratio,
            pan_x: AxisChannel::new(config.pan_kp, config.pan_kd, config.error_alpha),
            pan_y: AxisChannel::new(config.pan_kp, config.pan_kd, config.error_alpha),
            zoom: AxisChannel::new(config.zoom_kp, config.zoom_kd, config.error_alpha),
            intent,
            gate: config.hysteresis.as_ref().map(HysteresisGate::from_config),
            frame: Rect::UNIT,
            min_scale,
            max_scale,
            confine_to_frame: config.confine_to_frame,
            state: ViewportState::full(&Rect::UNIT),
        };
        manager.state.scale = manager.state.scale.clamp(min_scale, max_scale);
        manager
    }

    /// Use a different frame (e.g. pixel coordinates) and start full-frame.
    ///
    /// Inverted frames are normalized; an empty or non-finite frame keeps
    /// the unit frame.
    pub fn with_frame(mut self, frame: Rect) -> Self {
        let frame = frame.normalized();
        if frame.is_degenerate() {
            tracing::warn!(%frame, "Ignoring degenerate frame bounds");
        } else {
            self.frame = frame;
        }
        self.reset();
        self
    }

    /// Run one control step and return the new viewport.
    ///
    /// A frame with a non-finite or non-positive `dt`, or an empty or
    /// non-finite subject, is a hold frame: the previous viewport is
    /// returned and no state changes. Inverted subject rectangles are
    /// normalized first.
    pub fn update(&mut self, skier_rect: Rect, dt: f64) -> Rect {
        if !(dt.is_finite() && dt > 0.0) {
            tracing::debug!(dt, "Holding viewport: invalid time step");
            return self.viewport();
        }

        let subject = skier_rect.normalized();
        if !skier_rect.is_finite() || subject.is_degenerate() {
            tracing::debug!(%skier_rect, "Holding viewport: degenerate subject");
            return self.viewport();
        }

        let limits = self.step_limits();
        let next = self.step(&subject, dt, &limits);

        if next.is_finite() {
            self.state = next;
        } else {
            tracing::warn!(?next, "Discarding non-finite viewport, resetting controllers");
            self.reset_memory();
        }

        self.viewport()
    }

    fn step(&mut self, subject: &Rect, dt: f64, limits: &StepLimits) -> ViewportState {
        let prev = self.state;
        let target = self.framing_target(subject.center());

        let desired_scale = (subject.height() / (limits.ratio * self.frame.height()))
            .clamp(self.min_scale, self.max_scale);

        let (frame_w, frame_h) = (self.frame.width(), self.frame.height());
        let pan_x = self.pan_x.step((target.x - prev.center_x) / frame_w, dt);
        let pan_y = self.pan_y.step((target.y - prev.center_y) / frame_h, dt);
        let zoom = self.zoom.step(desired_scale - prev.scale, dt);

        let vx = pan_x.velocity.clamp(-limits.max_pan_speed, limits.max_pan_speed);
        let vy = pan_y.velocity.clamp(-limits.max_pan_speed, limits.max_pan_speed);
        let mut vz = zoom.velocity.clamp(-limits.max_zoom_speed, limits.max_zoom_speed);

        if let Some(gate) = self.gate.as_mut() {
            if !gate.should_zoom(zoom.error / prev.scale) {
                vz = 0.0;
            }
        }

        tracing::trace!(
            err_x = pan_x.error,
            err_y = pan_y.error,
            err_zoom = zoom.error,
            vx,
            vy,
            vz,
            scale = prev.scale,
            "Framing step"
        );

        let next = ViewportState {
            center_x: prev.center_x + vx * frame_w * dt,
            center_y: prev.center_y + vy * frame_h * dt,
            scale: (prev.scale + vz * dt).clamp(self.min_scale, self.max_scale),
        };

        if self.confine_to_frame {
            self.confine(&prev, next, limits.max_pan_speed * dt)
        } else {
            next
        }
    }

    /// Keep the viewport inside the frame without breaking the rate limits.
    ///
    /// Growth is capped so the previous center is at most one pan step away
    /// from the range of valid centers; clamping into that range then never
    /// moves the center further than the pan limit allows. `pan_step` is in
    /// frame fractions.
    fn confine(&self, prev: &ViewportState, next: ViewportState, pan_step: f64) -> ViewportState {
        let frame = &self.frame;
        let mut scale = next.scale;

        if scale > prev.scale {
            let room_x =
                (prev.center_x - frame.left).min(frame.right - prev.center_x) / frame.width();
            let room_y =
                (prev.center_y - frame.top).min(frame.bottom - prev.center_y) / frame.height();
            let fit = 2.0 * (room_x.min(room_y) + pan_step);
            scale = scale.min(fit).max(prev.scale);
        }

        let half_w = scale * frame.width() / 2.0;
        let half_h = scale * frame.height() / 2.0;

        ViewportState {
            center_x: clamp_between(next.center_x, frame.left + half_w, frame.right - half_w),
            center_y: clamp_between(next.center_y, frame.top + half_h, frame.bottom - half_h),
            scale,
        }
    }

    fn framing_target(&mut self, center: Point) -> Point {
        match self.intent.as_mut() {
            Some((fx, fy)) => Point::new(fx.filter(center.x), fy.filter(center.y)),
            None => center,
        }
    }

    /// Replace invalid tunables with defaults, writing the fix back so the
    /// warning is logged once.
    fn step_limits(&mut self) -> StepLimits {
        let defaults = FramingConfig::default();

        if self.max_pan_speed.is_nan() || self.max_pan_speed < 0.0 {
            tracing::warn!(value = self.max_pan_speed, "Invalid max_pan_speed, using default");
            self.max_pan_speed = defaults.max_pan_speed;
        }
        if self.max_zoom_speed.is_nan() || self.max_zoom_speed < 0.0 {
            tracing::warn!(value = self.max_zoom_speed, "Invalid max_zoom_speed, using default");
            self.max_zoom_speed = defaults.max_zoom_speed;
        }
        let ratio = self.target_subject_height_ratio;
        if !ratio.is_finite() || ratio <= 0.0 {
            tracing::warn!(value = ratio, "Invalid target_subject_height_ratio, using default");
            self.target_subject_height_ratio = defaults.target_subject_height_ratio;
        }

        StepLimits {
            max_pan_speed: self.max_pan_speed,
            max_zoom_speed: self.max_zoom_speed,
            ratio: self.target_subject_height_ratio,
        }
    }

    /// Update gains and smoothing on all three axes.
    ///
    /// `None` leaves a value unchanged. Invalid values are skipped with a
    /// warning. Controller and filter memory is kept.
    pub fn tune(&mut self, kp: Option<f64>, kd: Option<f64>, alpha: Option<f64>) {
        self.apply_tuning(&TuningDelta::new(kp, kd, alpha));
    }

    /// Apply a tuning delta uniformly to all axes.
    pub fn apply_tuning(&mut self, delta: &TuningDelta) {
        for axis in Axis::ALL {
            self.tune_axis(axis, delta);
        }
    }

    /// Apply a tuning delta to a single axis.
    pub fn tune_axis(&mut self, axis: Axis, delta: &TuningDelta) {
        if delta.is_empty() {
            return;
        }
        let channel = self.channel_mut(axis);
        delta.apply_gains(axis, &mut channel.pid);
        delta.apply_alpha(&mut channel.filter);
        tracing::debug!(?axis, ?delta, "Applied tuning");
    }

    /// Current `(kp, kd)` of an axis.
    pub fn gains(&self, axis: Axis) -> (f64, f64) {
        let pid = &self.channel(axis).pid;
        (pid.kp, pid.kd)
    }

    /// Current error smoothing factor of an axis.
    pub fn alpha(&self, axis: Axis) -> f64 {
        self.channel(axis).filter.alpha()
    }

    fn channel(&self, axis: Axis) -> &AxisChannel {
        match axis {
            Axis::PanX => &self.pan_x,
            Axis::PanY => &self.pan_y,
            Axis::Zoom => &self.zoom,
        }
    }

    fn channel_mut(&mut self, axis: Axis) -> &mut AxisChannel {
        match axis {
            Axis::PanX => &mut self.pan_x,
            Axis::PanY => &mut self.pan_y,
            Axis::Zoom => &mut self.zoom,
        }
    }

    /// Align the controller with a zoom level set elsewhere (e.g. after a
    /// manual zoom) and drop stale filter and derivative memory.
    ///
    /// `zoom_factor` is the optical equivalent, `1.0` = full frame.
    pub fn sync_zoom(&mut self, zoom_factor: f64) {
        if zoom_factor.is_nan() {
            tracing::warn!("Ignoring NaN zoom factor");
            return;
        }
        let scale = (1.0 / zoom_factor.max(1.0)).clamp(self.min_scale, self.max_scale);
        let prev = self.state;
        let synced = ViewportState { scale, ..prev };
        self.state = if self.confine_to_frame {
            self.confine(&prev, synced, f64::INFINITY)
        } else {
            synced
        };
        self.reset_memory();
        tracing::debug!(zoom_factor, scale = self.state.scale, "Synced zoom state");
    }

    /// Return to a full-frame viewport and clear all controller memory.
    pub fn reset(&mut self) {
        let mut state = ViewportState::full(&self.frame);
        state.scale = state.scale.clamp(self.min_scale, self.max_scale);
        self.state = state;
        self.reset_memory();
    }

    fn reset_memory(&mut self) {
        self.pan_x.reset();
        self.pan_y.reset();
        self.zoom.reset();
        if let Some((fx, fy)) = self.intent.as_mut() {
            fx.reset();
            fy.reset();
        }
        if let Some(gate) = self.gate.as_mut() {
            gate.reset();
        }
    }

    /// The current viewport rectangle.
    pub fn viewport(&self) -> Rect {
        self.state.to_rect(&self.frame)
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Optical zoom equivalent of the current viewport.
    pub fn zoom_factor(&self) -> f64 {
        1.0 / self.state.scale
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Whether the hysteresis gate currently allows zooming. Always true
    /// when no gate is configured.
    pub fn is_zooming(&self) -> bool {
        self.gate.as_ref().map_or(true, HysteresisGate::is_active)
    }
}

impl Default for AutoZoomManager {
    fn default() -> Self {
        Self::new()
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// `clamp` that tolerates `lo > hi` from rounding by returning the midpoint.
fn clamp_between(value: f64, lo: f64, hi: f64) -> f64 {
    if lo > hi {
        (lo + hi) / 2.0
    } else {
        value.clamp(lo, hi)
    }
}
