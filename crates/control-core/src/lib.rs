//! SkiCam Control Core: the framing controller
//!
//! Turns per-frame subject detections into a smooth camera viewport:
//! - **PID:** per-axis proportional-derivative control
//! - **Smoothing:** EMA filtering of noisy error signals
//! - **Auto-Zoom:** pan and zoom toward the subject under velocity limits
//! - **Session:** timestamped stream driver with frame skipping and manual mode
//!
//! This crate is pure computation with no I/O. All inputs are data and
//! all outputs are data.

pub mod auto_zoom;
pub mod hysteresis;
pub mod pid;
pub mod session;
pub mod smoothing;
pub mod tuning;

pub use auto_zoom::{AutoZoomManager, ViewportState};
pub use hysteresis::HysteresisGate;
pub use pid::PidController;
pub use session::{FramingMode, FramingSession, SessionStats};
pub use smoothing::SmoothingFilter;
pub use tuning::{Axis, TuningDelta};
