//! SkiCam Framing Model
//!
//! Defines the data contracts shared by the framing controller and its
//! collaborators:
//! - **Geometry:** immutable `Point` and `Rect` value types
//! - **Observations:** per-frame subject detections and emitted viewports,
//!   stored as JSONL
//!
//! Coordinates live in whatever space the caller uses for the frame
//! (normalized `[0.0, 1.0]` by default, or pixels). The controller only
//! requires that subject and viewport share that space.

pub mod geometry;
pub mod observation;

pub use geometry::*;
pub use observation::*;
