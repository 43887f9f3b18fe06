//! SkiCam Common Utilities
//!
//! Shared infrastructure for all SkiCam crates:
//! - Error types and result aliases
//! - Frame clocks and throttling for the per-frame control loop
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
