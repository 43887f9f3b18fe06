//! Application configuration.
//!
//! The config file is read once at startup and never written back: live
//! tuning happens in memory on the running controller.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SkicamError, SkicamResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Framing controller defaults.
    pub framing: FramingConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Initial gains, rates and limits for the auto-zoom controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Proportional gain of both pan axes.
    pub pan_kp: f64,

    /// Derivative gain of both pan axes.
    pub pan_kd: f64,

    /// Proportional gain of the zoom axis.
    pub zoom_kp: f64,

    /// Derivative gain of the zoom axis.
    pub zoom_kd: f64,

    /// EMA weight applied to the per-axis error signals, in (0, 1].
    pub error_alpha: f64,

    /// Very slow EMA on the target center ("sticky framing").
    /// `None` tracks the subject center directly.
    pub intent_alpha: Option<f64>,

    /// Maximum pan velocity in frame widths (x) or heights (y) per second.
    pub max_pan_speed: f64,

    /// Maximum zoom velocity in scale units per second.
    pub max_zoom_speed: f64,

    /// Fraction of the viewport height the subject should fill.
    pub target_subject_height_ratio: f64,

    /// Smallest viewport scale (0.05 = 20x zoom).
    pub min_scale: f64,

    /// Largest viewport scale (1.0 = full frame).
    pub max_scale: f64,

    /// Keep the viewport inside the frame bounds.
    pub confine_to_frame: bool,

    /// Zoom start/stop thresholds. `None` zooms continuously.
    pub hysteresis: Option<HysteresisConfig>,

    /// Nominal capture rate. Steps untimestamped streams and is the
    /// default `simulate` rate.
    pub nominal_fps: u32,

    /// Run the controller on every Nth frame only.
    pub frame_skip: u32,
}

/// Relative zoom-error thresholds for the hysteresis gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HysteresisConfig {
    /// Start zooming once |relative error| exceeds this.
    pub trigger: f64,

    /// Stop zooming once |relative error| drops below this.
    pub stop: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "skicam_control_core=trace,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            pan_kp: 1.0,
            pan_kd: 0.5,
            zoom_kp: 1.0,
            zoom_kd: 0.5,
            error_alpha: 0.2,
            intent_alpha: None,
            max_pan_speed: 5.0,
            max_zoom_speed: 5.0,
            target_subject_height_ratio: 0.8,
            min_scale: 0.05,
            max_scale: 1.0,
            confine_to_frame: true,
            hysteresis: None,
            nominal_fps: 60,
            frame_skip: 1,
        }
    }
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        Self {
            trigger: 0.10,
            stop: 0.05,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl FramingConfig {
    /// Reject values the controller would otherwise silently replace.
    pub fn validate(&self) -> SkicamResult<()> {
        for (name, gain) in [("pan_kp", self.pan_kp), ("zoom_kp", self.zoom_kp)] {
            if !gain.is_finite() || gain <= 0.0 {
                return Err(SkicamError::config(format!(
                    "{name} must be a positive finite number, got {gain}"
                )));
            }
        }
        for (name, gain) in [("pan_kd", self.pan_kd), ("zoom_kd", self.zoom_kd)] {
            if !gain.is_finite() || gain < 0.0 {
                return Err(SkicamError::config(format!(
                    "{name} must be a non-negative finite number, got {gain}"
                )));
            }
        }

        check_alpha("error_alpha", self.error_alpha)?;
        if let Some(alpha) = self.intent_alpha {
            check_alpha("intent_alpha", alpha)?;
        }

        for (name, speed) in [
            ("max_pan_speed", self.max_pan_speed),
            ("max_zoom_speed", self.max_zoom_speed),
        ] {
            if speed.is_nan() || speed < 0.0 {
                return Err(SkicamError::config(format!(
                    "{name} must be non-negative, got {speed}"
                )));
            }
        }

        let ratio = self.target_subject_height_ratio;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(SkicamError::config(format!(
                "target_subject_height_ratio must be positive, got {ratio}"
            )));
        }

        if !(self.min_scale.is_finite() && self.max_scale.is_finite())
            || self.min_scale <= 0.0
            || self.min_scale > self.max_scale
        {
            return Err(SkicamError::config(format!(
                "scale range [{}, {}] is invalid",
                self.min_scale, self.max_scale
            )));
        }
        if self.confine_to_frame && self.max_scale > 1.0 {
            return Err(SkicamError::config(
                "max_scale cannot exceed 1.0 while confine_to_frame is enabled",
            ));
        }

        if let Some(gate) = self.hysteresis {
            if !(gate.stop >= 0.0 && gate.trigger >= gate.stop) {
                return Err(SkicamError::config(format!(
                    "hysteresis thresholds must satisfy 0 <= stop <= trigger, got stop={} trigger={}",
                    gate.stop, gate.trigger
                )));
            }
        }

        if self.nominal_fps == 0 {
            return Err(SkicamError::config("nominal_fps must be at least 1"));
        }
        if self.frame_skip == 0 {
            return Err(SkicamError::config("frame_skip must be at least 1"));
        }

        Ok(())
    }
}

fn check_alpha(name: &str, alpha: f64) -> SkicamResult<()> {
    if alpha.is_finite() && alpha > 0.0 && alpha <= 1.0 {
        Ok(())
    } else {
        Err(SkicamError::config(format!(
            "{name} must be in (0, 1], got {alpha}"
        )))
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %config_path.display(), error = %e, "Ignoring config file");
                }
            }
        }
        Self::default()
    }

    /// Load and validate a config file.
    pub fn load_from(path: &Path) -> SkicamResult<Self> {
        if !path.exists() {
            return Err(SkicamError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.framing.validate()?;
        Ok(config)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("skicam").join("config.json")
}
