//! Run the controller against a synthetic skier path.

use std::f64::consts::TAU;
use std::path::PathBuf;

use clap::ValueEnum;
use skicam_common::clock::secs_to_ns;
use skicam_common::config::FramingConfig;
use skicam_common::error::{SkicamError, SkicamResult};
use skicam_control_core::FramingSession;
use skicam_framing_model::geometry::Rect;
use skicam_framing_model::observation::SubjectObservation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Centered skier that jumps right by 0.05 a third of the way in
    Step,
    /// Skier crossing the frame while moving away from the camera
    Sweep,
    /// Stationary skier with noisy detections
    Jitter,
}

pub struct SimulateArgs {
    pub scenario: Scenario,
    pub frames: u32,
    pub fps: Option<u32>,
    pub kp: Option<f64>,
    pub kd: Option<f64>,
    pub alpha: Option<f64>,
}

pub fn run(framing: &FramingConfig, args: SimulateArgs, output: Option<PathBuf>) -> anyhow::Result<()> {
    let fps = capture_rate(args.fps, framing.nominal_fps)?;
    println!(
        "Simulating {:?} scenario: {} frames at {} fps",
        args.scenario, args.frames, fps
    );

    let observations = skier_path(args.scenario, args.frames, fps);

    let mut session = FramingSession::from_config(framing, Rect::UNIT);
    session.manager_mut().tune(args.kp, args.kd, args.alpha);

    let samples = session.run(&observations);

    let mut max_pan_step: f64 = 0.0;
    for pair in samples.windows(2) {
        let dx = pair[1].viewport.center_x() - pair[0].viewport.center_x();
        let dy = pair[1].viewport.center_y() - pair[0].viewport.center_y();
        max_pan_step = max_pan_step.max(dx.abs()).max(dy.abs());
    }

    // Observations are in timestamp order, one per frame.
    let (error_sum, tracked) = samples
        .iter()
        .filter_map(|sample| {
            let idx = observations
                .binary_search_by_key(&sample.timestamp_ns, |obs| obs.timestamp_ns)
                .ok()?;
            let skier = observations[idx].rect?;
            Some(sample.viewport.center().distance_to(&skier.center()))
        })
        .fold((0.0, 0usize), |(sum, n), error| (sum + error, n + 1));

    let stats = session.finish();
    super::print_stats(&stats, &samples);
    println!("  Largest pan step: {max_pan_step:.4}");
    if tracked > 0 {
        println!("  Mean center error: {:.4}", error_sum / tracked as f64);
    }

    if let Some(output) = output {
        super::write_samples(&output, &samples)?;
    }

    println!("\nSimulation complete.");
    Ok(())
}

/// Requested rate, or the configured nominal rate when none was given.
fn capture_rate(requested: Option<u32>, nominal_fps: u32) -> SkicamResult<u32> {
    match requested.unwrap_or(nominal_fps) {
        0 => Err(SkicamError::invalid_input("--fps must be at least 1")),
        fps => Ok(fps),
    }
}

/// Deterministic skier detections for a scenario.
fn skier_path(scenario: Scenario, frames: u32, fps: u32) -> Vec<SubjectObservation> {
    let frame_secs = 1.0 / fps as f64;
    let last = frames.saturating_sub(1).max(1) as f64;

    (0..frames)
        .map(|i| {
            let u = i as f64 / last;
            let rect = match scenario {
                Scenario::Step => {
                    let cx = if i < frames / 3 { 0.5 } else { 0.55 };
                    Rect::from_center(cx, 0.5, 0.2, 0.4)
                }
                Scenario::Sweep => {
                    let h = 0.4 - 0.25 * u;
                    Rect::from_center(0.2 + 0.6 * u, 0.5 + 0.1 * (2.0 * TAU * u).sin(), 0.45 * h, h)
                }
                Scenario::Jitter => Rect::from_center(
                    0.5 + 0.01 * noise(i, 1),
                    0.5 + 0.01 * noise(i, 2),
                    0.12,
                    0.3 * (1.0 + 0.03 * noise(i, 3)),
                ),
            };
            SubjectObservation::detected(secs_to_ns(i as f64 * frame_secs), rect)
        })
        .collect()
}

/// Repeatable value in [-1, 1) for frame `i` on channel `seed`.
fn noise(i: u32, seed: u32) -> f64 {
    let x = (i as f64 * 12.9898 + seed as f64 * 78.233).sin() * 43_758.545_3;
    2.0 * (x - x.floor()) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_deterministic_and_valid() {
        for scenario in [Scenario::Step, Scenario::Sweep, Scenario::Jitter] {
            let a = skier_path(scenario, 90, 30);
            assert_eq!(a, skier_path(scenario, 90, 30));
            assert_eq!(a.len(), 90);
            for obs in &a {
                let rect = obs.rect.expect("synthetic paths always detect");
                assert!(!rect.is_degenerate());
                assert!(Rect::UNIT.contains_rect(&rect, 1e-9));
            }
        }
    }

    #[test]
    fn test_step_scenario_jumps_once() {
        let path = skier_path(Scenario::Step, 30, 30);
        let centers: Vec<f64> = path.iter().filter_map(|o| o.rect).map(|r| r.center_x()).collect();
        assert!((centers[9] - 0.5).abs() < 1e-12);
        assert!((centers[10] - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_capture_rate_defaults_to_nominal() {
        assert_eq!(capture_rate(None, 60).unwrap(), 60);
        assert_eq!(capture_rate(Some(24), 60).unwrap(), 24);
        assert!(matches!(
            capture_rate(Some(0), 60),
            Err(SkicamError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_noise_range() {
        for i in 0..500 {
            let n = noise(i, 7);
            assert!((-1.0..1.0).contains(&n));
        }
    }
}
