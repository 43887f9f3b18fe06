//! Run a recorded detection stream through the controller.

use std::path::PathBuf;

use skicam_common::config::FramingConfig;
use skicam_control_core::FramingSession;
use skicam_framing_model::geometry::Rect;
use skicam_framing_model::observation::parse_observations;

pub fn run(
    framing: &FramingConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    frame_skip: Option<u32>,
) -> anyhow::Result<()> {
    println!("Replaying observations from: {}", path.display());

    let content = std::fs::read_to_string(&path)
        .map_err(|_| anyhow::anyhow!("Observations file not found: {}", path.display()))?;
    let observations = parse_observations(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse observations: {e}"))?;

    println!("  Loaded {} observations", observations.len());
    if observations.is_empty() {
        println!("  Nothing to replay.");
        return Ok(());
    }

    let mut config = framing.clone();
    if let Some(skip) = frame_skip {
        config.frame_skip = skip.max(1);
    }

    let mut session = FramingSession::from_config(&config, Rect::UNIT);
    let samples = session.run(&observations);
    let stats = session.finish();

    super::print_stats(&stats, &samples);
    if let Some(output) = output {
        super::write_samples(&output, &samples)?;
    }

    println!("\nReplay complete.");
    Ok(())
}
