pub mod config;
pub mod replay;
pub mod simulate;

use std::path::Path;

use skicam_control_core::SessionStats;
use skicam_framing_model::observation::{serialize_viewports, ViewportSample};

/// Print the counters shared by `simulate` and `replay`.
fn print_stats(stats: &SessionStats, samples: &[ViewportSample]) {
    println!("  Frames: {} ({} processed, {} skipped)", stats.frames, stats.processed, stats.throttled);
    if stats.missing > 0 {
        println!("  Frames without a detection: {}", stats.missing);
    }
    if let Some(last) = samples.last() {
        println!("  Final viewport: {}", last.viewport);
        println!("  Final zoom: {:.2}x", last.zoom_factor);
    }
}

/// Write emitted viewports as JSONL.
fn write_samples(path: &Path, samples: &[ViewportSample]) -> anyhow::Result<()> {
    let jsonl = serialize_viewports(samples)?;
    std::fs::write(path, jsonl)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
    println!("  Viewports written to: {}", path.display());
    Ok(())
}
