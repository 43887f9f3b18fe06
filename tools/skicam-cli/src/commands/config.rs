//! Show the effective configuration.

use std::path::PathBuf;

use skicam_common::config::{config_file_path, AppConfig};

pub fn run(loaded: AppConfig, path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = match path {
        Some(path) => {
            let config = AppConfig::load_from(&path)
                .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
            println!("# {} (valid)", path.display());
            config
        }
        None => {
            println!("# default location: {}", config_file_path().display());
            loaded
        }
    };

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
