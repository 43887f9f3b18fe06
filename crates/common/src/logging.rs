//! Logging and tracing initialization.
//!
//! The control loop logs through `tracing` only; the binary decides where
//! the output goes. Per-frame diagnostics are emitted at `trace`, so a
//! `debug` filter stays readable at 60 fps.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::SkicamResult;

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level`. When `config.file` is
/// set, output is appended to that file without ANSI colours. Only the
/// first call installs a subscriber; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) -> SkicamResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let builder = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false);
            if config.json {
                install(builder.json().finish());
            } else {
                install(builder.with_target(true).finish());
            }
        }
        None if config.json => {
            install(
                fmt::Subscriber::builder()
                    .with_env_filter(env_filter)
                    .json()
                    .finish(),
            );
        }
        None => {
            install(
                fmt::Subscriber::builder()
                    .with_env_filter(env_filter)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .finish(),
            );
        }
    }

    Ok(())
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    // Defaults never name a file, so this cannot fail.
    let _ = init_logging(&LoggingConfig::default());
}

/// Filter directive for the CLI `--verbose` switch.
pub fn level_for_verbosity(verbose: bool) -> &'static str {
    if verbose {
        "skicam=debug,info"
    } else {
        "info"
    }
}

fn install<S>(subscriber: S)
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Global tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(false), "info");
        assert!(level_for_verbosity(true).contains("debug"));
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        init_default_logging();
        init_default_logging();
        tracing::info!("logging initialized twice");
    }
}
