//! CLI entry points shared by `llmkit` and the standalone binaries.

use std::path::PathBuf;

use clap::Args;

use crate::config::{Settings, load_settings};
use crate::telemetry;

pub mod config;
pub mod select_model;

/// Flags accepted by every command that talks to a service.
#[derive(Debug, Args, Clone, Default)]
pub struct CommonArgs {
    /// Settings file (defaults to LLMKIT_CONFIG, then ~/.config/llmkit/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Log requests to stderr
    #[arg(long)]
    pub verbose: bool,
    /// Suppress all logging
    #[arg(long)]
    pub quiet: bool,
}

/// Starts logging, loads `.env` and reads the settings file.
///
/// Variables already present in the environment take precedence over `.env`.
pub fn prepare(common: &CommonArgs) -> Result<Settings, String> {
    telemetry::init(common.verbose, common.quiet);

    match dotenv::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env file"),
    }

    load_settings(common.config.as_deref()).map_err(|err| err.to_string())
}
