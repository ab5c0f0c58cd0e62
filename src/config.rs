use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::rchain::provider::{AskOptions, Provider};

/// Per-provider overrides from the `[providers.<name>]` tables.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProviderProfile {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Option<u64>,
    pub retries: Option<u32>,
    pub retry_delay: Option<u64>,
}

impl ProviderProfile {
    pub fn ask_options(&self) -> AskOptions {
        let defaults = AskOptions::default();
        AskOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout,
            retries: self.retries.unwrap_or(defaults.retries),
            retry_delay_ms: self.retry_delay.unwrap_or(defaults.retry_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProvidersSection {
    #[serde(default)]
    pub groq: ProviderProfile,
    #[serde(default)]
    pub google: ProviderProfile,
    #[serde(default)]
    pub openrouter: ProviderProfile,
}

impl ProvidersSection {
    pub fn profile(&self, provider: Provider) -> &ProviderProfile {
        match provider {
            Provider::Groq => &self.groq,
            Provider::Google => &self.google,
            Provider::OpenRouter => &self.openrouter,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OllamaSection {
    pub host: Option<String>,
}

/// Settings loaded once at startup and handed to each component.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub providers: ProvidersSection,
    #[serde(default)]
    pub ollama: OllamaSection,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid config file '{}': {message}", .path.display())]
    Invalid { path: PathBuf, message: String },
    #[error("Cannot resolve config path: set LLMKIT_CONFIG or HOME/XDG_CONFIG_HOME.")]
    NoPath,
}

/// Loads settings for a run.
///
/// An explicit path (flag or `LLMKIT_CONFIG`) must exist. The default
/// location is optional; without it every provider uses built-in defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    if let Some(path) = explicit_path(explicit) {
        return read_settings(&path);
    }

    match default_path() {
        Some(path) if path.is_file() => read_settings(&path),
        _ => Ok(Settings::default()),
    }
}

/// Parses and validates the settings file, returning its path.
pub fn validate_config(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = match explicit_path(explicit) {
        Some(path) => path,
        None => default_path().ok_or(ConfigError::NoPath)?,
    };
    read_settings(&path)?;
    Ok(path)
}

pub fn parse_settings(raw: &str, path: &Path) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&settings).map_err(|message| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    })?;
    Ok(settings)
}

fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&raw, path)
}

fn validate(settings: &Settings) -> Result<(), String> {
    if settings.providers.google.model.is_some() {
        return Err(
            "providers.google.model is not configurable; Google always uses gemini-pro."
                .to_string(),
        );
    }

    for provider in Provider::ALL {
        let profile = settings.providers.profile(provider);
        if let Some(base_url) = &profile.base_url {
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(format!(
                    "providers.{}.base_url must start with http:// or https://",
                    provider.as_str()
                ));
            }
        }
        if let Some(model) = &profile.model {
            if model.trim().is_empty() {
                return Err(format!("providers.{}.model must not be empty", provider.as_str()));
            }
        }
        if let Some(temperature) = profile.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!(
                    "providers.{}.temperature must be between 0.0 and 2.0",
                    provider.as_str()
                ));
            }
        }
    }

    if let Some(host) = &settings.ollama.host {
        if host.trim().is_empty() {
            return Err("ollama.host must not be empty".to_string());
        }
    }

    Ok(())
}

fn explicit_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    env::var("LLMKIT_CONFIG")
        .ok()
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

fn default_path() -> Option<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed).join("llmkit").join("config.toml"));
        }
    }

    let home = env::var("HOME").ok()?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("llmkit")
            .join("config.toml"),
    )
}
