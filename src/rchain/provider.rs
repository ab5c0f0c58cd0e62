use std::env;
use std::fmt;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Groq,
    Google,
    OpenRouter,
}

impl Provider {
    /// Smoke-test order.
    pub const ALL: [Provider; 3] = [Provider::Groq, Provider::Google, Provider::OpenRouter];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Google => "google",
            Self::OpenRouter => "openrouter",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Groq => "Groq",
            Self::Google => "Google",
            Self::OpenRouter => "OpenRouter",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

pub fn default_base_url(provider: Provider) -> &'static str {
    match provider {
        Provider::Groq => "https://api.groq.com/openai/v1",
        Provider::Google => "https://generativelanguage.googleapis.com/v1beta",
        Provider::OpenRouter => "https://openrouter.ai/api/v1",
    }
}

pub fn default_model(provider: Provider) -> &'static str {
    match provider {
        Provider::Groq => "llama-3.1-8b-instant",
        Provider::Google => "gemini-pro",
        Provider::OpenRouter => "google/gemini-pro",
    }
}

pub fn api_key_env(provider: Provider) -> &'static str {
    match provider {
        Provider::Groq => "GROQ_API_KEY",
        Provider::Google => "GOOGLE_API_KEY",
        Provider::OpenRouter => "OPENROUTER_API_KEY",
    }
}

/// API keys for the hosted providers.
///
/// Blank values are stored as absent so a client can never be built from an
/// empty key.
#[derive(Clone, Default)]
pub struct Credentials {
    groq: Option<String>,
    google: Option<String>,
    openrouter: Option<String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every provider key from the process environment.
    pub fn from_env() -> Self {
        let mut credentials = Self::new();
        for provider in Provider::ALL {
            if let Ok(value) = env::var(api_key_env(provider)) {
                credentials = credentials.with_key(provider, value);
            }
        }
        credentials
    }

    pub fn with_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        let key = key.into();
        let key = (!key.trim().is_empty()).then(|| key.trim().to_string());
        *self.slot_mut(provider) = key;
        self
    }

    pub fn is_present(&self, provider: Provider) -> bool {
        self.slot(provider).is_some()
    }

    /// Returns the key for `provider` or the configuration error naming its
    /// environment variable.
    pub fn api_key(&self, provider: Provider) -> Result<&str, ProviderError> {
        self.slot(provider)
            .as_deref()
            .ok_or(ProviderError::MissingApiKey {
                provider,
                key_env: api_key_env(provider),
            })
    }

    fn slot(&self, provider: Provider) -> &Option<String> {
        match provider {
            Provider::Groq => &self.groq,
            Provider::Google => &self.google,
            Provider::OpenRouter => &self.openrouter,
        }
    }

    fn slot_mut(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::Groq => &mut self.groq,
            Provider::Google => &mut self.google,
            Provider::OpenRouter => &mut self.openrouter,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("groq", &self.groq.is_some())
            .field("google", &self.google.is_some())
            .field("openrouter", &self.openrouter.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AskOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            temperature: None,
            max_tokens: None,
            timeout_secs: None,
            retries: 0,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{key_env} not found in environment or .env file")]
    MissingApiKey {
        provider: Provider,
        key_env: &'static str,
    },
    #[error("{provider} request failed: {source}")]
    Request {
        provider: Provider,
        source: reqwest::Error,
    },
    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: Provider,
        status: StatusCode,
        body: String,
    },
    #[error("{provider} response did not contain message content")]
    EmptyResponse { provider: Provider },
}

impl ProviderError {
    pub fn provider(&self) -> Provider {
        match self {
            Self::MissingApiKey { provider, .. }
            | Self::Request { provider, .. }
            | Self::Api { provider, .. }
            | Self::EmptyResponse { provider } => *provider,
        }
    }

    /// True for the configuration failure raised before any request is made.
    pub fn is_missing_key(&self) -> bool {
        matches!(self, Self::MissingApiKey { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{Credentials, Provider, ProviderError, api_key_env};

    #[test]
    fn missing_key_error_names_the_variable() {
        let credentials = Credentials::new();
        for provider in Provider::ALL {
            let err = credentials
                .api_key(provider)
                .expect_err("empty credentials should fail");
            assert!(err.is_missing_key());
            assert_eq!(err.provider(), provider);
            assert!(err.to_string().contains(api_key_env(provider)));
        }
    }

    #[test]
    fn blank_keys_are_treated_as_missing() {
        let credentials = Credentials::new()
            .with_key(Provider::Groq, "")
            .with_key(Provider::Google, "   ");
        assert!(!credentials.is_present(Provider::Groq));
        assert!(matches!(
            credentials.api_key(Provider::Google),
            Err(ProviderError::MissingApiKey {
                key_env: "GOOGLE_API_KEY",
                ..
            })
        ));
    }

    #[test]
    fn keys_are_trimmed_and_scoped_to_one_provider() {
        let credentials = Credentials::new().with_key(Provider::OpenRouter, " sk-or \n");
        assert_eq!(credentials.api_key(Provider::OpenRouter).ok(), Some("sk-or"));
        assert!(!credentials.is_present(Provider::Groq));
    }

    #[test]
    fn debug_output_hides_key_values() {
        let credentials = Credentials::new().with_key(Provider::Groq, "gsk-secret");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("gsk-secret"));
        assert!(rendered.contains("groq: true"));
    }
}
