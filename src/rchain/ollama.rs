//! Model listing for a local Ollama server.

use std::env;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::selection::SelectionError;

pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";

/// One installed model as reported by `GET /api/tags`. Other metadata is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocalModel {
    pub model: String,
}

impl LocalModel {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    host: String,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(host: impl AsRef<str>) -> Self {
        Self {
            host: normalize_host(host.as_ref()),
            http: reqwest::Client::new(),
        }
    }

    /// Uses the configured host, then `OLLAMA_HOST`, then the local default.
    pub fn from_settings(configured: Option<&str>) -> Self {
        let from_env = env::var("OLLAMA_HOST").ok();
        let host = configured
            .or(from_env.as_deref())
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .unwrap_or(DEFAULT_OLLAMA_HOST);
        Self::new(host)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Lists installed models.
    ///
    /// A body without a `models` field and an empty list are reported as
    /// their own error variants so callers can treat them as soft failures.
    pub async fn list_models(&self) -> Result<Vec<LocalModel>, SelectionError> {
        let url = format!("{}/api/tags", self.host);
        debug!(%url, "listing local models");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| SelectionError::Unreachable {
                host: self.host.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SelectionError::Api { status, body });
        }

        let mut body: Value = response
            .json()
            .await
            .map_err(|err| SelectionError::Malformed(err.to_string()))?;

        if body.get("models").is_none_or(Value::is_null) {
            return Err(SelectionError::MissingModels { raw: body });
        }
        let models: Vec<LocalModel> = serde_json::from_value(body["models"].take())
            .map_err(|err| SelectionError::Malformed(err.to_string()))?;

        debug!(count = models.len(), "local models listed");
        if models.is_empty() {
            return Err(SelectionError::NoModels);
        }
        Ok(models)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
