//! Google Generative AI `generateContent` wire format.

use serde::{Deserialize, Serialize};

use crate::rchain::ai::{AIMessage, Usage};
use crate::rchain::chat_models::ChatClient;
use crate::rchain::chat_runtime::{Auth, RequestFailure, RetryConfig, send_chat_request_with_retry};
use crate::rchain::provider::{ChatMessage, ProviderError};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

pub(crate) fn generate_content_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

fn to_contents(messages: &[ChatMessage]) -> Vec<Content> {
    messages
        .iter()
        .map(|message| Content {
            role: Some(if message.role == "assistant" { "model" } else { "user" }.to_string()),
            parts: vec![Part {
                text: Some(message.content.clone()),
            }],
        })
        .collect()
}

pub(crate) async fn generate_content(
    client: &ChatClient,
    messages: &[ChatMessage],
) -> Result<AIMessage, ProviderError> {
    let provider = client.provider;
    let options = client.options;

    let generation_config = (options.temperature.is_some() || options.max_tokens.is_some())
        .then_some(GenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_tokens,
        });
    let payload = GenerateContentRequest {
        contents: to_contents(messages),
        generation_config,
    };

    let response = send_chat_request_with_retry(
        &client.http,
        &generate_content_url(&client.base_url, &client.model),
        Auth::Header(API_KEY_HEADER, &client.api_key),
        &payload,
        RetryConfig {
            timeout_secs: options.timeout_secs,
            retries: options.retries,
            retry_delay_ms: options.retry_delay_ms,
        },
    )
    .await
    .map_err(|failure| match failure {
        RequestFailure::Request(source) => ProviderError::Request { provider, source },
        RequestFailure::Api { status, body } => ProviderError::Api {
            provider,
            status,
            body,
        },
    })?;

    let body: GenerateContentResponse = response
        .json()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;

    let content = body
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.is_empty())
        .ok_or(ProviderError::EmptyResponse { provider })?;
    let usage = body.usage_metadata.map(|usage| Usage {
        prompt_tokens: usage.prompt_token_count,
        completion_tokens: usage.candidates_token_count,
        total_tokens: usage.total_token_count,
    });

    Ok(AIMessage { content, usage })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::generate_content_url;
    use crate::config::ProviderProfile;
    use crate::rchain::chat_models::get_google_client;
    use crate::rchain::provider::{Credentials, Provider, ProviderError};

    #[test]
    fn url_targets_model_method() {
        assert_eq!(
            generate_content_url("https://generativelanguage.googleapis.com/v1beta", "gemini-pro"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn joins_candidate_parts_and_reads_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .and(header("x-goog-api-key", "goog"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "What is the future of AI?"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Bright, "}, {"text": "mostly."}]}
                }],
                "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 3, "totalTokenCount": 10}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = ProviderProfile {
            base_url: Some(format!("{}/v1beta", server.uri())),
            ..ProviderProfile::default()
        };
        let credentials = Credentials::new().with_key(Provider::Google, "goog");
        let client = get_google_client(&credentials, &profile).expect("client should build");
        let reply = client
            .invoke("What is the future of AI?")
            .await
            .expect("invoke should succeed");

        assert_eq!(reply.content, "Bright, mostly.");
        let usage = reply.usage.expect("usage should be parsed");
        assert_eq!(usage.prompt_tokens, Some(7));
        assert_eq!(usage.total_tokens, Some(10));
    }

    #[tokio::test]
    async fn blocked_prompt_without_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let profile = ProviderProfile {
            base_url: Some(server.uri()),
            ..ProviderProfile::default()
        };
        let credentials = Credentials::new().with_key(Provider::Google, "goog");
        let client = get_google_client(&credentials, &profile).expect("client should build");
        let err = client.invoke("hi").await.expect_err("no candidates should fail");

        assert!(matches!(
            err,
            ProviderError::EmptyResponse {
                provider: Provider::Google
            }
        ));
    }
}
