//! OpenAI-compatible chat-completions wire format, spoken by Groq and
//! OpenRouter.

use serde::{Deserialize, Serialize};

use crate::rchain::ai::{AIMessage, Usage};
use crate::rchain::chat_models::ChatClient;
use crate::rchain::chat_runtime::{Auth, RequestFailure, RetryConfig, send_chat_request_with_retry};
use crate::rchain::provider::{ChatMessage, ProviderError};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

pub(crate) fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

pub(crate) async fn ask_messages(
    client: &ChatClient,
    messages: &[ChatMessage],
) -> Result<AIMessage, ProviderError> {
    let provider = client.provider;
    let options = client.options;

    let payload = ChatCompletionRequest {
        model: &client.model,
        messages,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
    };

    let response = send_chat_request_with_retry(
        &client.http,
        &chat_completions_url(&client.base_url),
        Auth::Bearer(&client.api_key),
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

    let body: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or(ProviderError::EmptyResponse { provider })?;
    let usage = body.usage.map(|usage| Usage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
    });

    Ok(AIMessage { content, usage })
}
