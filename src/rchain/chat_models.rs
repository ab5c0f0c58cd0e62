use std::fmt;

use tracing::debug;

use crate::config::ProviderProfile;
use crate::rchain::ai::AIMessage;
use crate::rchain::provider::{
    AskOptions, ChatMessage, Credentials, Provider, ProviderError, default_base_url,
    default_model,
};
use crate::rchain::{google, openai};

/// Ready-to-use chat-completions client for one hosted provider.
///
/// Built fresh for every use by the `get_*_client` factories; the API key
/// has already been validated by the time a value of this type exists.
#[derive(Clone)]
pub struct ChatClient {
    pub(crate) provider: Provider,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) options: AskOptions,
    pub(crate) http: reqwest::Client,
}

impl ChatClient {
    /// Builds a client for `provider`, taking the key from `credentials`.
    pub fn new(
        provider: Provider,
        credentials: &Credentials,
        model: impl Into<String>,
        base_url: impl Into<String>,
        options: AskOptions,
    ) -> Result<Self, ProviderError> {
        let api_key = credentials.api_key(provider)?.to_string();
        let client = Self {
            provider,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            options,
            http: reqwest::Client::new(),
        };
        debug!(
            provider = provider.as_str(),
            model = %client.model,
            base_url = %client.base_url,
            api_key_present = true,
            "built chat client"
        );
        Ok(client)
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `prompt` as a single user message and returns the reply.
    pub async fn invoke(&self, prompt: &str) -> Result<AIMessage, ProviderError> {
        self.invoke_messages(&[ChatMessage::user(prompt)]).await
    }

    /// Invokes the model with fully-typed role messages.
    pub async fn invoke_messages(
        &self,
        messages: &[ChatMessage],
    ) -> Result<AIMessage, ProviderError> {
        match self.provider {
            Provider::Groq | Provider::OpenRouter => openai::ask_messages(self, messages).await,
            Provider::Google => google::generate_content(self, messages).await,
        }
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Groq client. The model is the library default unless the profile names one.
pub fn get_groq_client(
    credentials: &Credentials,
    profile: &ProviderProfile,
) -> Result<ChatClient, ProviderError> {
    let provider = Provider::Groq;
    ChatClient::new(
        provider,
        credentials,
        profile.model.as_deref().unwrap_or(default_model(provider)),
        base_url(provider, profile),
        profile.ask_options(),
    )
}

/// Google Generative AI client, always bound to `gemini-pro`.
pub fn get_google_client(
    credentials: &Credentials,
    profile: &ProviderProfile,
) -> Result<ChatClient, ProviderError> {
    let provider = Provider::Google;
    ChatClient::new(
        provider,
        credentials,
        default_model(provider),
        base_url(provider, profile),
        profile.ask_options(),
    )
}

/// OpenRouter client. `model_name` wins over the profile, which wins over
/// `google/gemini-pro`.
pub fn get_openrouter_client(
    credentials: &Credentials,
    profile: &ProviderProfile,
    model_name: Option<&str>,
) -> Result<ChatClient, ProviderError> {
    let provider = Provider::OpenRouter;
    let model = model_name
        .or(profile.model.as_deref())
        .unwrap_or(default_model(provider));
    ChatClient::new(
        provider,
        credentials,
        model,
        base_url(provider, profile),
        profile.ask_options(),
    )
}

fn base_url<'a>(provider: Provider, profile: &'a ProviderProfile) -> &'a str {
    profile
        .base_url
        .as_deref()
        .unwrap_or(default_base_url(provider))
}
