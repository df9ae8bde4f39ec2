// src/upstream.rs
// The chat-completion dependency of the generator. The generator only sees
// the `CompletionBackend` trait, so tests can swap in scripted backends.
use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
};
use tokio::time::{Duration, timeout};

use crate::error::UpstreamError;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub json_object: bool, // Ask the endpoint for a single JSON object.
    pub max_tokens: u32,
}

/// A chat-style text generation endpoint.
///
/// Implementations return the raw text of the first choice. An empty or
/// missing payload must be reported as [`UpstreamError::EmptyResponse`].
pub trait CompletionBackend: Send + Sync {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, UpstreamError>> + Send;
}

impl<T: CompletionBackend> CompletionBackend for Arc<T> {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, UpstreamError>> + Send {
        (**self).complete(request)
    }
}

pub struct OpenAIBackend {
    client: Client<OpenAIConfig>,
    model: String,
    request_timeout: Duration,
}

impl OpenAIBackend {
    pub fn new(api_key: impl Into<String>, settings: &Settings) -> Result<Self, UpstreamError> {
        let mut openai_config = OpenAIConfig::new().with_api_key(api_key.into());
        if let Some(base_url) = &settings.api_base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        let request_timeout = Duration::from_secs(settings.request_timeout_secs);
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client: Client::with_config(openai_config).with_http_client(http_client),
            model: settings.model.clone(),
            request_timeout,
        })
    }

    // Builds a backend from settings, failing when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, UpstreamError> {
        let api_key = match &settings.openai_api_key {
            Some(key) if !key.trim().is_empty() => key.clone(),
            _ => return Err(UpstreamError::Backend("No API key provided.".into())),
        };
        Self::new(api_key, settings)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CompletionBackend for OpenAIBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system.as_str())
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.as_str())
                .build()?
                .into(),
        ];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_completion_tokens(request.max_tokens);
        if request.json_object {
            args.response_format(ResponseFormat::JsonObject);
        }
        let chat_request = args.build()?;

        let response = match timeout(
            self.request_timeout,
            self.client.chat().create(chat_request),
        )
        .await
        {
            Ok(res) => res?,
            Err(_) => return Err(UpstreamError::Timeout(self.request_timeout.as_secs())),
        };

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(UpstreamError::EmptyResponse)
    }
}
