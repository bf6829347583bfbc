use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::{resolve_api_key, OpenAIConfig};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{preview, TranslationBackend};

const PROVIDER_NAME: &str = "OpenAI";

/// OpenAI client for translating through chat completions
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// Model, endpoint, credentials and decoding settings
    config: OpenAIConfig,
}

/// Chat completion request
#[derive(Debug, Serialize, Default)]
pub struct OpenAIRequest {
    /// The model to use
    pub model: String,

    /// The messages for the conversation
    pub messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
}

/// Message returned by the API; content may be null
#[derive(Debug, Deserialize)]
pub struct OpenAIResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl OpenAIRequest {
    /// Create a new chat completion request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of generated tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// System instruction naming both languages in plain English
pub fn build_system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate the following {} text into {}. \
         Keep the tone and style of the original and reply with the translation only, \
         without any explanation.",
        language_utils::language_display_name(source_language),
        language_utils::language_display_name(target_language),
    )
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Build the request for one subtitle text
    pub fn build_request(&self, text: &str, source_language: &str, target_language: &str) -> OpenAIRequest {
        OpenAIRequest::new(&self.config.model)
            .add_message("system", build_system_prompt(source_language, target_language))
            .add_message("user", text)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
    }

    /// First choice's content, or the original text when the model returned nothing
    pub fn extract_text_or_original(response: &OpenAIResponse, original: &str) -> String {
        response.choices.first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                warn!("{} returned an empty completion, keeping original text", PROVIDER_NAME);
                original.to_string()
            })
    }

    /// Translate one piece of text
    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let api_key = resolve_api_key(&self.config.api_key, &self.config.api_key_env)
            .ok_or_else(|| ProviderError::AuthenticationError(format!(
                "{} API key is not configured (set {})",
                PROVIDER_NAME, self.config.api_key_env
            )))?;

        let source = language_utils::resolve_source_language(source_language, text);
        debug!("{} {} -> {}: \"{}\"", PROVIDER_NAME, source, target_language, preview(text, 50));

        let api_url = format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'));
        let request = self.build_request(text, &source, target_language);

        let response = self.client.post(&api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER_NAME, self.config.timeout_secs, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("{} API error ({}): {}", PROVIDER_NAME, status, error_text);
            return Err(ProviderError::from_status(PROVIDER_NAME, status.as_u16(), error_text));
        }

        let openai_response = response.json::<OpenAIResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("{}: {}", PROVIDER_NAME, e)))?;

        if let Some(usage) = &openai_response.usage {
            debug!("{} usage: {} prompt + {} completion = {} tokens",
                   PROVIDER_NAME, usage.prompt_tokens, usage.completion_tokens, usage.total_tokens);
        }

        Ok(Self::extract_text_or_original(&openai_response, text))
    }
}

#[async_trait]
impl TranslationBackend for OpenAI {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        OpenAI::translate(self, text, source_language, target_language).await
    }
}
