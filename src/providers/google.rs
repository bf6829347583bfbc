use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::{resolve_api_key, GoogleConfig};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{preview, TranslationBackend};

const PROVIDER_NAME: &str = "Google Translate";

/// Google Cloud Translation (v2) client
#[derive(Debug)]
pub struct Google {
    /// HTTP client for API requests
    client: Client,
    /// Endpoint, credentials and timeout
    config: GoogleConfig,
}

/// Translation request body
#[derive(Debug, Serialize, PartialEq)]
pub struct GoogleRequest {
    /// Text to translate
    pub q: String,
    /// Source language code
    pub source: String,
    /// Target language code
    pub target: String,
    /// "text" so that the service does not HTML-escape the result
    pub format: String,
}

/// Translation response body
#[derive(Debug, Deserialize)]
pub struct GoogleResponse {
    pub data: GoogleData,
}

#[derive(Debug, Deserialize)]
pub struct GoogleData {
    #[serde(default)]
    pub translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleTranslation {
    pub translated_text: String,
}

impl GoogleRequest {
    pub fn new(text: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            q: text.into(),
            source: source.into(),
            target: target.into(),
            format: "text".to_string(),
        }
    }
}

impl Google {
    /// Create a new Google client
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Extract the translated text from a response
    pub fn extract_text(response: &GoogleResponse) -> Option<String> {
        response.data.translations.first().map(|t| t.translated_text.clone())
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

        let request = GoogleRequest::new(text, source, target_language);
        let response = self.client.post(&self.config.endpoint)
            .query(&[("key", api_key.as_str())])
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

        let google_response = response.json::<GoogleResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("{}: {}", PROVIDER_NAME, e)))?;

        Self::extract_text(&google_response)
            .ok_or_else(|| ProviderError::ParseError(format!("{} returned no translations", PROVIDER_NAME)))
    }
}

#[async_trait]
impl TranslationBackend for Google {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        Google::translate(self, text, source_language, target_language).await
    }
}
