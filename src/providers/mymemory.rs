use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;

use crate::app_config::MyMemoryConfig;
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{preview, TranslationBackend};

const PROVIDER_NAME: &str = "MyMemory";

/// Client for the free MyMemory translation API
#[derive(Debug)]
pub struct MyMemory {
    /// HTTP client for API requests
    client: Client,
    /// Endpoint and timeout
    config: MyMemoryConfig,
}

/// The `source|target` pair parameter the API expects
pub fn language_pair(source_language: &str, target_language: &str) -> String {
    format!("{}|{}", source_language, target_language)
}

impl MyMemory {
    /// Create a new MyMemory client
    pub fn new(config: MyMemoryConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Pull `responseData.translatedText` out of a response body.
    ///
    /// The service reports quota and input problems with HTTP 200 and a
    /// `responseStatus` other than 200 in the body.
    pub fn extract_text(body: &Value) -> Result<String, ProviderError> {
        let status = body.get("responseStatus").and_then(|s| match s {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        });

        if let Some(status) = status {
            if status != 200 {
                let details = body.get("responseDetails")
                    .and_then(Value::as_str)
                    .unwrap_or("no details")
                    .to_string();
                let status_code = u16::try_from(status).unwrap_or(500);
                return Err(ProviderError::from_status(PROVIDER_NAME, status_code, details));
            }
        }

        body.get("responseData")
            .and_then(|data| data.get("translatedText"))
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError(format!("{} returned invalid data: missing translatedText", PROVIDER_NAME)))
    }

    /// Translate one piece of text
    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let source = language_utils::resolve_source_language(source_language, text);
        let langpair = language_pair(&source, target_language);
        debug!("{} {}: \"{}\"", PROVIDER_NAME, langpair, preview(text, 50));

        let response = self.client.get(&self.config.endpoint)
            .query(&[("q", text), ("langpair", langpair.as_str())])
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

        let body = response.json::<Value>().await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::from_transport(PROVIDER_NAME, self.config.timeout_secs, e)
                } else {
                    ProviderError::ParseError(format!("{}: {}", PROVIDER_NAME, e))
                }
            })?;

        Self::extract_text(&body)
    }
}

#[async_trait]
impl TranslationBackend for MyMemory {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        MyMemory::translate(self, text, source_language, target_language).await
    }
}
