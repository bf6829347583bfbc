/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported backends:
 * - Google: Google Cloud Translation v2
 * - OpenAI: chat completions prompted to translate
 * - MyMemory: free community translation memory
 *
 * Every backend translates one string at a time and never retries on its own;
 * retries and pacing belong to the batch translator.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::app_config::{ProvidersConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Common trait for all translation backends
///
/// `source_language` may be `auto`; each backend resolves it with
/// [`crate::language_utils::resolve_source_language`] before calling out.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Display name used in logs and error messages
    fn name(&self) -> &str;

    /// Translate a single piece of text
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

/// The three production backends behind one closed type
#[derive(Debug)]
pub enum ProviderClient {
    Google(google::Google),
    OpenAI(openai::OpenAI),
    MyMemory(mymemory::MyMemory),
}

impl ProviderClient {
    /// Build the client for a provider from its configuration section
    pub fn from_config(provider: TranslationProvider, config: &ProvidersConfig) -> Self {
        match provider {
            TranslationProvider::Google => Self::Google(google::Google::new(config.google.clone())),
            TranslationProvider::OpenAI => Self::OpenAI(openai::OpenAI::new(config.openai.clone())),
            TranslationProvider::MyMemory => {
                Self::MyMemory(mymemory::MyMemory::new(config.mymemory.clone()))
            }
        }
    }

    /// Which provider this client talks to
    pub fn provider(&self) -> TranslationProvider {
        match self {
            Self::Google(_) => TranslationProvider::Google,
            Self::OpenAI(_) => TranslationProvider::OpenAI,
            Self::MyMemory(_) => TranslationProvider::MyMemory,
        }
    }
}

#[async_trait]
impl TranslationBackend for ProviderClient {
    fn name(&self) -> &str {
        self.provider().display_name()
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        match self {
            Self::Google(client) => client.translate(text, source_language, target_language).await,
            Self::OpenAI(client) => client.translate(text, source_language, target_language).await,
            Self::MyMemory(client) => client.translate(text, source_language, target_language).await,
        }
    }
}

/// Shorten text for log lines without splitting a character
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

pub mod google;
pub mod mock;
pub mod mymemory;
pub mod openai;
