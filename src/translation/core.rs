/*!
 * Core translation service implementation.
 *
 * This module contains the validated request type and the `TranslationService`
 * that turns one uploaded subtitle document into a translated one: decode,
 * translate in batches through the selected provider, format.
 */

use bytes::Bytes;
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::app_config::{Config, TranslationProvider};
use crate::errors::{AppError, RequestError, TranslationError};
use crate::language_utils::AUTO_DETECT;
use crate::providers::{ProviderClient, TranslationBackend};
use crate::subtitle_processor::{self, SubtitleEntry};

use super::batch::{BatchResult, BatchTranslator, ProgressCallback};
use super::retry::{Sleeper, TokioSleeper};

/// Raw, unvalidated form fields of an upload
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    /// Original file name and bytes of the `file` part
    pub file: Option<(String, Bytes)>,
    /// `translationService` field
    pub provider: Option<String>,
    /// `sourceLanguage` field
    pub source_language: Option<String>,
    /// `targetLanguage` field
    pub target_language: Option<String>,
}

/// A translation request that passed every boundary check
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    file_name: String,
    content: Bytes,
    provider: TranslationProvider,
    source_language: String,
    target_language: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TranslationRequest {
    /// Validate form fields, reporting the first problem found.
    ///
    /// Order: file, provider presence, provider value, target language,
    /// extension, size. Decoding the content is left to the service.
    pub fn from_form(form: UploadForm, max_upload_bytes: usize) -> Result<Self, RequestError> {
        let (file_name, content) = form.file.ok_or(RequestError::MissingFile)?;

        let provider_id = form
            .provider
            .filter(|id| !id.trim().is_empty())
            .ok_or(RequestError::MissingProvider)?;
        let provider = TranslationProvider::from_identifier(&provider_id)
            .ok_or(RequestError::UnknownProvider(provider_id))?;

        let target_language = non_blank(form.target_language).ok_or(RequestError::MissingTargetLanguage)?;

        if !has_srt_extension(&file_name) {
            return Err(RequestError::UnsupportedExtension(file_name));
        }

        if content.len() > max_upload_bytes {
            return Err(RequestError::FileTooLarge {
                size: content.len(),
                limit: max_upload_bytes,
            });
        }

        let source_language = non_blank(form.source_language).unwrap_or_else(|| AUTO_DETECT.to_string());

        Ok(Self {
            file_name,
            content,
            provider,
            source_language,
            target_language,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn provider(&self) -> TranslationProvider {
        self.provider
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Name of the file offered for download
    pub fn output_file_name(&self) -> String {
        format!("translated_{}", self.file_name)
    }
}

/// Case-insensitive `.srt` check on a file name
pub fn has_srt_extension(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".srt")
}

/// A finished translation job
#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    /// Formatted SRT output
    pub content: String,
    /// Number of entries in the output
    pub entry_count: usize,
    /// Entries that carry the failure marker
    pub failed_count: usize,
    /// Wall-clock time of the job
    pub elapsed: Duration,
}

/// Main translation service for subtitle translation
#[derive(Clone)]
pub struct TranslationService {
    /// Read-only configuration shared by all jobs
    pub config: Arc<Config>,

    /// Clock used for backoff and batch pacing
    sleeper: Arc<dyn Sleeper>,

    /// Replaces the configured provider for every job when set
    backend_override: Option<Arc<dyn TranslationBackend>>,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            sleeper: Arc::new(TokioSleeper),
            backend_override: None,
        }
    }

    /// Send every job to `backend` regardless of the requested provider
    pub fn with_backend(mut self, backend: Arc<dyn TranslationBackend>) -> Self {
        self.backend_override = Some(backend);
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Backend that serves `provider`
    pub fn backend_for(&self, provider: TranslationProvider) -> Arc<dyn TranslationBackend> {
        match &self.backend_override {
            Some(backend) => backend.clone(),
            None => Arc::new(ProviderClient::from_config(provider, &self.config.providers)),
        }
    }

    /// Translate already parsed entries through `provider`
    pub async fn translate_entries(
        &self,
        provider: TranslationProvider,
        entries: &[SubtitleEntry],
        source_language: &str,
        target_language: &str,
        cancel: &CancellationToken,
        progress: Option<ProgressCallback>,
    ) -> BatchResult {
        let mut translator = BatchTranslator::from_config(self.backend_for(provider), &self.config.translation)
            .with_sleeper(self.sleeper.clone());
        if let Some(progress) = progress {
            translator = translator.with_progress(progress);
        }

        translator
            .translate_all_with_cancel(entries, source_language, target_language, cancel)
            .await
    }

    /// Run one upload through decode, batch translation and formatting
    pub async fn translate_document(
        &self,
        request: &TranslationRequest,
        cancel: &CancellationToken,
    ) -> Result<TranslatedDocument, AppError> {
        let job_id = Uuid::new_v4();
        let start_time = Instant::now();

        let entries = subtitle_processor::parse_srt_bytes(request.content())?;
        info!(
            "[{}] Translating {} ({} entries) with {} from {} to {}",
            job_id,
            request.file_name(),
            entries.len(),
            request.provider().display_name(),
            request.source_language(),
            request.target_language()
        );

        let result = self
            .translate_entries(
                request.provider(),
                &entries,
                request.source_language(),
                request.target_language(),
                cancel,
                None,
            )
            .await;

        if result.cancelled {
            warn!("[{}] Cancelled after {} of {} entries", job_id, result.entries.len(), entries.len());
            return Err(TranslationError::Cancelled {
                completed: result.entries.len(),
                total: entries.len(),
            }
            .into());
        }

        let document = TranslatedDocument {
            content: subtitle_processor::format_srt(&result.entries),
            entry_count: result.entries.len(),
            failed_count: result.failed,
            elapsed: start_time.elapsed(),
        };

        info!(
            "[{}] Finished in {}ms ({} entries, {} failed)",
            job_id,
            document.elapsed.as_millis(),
            document.entry_count,
            document.failed_count
        );

        Ok(document)
    }
}
