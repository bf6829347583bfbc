/*!
 * Batch translation processing.
 *
 * Entries are cut into fixed-size batches. The entries of one batch are in
 * flight together (`join_all`) and batches run one after another with a fixed
 * pause between them. Every single call goes through the retry wrapper. An
 * entry that still fails is marked in place instead of failing the whole
 * document.
 */

use futures::future::join_all;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::app_config::TranslationConfig;
use crate::providers::TranslationBackend;
use crate::subtitle_processor::{normalize_entry_text, SubtitleEntry};

use super::retry::{with_retry, RetryPolicy, Sleeper, TokioSleeper};

/// Prefix put in front of the original text of an entry that could not be translated
pub const FAILURE_MARKER: &str = "[TRANSLATION FAILED]";

/// Text stored for an entry whose translation failed
pub fn failure_text(original: &str) -> String {
    format!("{} {}", FAILURE_MARKER, original)
}

/// Callback receiving `(translated_entries, total_entries)` after each batch
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Outcome of translating a list of entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    /// Translated entries in input order
    pub entries: Vec<SubtitleEntry>,
    /// How many of them carry the failure marker
    pub failed: usize,
    /// Number of batches that were processed
    pub batches: usize,
    /// Whether processing stopped early because of cancellation
    pub cancelled: bool,
}

/// Batch translator for processing subtitle entries in batches
pub struct BatchTranslator {
    /// Backend every entry is sent to
    backend: Arc<dyn TranslationBackend>,

    /// Used for retry backoff and the pause between batches
    sleeper: Arc<dyn Sleeper>,

    /// Maximum entries per batch
    batch_size: usize,

    /// Pause after every batch except the last
    inter_batch_delay: Duration,

    /// Retry policy applied to each entry
    retry_policy: RetryPolicy,

    /// Optional progress reporting
    progress: Option<ProgressCallback>,
}

impl BatchTranslator {
    /// Create a batch translator with the default pacing and retry settings
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self::from_config(backend, &TranslationConfig::default())
    }

    /// Create a batch translator from the `translation` config section
    pub fn from_config(backend: Arc<dyn TranslationBackend>, config: &TranslationConfig) -> Self {
        Self {
            backend,
            sleeper: Arc::new(TokioSleeper),
            batch_size: config.batch_size,
            inter_batch_delay: config.inter_batch_delay(),
            retry_policy: RetryPolicy::from_config(config),
            progress: None,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_inter_batch_delay(mut self, delay: Duration) -> Self {
        self.inter_batch_delay = delay;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Report progress after each batch
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Batch size actually used; zero is treated as one
    pub fn batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    /// Translate all entries. Never fails as a whole.
    pub async fn translate_all(
        &self,
        entries: &[SubtitleEntry],
        source_language: &str,
        target_language: &str,
    ) -> BatchResult {
        self.translate_all_with_cancel(entries, source_language, target_language, &CancellationToken::new())
            .await
    }

    /// Translate all entries, stopping before the next batch once `cancel` fires.
    ///
    /// Calls already in flight for the current batch are allowed to finish.
    pub async fn translate_all_with_cancel(
        &self,
        entries: &[SubtitleEntry],
        source_language: &str,
        target_language: &str,
        cancel: &CancellationToken,
    ) -> BatchResult {
        let total_entries = entries.len();
        let batches: Vec<&[SubtitleEntry]> = entries.chunks(self.batch_size()).collect();
        let total_batches = batches.len();

        let mut result = BatchResult {
            entries: Vec::with_capacity(total_entries),
            ..Default::default()
        };

        for (batch_index, batch) in batches.into_iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Cancelled before batch {} of {}", batch_index + 1, total_batches);
                result.cancelled = true;
                break;
            }

            info!("Processing batch {} of {} ({} entries)", batch_index + 1, total_batches, batch.len());
            let start_time = Instant::now();

            // join_all yields results in input order whatever the completion order
            let translated = join_all(
                batch
                    .iter()
                    .map(|entry| self.translate_entry(entry, source_language, target_language)),
            )
            .await;

            for (entry, succeeded) in translated {
                if !succeeded {
                    result.failed += 1;
                }
                result.entries.push(entry);
            }
            result.batches += 1;

            debug!("Batch {} completed in {:?}", batch_index + 1, start_time.elapsed());

            if let Some(progress) = &self.progress {
                progress(result.entries.len(), total_entries);
            }

            if batch_index + 1 < total_batches {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!("Cancelled after batch {} of {}", batch_index + 1, total_batches);
                        result.cancelled = true;
                        break;
                    }
                    _ = self.sleeper.sleep(self.inter_batch_delay) => {}
                }
            }
        }

        if result.failed > 0 {
            error!("{} of {} entries could not be translated", result.failed, result.entries.len());
        }

        result
    }

    /// Translate one entry with retries; the flag is false when it got the failure marker
    async fn translate_entry(
        &self,
        entry: &SubtitleEntry,
        source_language: &str,
        target_language: &str,
    ) -> (SubtitleEntry, bool) {
        let backend = &self.backend;
        let text = entry.text.as_str();

        let outcome = with_retry(
            move || backend.translate(text, source_language, target_language),
            &self.retry_policy,
            self.sleeper.as_ref(),
        )
        .await;

        match outcome {
            Ok(translated) => {
                // A blank line inside the text would end the entry in the written file
                let text = normalize_entry_text(&translated);
                if text.is_empty() {
                    warn!("Entry {} came back blank from {}, keeping original text", entry.id, self.backend.name());
                    (entry.clone(), true)
                } else {
                    (entry.with_text(text), true)
                }
            }
            Err(e) => {
                error!("Entry {} failed via {}: {}", entry.id, self.backend.name(), e);
                (entry.with_text(failure_text(&entry.text)), false)
            }
        }
    }
}
