/*!
 * Subtitle translation pipeline.
 *
 * This module is split into several submodules:
 *
 * - `core`: Request validation and the document-level translation service
 * - `batch`: Batched, paced translation of subtitle entries
 * - `retry`: Bounded retries with exponential backoff and an injectable clock
 */

// Re-export main types for easier usage
pub use self::batch::{BatchResult, BatchTranslator, FAILURE_MARKER};
pub use self::core::{TranslatedDocument, TranslationRequest, TranslationService, UploadForm};
pub use self::retry::{with_retry, RecordingSleeper, RetryPolicy, Sleeper, TokioSleeper};

// Submodules
pub mod batch;
pub mod core;
pub mod retry;
