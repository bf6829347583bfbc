/*!
 * # subtrans - SRT subtitle translation backend
 *
 * A Rust library and server that translates SRT subtitle files through
 * interchangeable third-party translation services.
 *
 * ## Features
 *
 * - Lenient SRT parsing and byte-exact reassembly
 * - Translation through one of three providers:
 *   - Google Cloud Translation
 *   - OpenAI chat completions
 *   - MyMemory (free, no key)
 * - Batched, paced translation with bounded retries per entry
 * - Failed entries are marked in place instead of failing the file
 * - Script-based source language detection
 * - HTTP upload endpoint and a command line translator
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing and formatting
 * - `language_utils`: Language detection and ISO language names
 * - `providers`: Client implementations for the translation services
 * - `translation`: The translation pipeline:
 *   - `translation::retry`: Bounded retries with backoff
 *   - `translation::batch`: Batch processing of subtitle entries
 *   - `translation::core`: Request validation and the document service
 * - `server`: HTTP boundary
 * - `file_utils`: File system operations
 * - `app_controller`: Command line controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod server;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, TranslationProvider};
pub use errors::{AppError, ProviderError, RequestError, SubtitleError, TranslationError};
pub use language_utils::{detect_language, get_language_name};
pub use providers::{ProviderClient, TranslationBackend};
pub use subtitle_processor::{format_srt, parse_srt, SubtitleCollection, SubtitleEntry};
pub use translation::{BatchTranslator, TranslationService};
