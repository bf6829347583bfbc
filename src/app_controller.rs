use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::app_config::{Config, TranslationProvider};
use crate::file_utils::FileManager;
use crate::subtitle_processor::SubtitleCollection;
use crate::translation::batch::ProgressCallback;
use crate::translation::TranslationService;

// @module: Application controller for translating local subtitle files

/// What to translate and where to put it
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Provider every entry is sent to
    pub provider: TranslationProvider,
    /// Source language code or `auto`
    pub source_language: String,
    /// Target language code
    pub target_language: String,
    /// Output directory; next to each input when `None`
    pub output_dir: Option<PathBuf>,
    /// Overwrite existing outputs
    pub force_overwrite: bool,
}

/// Result of translating one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Output written, with the number of entries that kept the failure marker
    Translated { output: PathBuf, failed_entries: usize },
    /// Output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Counts over a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub translated: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: Translation service built from the app configuration
    service: TranslationService,

    // @field: Cancelled on Ctrl+C
    cancel: CancellationToken,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        Ok(Self::with_service(TranslationService::new(Arc::new(config))))
    }

    /// Create a controller around an existing service
    pub fn with_service(service: TranslationService) -> Self {
        Self {
            service,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the run before the next batch
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Translate a single file or every subtitle file below a directory
    pub async fn run(&self, input: &Path, options: &TranslateOptions) -> Result<RunSummary> {
        if FileManager::dir_exists(input) {
            self.run_folder(input, options).await
        } else if FileManager::file_exists(input) {
            let multi_progress = MultiProgress::new();
            let mut summary = RunSummary::default();
            match self.translate_file(input, options, &multi_progress).await? {
                FileOutcome::Translated { .. } => summary.translated += 1,
                FileOutcome::Skipped(_) => summary.skipped += 1,
            }
            Ok(summary)
        } else {
            Err(anyhow!("Input path does not exist: {:?}", input))
        }
    }

    /// Translate every subtitle file found under `input_dir`
    pub async fn run_folder(&self, input_dir: &Path, options: &TranslateOptions) -> Result<RunSummary> {
        let start_time = Instant::now();

        let files = FileManager::find_subtitle_files(input_dir)?;
        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
        folder_pb.set_style(Self::progress_style("files"));
        folder_pb.set_message("Processing files");

        let mut summary = RunSummary::default();

        for file in &files {
            if self.cancel.is_cancelled() {
                warn!("Cancelled, {} files left untouched", files.len() - folder_pb.position() as usize);
                break;
            }

            let file_name = file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.translate_file(file, options, &multi_progress).await {
                Ok(FileOutcome::Translated { .. }) => summary.translated += 1,
                Ok(FileOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.errors += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed in {}: {} translated, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.translated,
            summary.skipped,
            summary.errors
        );

        Ok(summary)
    }

    /// Translate one file and write `translated_<name>`
    pub async fn translate_file(
        &self,
        input_file: &Path,
        options: &TranslateOptions,
        multi_progress: &MultiProgress,
    ) -> Result<FileOutcome> {
        let start_time = Instant::now();

        if !FileManager::has_subtitle_extension(input_file) {
            return Err(anyhow!("Only .srt files are supported: {:?}", input_file));
        }

        let output_path = FileManager::translated_output_path(input_file, options.output_dir.as_deref());
        if output_path.exists() && !options.force_overwrite {
            warn!("Skipping {:?}, translation already exists (use -f to force overwrite)", input_file);
            return Ok(FileOutcome::Skipped(output_path));
        }

        let subtitles = SubtitleCollection::from_srt_file(input_file)?;

        let progress_bar = multi_progress.add(ProgressBar::new(subtitles.len() as u64));
        progress_bar.set_style(Self::progress_style("entries"));
        let pb = progress_bar.clone();
        let progress: ProgressCallback = Arc::new(move |done, _total| pb.set_position(done as u64));

        let result = self.service
            .translate_entries(
                options.provider,
                &subtitles.entries,
                &options.source_language,
                &options.target_language,
                &self.cancel,
                Some(progress),
            )
            .await;

        if result.cancelled {
            progress_bar.abandon_with_message("Cancelled");
            return Err(anyhow!(
                "Translation cancelled after {} of {} entries",
                result.entries.len(),
                subtitles.len()
            ));
        }
        progress_bar.finish_and_clear();

        let translated = SubtitleCollection::new(output_path.clone(), result.entries);
        translated.write_to_srt(&output_path)?;

        if result.failed > 0 {
            warn!("{} entries in {:?} could not be translated", result.failed, output_path);
        }
        info!(
            "Translated {:?} -> {:?} in {}",
            input_file,
            output_path,
            Self::format_duration(start_time.elapsed())
        );

        Ok(FileOutcome::Translated {
            output: output_path,
            failed_entries: result.failed,
        })
    }

    fn progress_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    /// Format a duration for log lines
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
