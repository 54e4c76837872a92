use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::app_config::Config;
use crate::errors::{AppError, TranslationError};
use crate::file_utils::FileManager;
use crate::providers::{self, TranslationBackend};
use crate::translation::{ChunkedTranslator, TranslationOptions};

// @module: Application controller for document translation

/// Name of the file failures are appended to, inside the output directory
pub const ISSUES_LOG_FILE: &str = "doctrans.issues.log";

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Translation written to this path
    Translated(PathBuf),
    /// Output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Counters for a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Chunked translator bound to the configured backend
    translator: ChunkedTranslator,
    // @field: Cancels the current and all following translations
    cancel: CancellationToken,
}

impl Controller {
    // @method: Create a new controller, building the backend from the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let backend = providers::build_backend(&config)?;
        Self::with_backend(config, backend)
    }

    // @method: Create a new controller around an already constructed backend
    pub fn with_backend(config: Config, backend: Arc<dyn TranslationBackend>) -> Result<Self> {
        let options = TranslationOptions::from_config(&config.translation);
        let translator =
            ChunkedTranslator::new(backend, options).context("Failed to create chunked translator")?;

        Ok(Self {
            config,
            translator,
            cancel: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn translator(&self) -> &ChunkedTranslator {
        &self.translator
    }

    /// Token that stops translation when cancelled (wired to Ctrl-C by the CLI)
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Check that the backend is reachable before starting a long run
    pub async fn test_connection(&self) -> Result<()> {
        self.translator.test_connection().await.with_context(|| {
            format!(
                "Cannot reach {} backend at {}",
                self.config.translation.backend.display_name(),
                self.config.translation.get_endpoint()
            )
        })
    }

    /// Translate inline text
    pub async fn translate_text(&self, text: &str) -> Result<String> {
        let outcome = self
            .translator
            .translate_detailed(text, |_, _| {}, Some(&self.cancel))
            .await?;
        Ok(outcome.text)
    }

    /// Run the main workflow with an input file and output directory
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<FileOutcome> {
        let multi_progress = MultiProgress::new();
        let result = self
            .run_with_progress(&input_file, &output_dir, &multi_progress, force_overwrite)
            .await;

        if let Err(e) = &result {
            self.record_issue(&output_dir, &input_file, e);
        }

        result
    }

    /// Translate one file, drawing its chunk progress bar in `multi_progress`
    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<FileOutcome> {
        let start_time = std::time::Instant::now();

        let output_path = FileManager::generate_output_path(input_file, output_dir);
        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {:?}, translation already exists (use -f to force overwrite)",
                input_file
            );
            return Ok(FileOutcome::Skipped(output_path));
        }

        let content = FileManager::read_to_string(input_file)?;

        info!(
            "{} -> {} with {}: {:?}",
            self.config.source_language,
            self.config.target_language,
            self.config.translation.backend.display_name(),
            input_file
        );

        let total_chunks = self.translator.chunks(&content).len() as u64;
        let progress_bar = multi_progress.add(ProgressBar::new(total_chunks));
        progress_bar.set_style(Self::progress_style("chunks"));
        progress_bar.set_message("Translating");

        let pb = progress_bar.clone();
        let outcome = self
            .translator
            .translate_detailed(
                &content,
                move |completed, _total| pb.set_position(completed as u64),
                Some(&self.cancel),
            )
            .await;

        // Only the folder bar stays visible between files
        progress_bar.finish_and_clear();

        let outcome = outcome.with_context(|| format!("Failed to translate {:?}", input_file))?;

        FileManager::write_to_file(&output_path, &outcome.text)?;

        info!(
            "Success: {} ({} chunks, {} retries, {})",
            output_path.display(),
            outcome.stats.total_chunks,
            outcome.stats.retries,
            Self::format_duration(start_time.elapsed())
        );

        Ok(FileOutcome::Translated(output_path))
    }

    /// Run the workflow in folder mode, processing all text files in a directory
    ///
    /// Outputs go next to each input, or under `output_dir` mirroring the
    /// folder layout. Files whose translation already exists are skipped.
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        output_dir: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let text_files = FileManager::find_text_files(&input_dir)?;
        if text_files.is_empty() {
            return Err(anyhow!("No .txt files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(text_files.len() as u64));
        folder_pb.set_style(Self::progress_style("files"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for text_file in &text_files {
            if self.cancel.is_cancelled() {
                warn!("Cancelled, {} file(s) left untouched", text_files.len() - folder_pb.position() as usize);
                break;
            }

            let file_name = text_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let file_output_dir = Self::folder_output_dir(&input_dir, text_file, output_dir.as_deref());

            match self
                .run_with_progress(text_file, &file_output_dir, &multi_progress, force_overwrite)
                .await
            {
                Ok(FileOutcome::Translated(_)) => summary.translated += 1,
                Ok(FileOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    self.record_issue(&file_output_dir, text_file, &e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} translated, {} skipped, {} errors in {}",
            summary.translated,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    /// Output directory for a file found while walking `input_dir`
    fn folder_output_dir(input_dir: &Path, text_file: &Path, output_dir: Option<&Path>) -> PathBuf {
        let parent = text_file.parent().unwrap_or(input_dir);
        match output_dir {
            Some(root) => match parent.strip_prefix(input_dir) {
                Ok(relative) => root.join(relative),
                Err(_) => root.to_path_buf(),
            },
            None => parent.to_path_buf(),
        }
    }

    /// Append a failure to the issues log in `output_dir`
    fn record_issue(&self, output_dir: &Path, input_file: &Path, error: &anyhow::Error) {
        let detail = match AppError::classify(error) {
            AppError::Translation(TranslationError::ChunkTranslationFailed { index, attempts, source }) => {
                format!("chunk {} failed after {} attempt(s): {}", index, attempts, source)
            }
            AppError::Unknown(message) => message,
            classified => classified.to_string(),
        };

        let entry = format!(
            "{} - {} ({} -> {}): {:?}: {}",
            self.config.translation.backend.display_name(),
            self.config.translation.get_endpoint(),
            self.config.source_language,
            self.config.target_language,
            input_file,
            detail
        );

        let log_file_path = output_dir.join(ISSUES_LOG_FILE);
        if let Err(e) = FileManager::append_to_log_file(&log_file_path, &entry) {
            warn!("Failed to write issues log: {}", e);
        }
    }

    fn progress_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
                unit
            ))
            .or_else(|_| {
                ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}")
            })
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
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
