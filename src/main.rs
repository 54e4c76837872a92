// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use doctrans::app_config::{self, BackendKind, Config};
use doctrans::app_controller::{Controller, FileOutcome};
use doctrans::translation::ChunkStrategy;

/// CLI Wrapper for BackendKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliBackend {
    Libretranslate,
    Ollama,
}

impl From<CliBackend> for BackendKind {
    fn from(cli_backend: CliBackend) -> Self {
        match cli_backend {
            CliBackend::Libretranslate => BackendKind::LibreTranslate,
            CliBackend::Ollama => BackendKind::Ollama,
        }
    }
}

/// CLI Wrapper for ChunkStrategy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliStrategy {
    Lines,
    Sentences,
    Fixed,
}

impl From<CliStrategy> for ChunkStrategy {
    fn from(cli_strategy: CliStrategy) -> Self {
        match cli_strategy {
            CliStrategy::Lines => ChunkStrategy::Lines,
            CliStrategy::Sentences => ChunkStrategy::Sentences,
            CliStrategy::Fixed => ChunkStrategy::Fixed,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a .txt file or every .txt file in a directory (default command)
    Translate {
        /// Input text file or directory to process
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Translate inline text and print the result
    Text {
        /// Text to translate
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Generate shell completions for doctrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Settings shared by every command that translates
#[derive(clap::Args, Debug, Clone)]
struct TranslationArgs {
    /// Translation backend to use
    #[arg(short, long, value_enum, global = true)]
    backend: Option<CliBackend>,

    /// Backend endpoint URL (e.g., 'http://127.0.0.1:5000')
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Model name to use (Ollama backend)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long, global = true)]
    source_language: Option<String>,

    /// Target language code (e.g., 'ro', 'es', 'fr')
    #[arg(short, long, global = true)]
    target_language: Option<String>,

    /// Maximum chunk size in characters
    #[arg(long, global = true)]
    max_chunk_size: Option<usize>,

    /// Retries per chunk after the first attempt
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// How documents are split into chunks
    #[arg(long, value_enum, global = true)]
    strategy: Option<CliStrategy>,

    /// Directory for translated files (defaults to next to each input)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

/// doctrans - chunked document translation
///
/// Translates plain-text documents of any length through a self-hosted
/// translation server or a local model server, one chunk at a time.
#[derive(Parser, Debug)]
#[command(name = "doctrans")]
#[command(version)]
#[command(about = "Chunked document translation with bounded retry")]
#[command(long_about = "doctrans splits documents into chunks a translation backend accepts, translates them with bounded retry, and writes translated_<name> next to the input.

EXAMPLES:
    doctrans notes.txt                          # Translate using default config (en -> ro)
    doctrans -f notes.txt                       # Force overwrite existing output
    doctrans -b ollama -m llama3.2:3b notes.txt # Use a local Ollama model
    doctrans -s en -t es notes.txt              # Translate from English to Spanish
    doctrans --max-chunk-size 500 docs/         # Translate every .txt file in a directory
    doctrans text \"Hello world\"                 # Translate inline text
    doctrans completions bash > doctrans.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED BACKENDS:
    libretranslate - Self-hosted LibreTranslate server (default: http://127.0.0.1:5000)
    ollama         - Local Ollama server (default: http://localhost:11434)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input text file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    #[command(flatten)]
    translation: TranslationArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger accepts everything; log::max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Prefix marker for log level
    fn get_marker_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "✖",
            Level::Warn => "▲",
            Level::Info => "•",
            Level::Debug => "»",
            Level::Trace => "·",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_marker_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info by default, adjusted once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Text { text }) => {
            let controller = build_controller(&cli.translation)?;
            let translated = controller.translate_text(&text).await?;
            println!("{}", translated);
            Ok(())
        }
        Some(Commands::Translate {
            input_path,
            force_overwrite,
        }) => run_translate(&cli.translation, input_path, force_overwrite || cli.force_overwrite).await,
        None => {
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;
            run_translate(&cli.translation, input_path, cli.force_overwrite).await
        }
    }
}

/// Load the config, apply CLI overrides, and build a controller with Ctrl-C wired to cancellation
fn build_controller(args: &TranslationArgs) -> Result<Controller> {
    if let Some(cmd_log_level) = &args.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(Path::new(&args.config_path))?;
    apply_overrides(&mut config, args);

    config.validate().context("Configuration validation failed")?;

    if args.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;

    let cancel = controller.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling translation");
            cancel.cancel();
        }
    });

    Ok(controller)
}

fn apply_overrides(config: &mut Config, args: &TranslationArgs) {
    if let Some(backend) = &args.backend {
        config.translation.backend = backend.clone().into();
    }

    if let Some(endpoint) = &args.endpoint {
        config.translation.active_backend_config_mut().endpoint = endpoint.clone();
    }

    if let Some(model) = &args.model {
        config.translation.active_backend_config_mut().model = model.clone();
    }

    if let Some(max_chunk_size) = args.max_chunk_size {
        config.translation.active_backend_config_mut().max_chunk_size = max_chunk_size;
    }

    if let Some(source_lang) = &args.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &args.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(max_retries) = args.max_retries {
        config.translation.common.max_retries = max_retries;
    }

    if let Some(strategy) = &args.strategy {
        config.translation.common.chunk_strategy = strategy.clone().into();
    }

    if let Some(log_level) = &args.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(args: &TranslationArgs, input_path: PathBuf, force_overwrite: bool) -> Result<()> {
    let controller = build_controller(args)?;

    if let Err(e) = controller.test_connection().await {
        warn!("{:#}", e);
    }

    if input_path.is_file() {
        let output_dir = match &args.output_dir {
            Some(dir) => dir.clone(),
            None => input_path.parent().unwrap_or(Path::new(".")).to_path_buf(),
        };

        if let FileOutcome::Skipped(path) = controller.run(input_path, output_dir, force_overwrite).await? {
            info!("Nothing to do, {} exists", path.display());
        }
    } else if input_path.is_dir() {
        let summary = controller
            .run_folder(input_path, args.output_dir.clone(), force_overwrite)
            .await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} file(s) failed to translate", summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}
