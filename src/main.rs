// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subtrans::app_config::{self, Config, Environment, TranslationProvider};
use subtrans::app_controller::{Controller, TranslateOptions};
use subtrans::language_utils::AUTO_DETECT;
use subtrans::server;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Google,
    #[value(name = "openai")]
    OpenAI,
    #[value(name = "mymemory")]
    MyMemory,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => TranslationProvider::Google,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::MyMemory => TranslationProvider::MyMemory,
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
    /// Run the HTTP translation server
    Serve(ServeArgs),

    /// Translate a local .srt file or every .srt file in a directory
    Translate(TranslateArgs),

    /// Generate shell completions for subtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Include internal error details in responses
    #[arg(long)]
    development: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input .srt file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Source language code (e.g., 'en', 'zh'), or 'auto' to detect it
    #[arg(short, long, default_value = AUTO_DETECT)]
    source_language: String,

    /// Target language code (e.g., 'en', 'zh')
    #[arg(short, long)]
    target_language: String,

    /// Directory for translated files (defaults to next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// subtrans - SRT subtitle translation
///
/// Translates SRT subtitle files through Google Translate, OpenAI or MyMemory,
/// either as an HTTP service or directly from the command line.
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version)]
#[command(about = "SRT subtitle translation service")]
#[command(long_about = "subtrans translates SRT subtitle files entry by entry through a third-party translation service.

EXAMPLES:
    subtrans serve                                  # Start the HTTP server on 127.0.0.1:3000
    subtrans serve --port 8080 --development        # Custom port, detailed errors
    subtrans translate movie.srt -t zh              # Translate with the default provider
    subtrans translate -p openai -s en -t fr movie.srt
    subtrans translate -t ja -o out/ /subtitles/    # Process an entire directory
    subtrans completions bash > subtrans.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    google    - Google Cloud Translation (GOOGLE_TRANSLATE_API_KEY)
    openai    - OpenAI chat completions (OPENAI_API_KEY)
    mymemory  - MyMemory free service (no key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
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
            let (color, emoji) = Self::decoration_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start wide open; the effective level is set once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtrans", &mut std::io::stdout());
            Ok(())
        }
        Commands::Serve(args) => run_serve(args).await,
        Commands::Translate(args) => run_translate(args).await,
    }
}

/// Load the config file and apply the log level from the command line or the file
fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = Config::load_or_create(config_path)?;

    if let Some(log_level) = log_level {
        config.log_level = log_level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    Ok(config)
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = load_config(&args.config_path, args.log_level)?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.development {
        config.server.environment = Environment::Development;
    }

    config.validate().context("Configuration validation failed")?;

    server::serve(config).await
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let mut config = load_config(&args.config_path, args.log_level)?;

    if let Some(provider) = args.provider {
        config.translation.provider = provider.into();
    }

    let options = TranslateOptions {
        provider: config.translation.provider,
        source_language: args.source_language,
        target_language: args.target_language,
        output_dir: args.output_dir,
        force_overwrite: args.force_overwrite,
    };

    let controller = Controller::with_config(config)?;

    let cancel = controller.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current batch");
            cancel.cancel();
        }
    });

    let summary = controller.run(&args.input_path, &options).await?;
    info!(
        "Done: {} translated, {} skipped, {} errors",
        summary.translated, summary.skipped, summary.errors
    );

    Ok(())
}
