use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Translation pipeline settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Per-provider settings
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Cloud Translation
    Google,
    // @provider: OpenAI chat completions
    OpenAI,
    // @provider: MyMemory free service
    #[default]
    MyMemory,
}

impl TranslationProvider {
    /// All providers, in the order they are offered to users
    pub const ALL: [TranslationProvider; 3] = [Self::Google, Self::OpenAI, Self::MyMemory];

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google Translate",
            Self::OpenAI => "OpenAI",
            Self::MyMemory => "MyMemory",
        }
    }

    // @returns: Lowercase provider identifier used on the wire
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::OpenAI => "openai",
            Self::MyMemory => "mymemory",
        }
    }

    // @returns: Provider whose identifier matches exactly, no case folding or trimming
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|provider| provider.identifier() == identifier)
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "openai" => Ok(Self::OpenAI),
            "mymemory" => Ok(Self::MyMemory),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Deployment environment, controls how much error detail leaves the server
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted subtitle upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,
}

impl ServerConfig {
    /// Whether diagnostic details may be sent to clients
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            environment: Environment::default(),
        }
    }
}

/// Translation pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Provider used by the CLI when none is given
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Entries translated concurrently per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between consecutive batches in milliseconds
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,

    /// Attempts per entry, including the first one
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Minimum wait between two attempts in milliseconds
    #[serde(default = "default_retry_floor_ms")]
    pub retry_floor_ms: u64,
}

impl TranslationConfig {
    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            batch_size: default_batch_size(),
            inter_batch_delay_ms: default_inter_batch_delay_ms(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_floor_ms: default_retry_floor_ms(),
        }
    }
}

/// Settings for every supported provider
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub google: GoogleConfig,

    #[serde(default)]
    pub openai: OpenAIConfig,

    #[serde(default)]
    pub mymemory: MyMemoryConfig,
}

/// Google Cloud Translation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GoogleConfig {
    /// API key; empty means read `api_key_env` at call time
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Environment variable holding the API key
    #[serde(default = "default_google_api_key_env")]
    pub api_key_env: String,

    /// Service endpoint URL
    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_key_env: default_google_api_key_env(),
            endpoint: default_google_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// OpenAI service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIConfig {
    /// API key; empty means read `api_key_env` at call time
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Environment variable holding the API key
    #[serde(default = "default_openai_api_key_env")]
    pub api_key_env: String,

    /// Model name (e.g., "gpt-4", "gpt-3.5-turbo")
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Service endpoint URL (optional, for Azure OpenAI or self-hosted)
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens per entry
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_openai_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_key_env: default_openai_api_key_env(),
            model: default_openai_model(),
            endpoint: default_openai_endpoint(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_openai_timeout_secs(),
        }
    }
}

/// MyMemory service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MyMemoryConfig {
    /// Service endpoint URL
    #[serde(default = "default_mymemory_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_mymemory_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MyMemoryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_mymemory_endpoint(),
            timeout_secs: default_mymemory_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_batch_size() -> usize {
    10
}

fn default_inter_batch_delay_ms() -> u64 {
    3000
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    3000
}

fn default_retry_floor_ms() -> u64 {
    3000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_openai_timeout_secs() -> u64 {
    60
}

fn default_mymemory_timeout_secs() -> u64 {
    20
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_google_api_key_env() -> String {
    "GOOGLE_TRANSLATE_API_KEY".to_string()
}

fn default_openai_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_google_endpoint() -> String {
    "https://translation.googleapis.com/language/translate/v2".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_mymemory_endpoint() -> String {
    "https://api.mymemory.translated.net/get".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

/// Resolve a credential at call time: the configured key wins, then the environment
pub fn resolve_api_key(configured: &str, env_var: &str) -> Option<String> {
    if !configured.trim().is_empty() {
        return Some(configured.trim().to_string());
    }
    if env_var.is_empty() {
        return None;
    }
    std::env::var(env_var)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

impl Config {
    /// Load the configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load the configuration, writing a default one if the file does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    ///
    /// API keys are not checked here; a missing key is reported by the
    /// provider on first use.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port must be non-zero"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(anyhow!("max_upload_bytes must be greater than zero"));
        }
        if self.translation.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than zero"));
        }
        if self.translation.retry_count == 0 {
            return Err(anyhow!("retry_count must be at least 1"));
        }

        let endpoints = [
            ("google", &self.providers.google.endpoint),
            ("openai", &self.providers.openai.endpoint),
            ("mymemory", &self.providers.mymemory.endpoint),
        ];
        for (name, endpoint) in endpoints {
            Url::parse(endpoint)
                .with_context(|| format!("Invalid {} endpoint: {}", name, endpoint))?;
        }

        let timeouts = [
            ("google", self.providers.google.timeout_secs),
            ("openai", self.providers.openai.timeout_secs),
            ("mymemory", self.providers.mymemory.timeout_secs),
        ];
        for (name, timeout) in timeouts {
            if timeout == 0 {
                return Err(anyhow!("{} timeout_secs must be greater than zero", name));
            }
        }

        if !(0.0..=2.0).contains(&self.providers.openai.temperature) {
            return Err(anyhow!("OpenAI temperature must be between 0.0 and 2.0"));
        }

        Ok(())
    }
}
