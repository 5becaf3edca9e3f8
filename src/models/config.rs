//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Content-suggestion settings
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Report output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log verbosity
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration if the file exists.
    ///
    /// A missing file is `Ok(None)`; an unreadable or malformed one is an error.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.max_pages == 0 {
            return Err(AppError::validation("crawler.max_pages must be > 0"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.run_timeout_secs == Some(0) {
            return Err(AppError::validation(
                "crawler.run_timeout_secs must be > 0 when set",
            ));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests, also matched against robots.txt
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Maximum concurrent page fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Maximum number of distinct pages recorded
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// Delay before each fetch in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Overall deadline for a run in seconds
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            max_concurrent: defaults::max_concurrent(),
            max_pages: defaults::max_pages(),
            request_delay_ms: defaults::request_delay(),
            timeout_secs: defaults::timeout(),
            run_timeout_secs: None,
        }
    }
}

/// Content-suggestion settings.
///
/// API keys are never read from the config file; see [`Provider::api_key_var`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Request suggestions for every crawled page
    #[serde(default)]
    pub enabled: bool,

    /// Preferred AI provider
    #[serde(default)]
    pub provider: Provider,

    /// Model name override
    #[serde(default)]
    pub model: Option<String>,

    /// Sampling temperature
    #[serde(default = "defaults::temperature")]
    pub temperature: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: Provider::default(),
            model: None,
            temperature: defaults::temperature(),
        }
    }
}

/// Supported content-suggestion providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Gemini,
    Anthropic,
}

impl Provider {
    /// Fallback order used when the preferred provider has no key.
    pub const FALLBACK_ORDER: [Provider; 3] =
        [Provider::Gemini, Provider::OpenAi, Provider::Anthropic];

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Default model when none is configured.
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-3.5-turbo",
            Provider::Gemini => "gemini-pro",
            Provider::Anthropic => "claude-3-haiku-20240307",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(AppError::config(format!(
                "unsupported AI provider: {other} (expected openai, gemini or anthropic)"
            ))),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: ReportFormat,

    /// Write the report to this file instead of stdout
    #[serde(default)]
    pub path: Option<String>,
}

/// Report rendering format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Log verbosity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Crawler".into()
    }
    pub fn max_concurrent() -> usize {
        10
    }
    pub fn max_pages() -> usize {
        100
    }
    pub fn request_delay() -> u64 {
        500
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn temperature() -> f32 {
        0.7
    }
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.crawler.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_budget_and_run_timeout() {
        let mut config = Config::default();
        config.crawler.max_pages = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.crawler.run_timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            max_pages = 5

            [analyzer]
            provider = "gemini"

            [output]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.crawler.max_pages, 5);
        assert_eq!(config.crawler.max_concurrent, 10);
        assert_eq!(config.crawler.user_agent, "Crawler");
        assert_eq!(config.crawler.request_delay_ms, 500);
        assert_eq!(config.analyzer.provider, Provider::Gemini);
        assert!(!config.analyzer.enabled);
        assert_eq!(config.output.format, ReportFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn load_optional_missing_file() {
        assert!(Config::load_optional("/nonexistent/sitecrawl.toml").unwrap().is_none());
    }

    #[test]
    fn load_optional_reads_and_rejects() {
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good.toml");
        fs::write(&good, "[crawler]\nuser_agent = \"SiteBot\"\n").unwrap();
        let config = Config::load_optional(&good).unwrap().unwrap();
        assert_eq!(config.crawler.user_agent, "SiteBot");

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[crawler\nmax_pages = ").unwrap();
        assert!(matches!(Config::load_optional(&bad), Err(AppError::Toml(_))));
    }

    #[test]
    fn provider_from_str() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("anthropic".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert!("bard".parse::<Provider>().is_err());
    }
}
