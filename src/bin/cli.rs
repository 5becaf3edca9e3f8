//! sitecrawl CLI
//!
//! Crawls one site and prints or saves a report of internal link counts.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use sitecrawl::{
    error::Result,
    models::{Config, Provider, ReportFormat},
    pipeline,
    services::{AiAnalyzer, ContentAnalyzer, HttpFetcher},
    utils::http,
};

/// sitecrawl - single-site crawler and link report
#[derive(Parser, Debug)]
#[command(name = "sitecrawl", version, about = "Crawl one website and report internal links")]
struct Cli {
    /// Base URL to crawl
    #[arg(long)]
    url: Option<String>,

    /// Maximum number of concurrent requests
    #[arg(long)]
    concurrency: Option<usize>,

    /// Maximum number of pages to crawl
    #[arg(long)]
    pages: Option<usize>,

    /// Output report in JSON format
    #[arg(long)]
    json: bool,

    /// Write the report to this file
    #[arg(long)]
    out: Option<String>,

    /// User-Agent header, also matched against robots.txt
    #[arg(long)]
    user_agent: Option<String>,

    /// Delay before each request, in milliseconds
    #[arg(long, value_name = "MS")]
    delay: Option<u64>,

    /// Per-request timeout, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Stop the whole crawl after this many seconds
    #[arg(long, value_name = "SECS")]
    run_timeout: Option<u64>,

    /// Request AI content suggestions for every page (API key from the environment or .env)
    #[arg(long)]
    analyze: bool,

    /// AI provider: openai, gemini or anthropic
    #[arg(long)]
    ai_provider: Option<Provider>,

    /// Path to the TOML config file
    #[arg(short, long, default_value = "sitecrawl.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Base URL, when --url is not given
    #[arg(value_name = "URL")]
    positional_url: Option<String>,

    /// Concurrency, when --concurrency is not given
    #[arg(value_name = "CONCURRENCY")]
    positional_concurrency: Option<usize>,

    /// Page budget, when --pages is not given
    #[arg(value_name = "PAGES")]
    positional_pages: Option<usize>,
}

impl Cli {
    /// Apply command-line overrides on top of file values.
    fn apply(&self, config: &mut Config) {
        let crawler = &mut config.crawler;
        if let Some(n) = self.concurrency.or(self.positional_concurrency) {
            crawler.max_concurrent = n;
        }
        if let Some(n) = self.pages.or(self.positional_pages) {
            crawler.max_pages = n;
        }
        if let Some(ua) = &self.user_agent {
            crawler.user_agent = ua.clone();
        }
        if let Some(ms) = self.delay {
            crawler.request_delay_ms = ms;
        }
        if let Some(secs) = self.timeout {
            crawler.timeout_secs = secs;
        }
        if let Some(secs) = self.run_timeout {
            crawler.run_timeout_secs = Some(secs);
        }

        if self.analyze {
            config.analyzer.enabled = true;
        }
        if let Some(provider) = self.ai_provider {
            config.analyzer.provider = provider;
        }

        if self.json {
            config.output.format = ReportFormat::Json;
        }
        if let Some(out) = &self.out {
            config.output.path = Some(out.clone());
        }
    }

    fn seed(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or(self.positional_url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }
}

/// Load `KEY=value` lines from `path` into the process environment.
///
/// Variables that are already set keep their values. A missing file is `Ok(None)`.
fn load_env_file(path: &Path) -> std::result::Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(Some(path.to_path_buf())),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Initialize logging; `RUST_LOG` wins over `level`.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = load_env_file(Path::new(".env"));
    let cli = Cli::parse();

    let Some(seed) = cli.seed().map(str::to_string) else {
        let _ = Cli::command().print_help();
        eprintln!("\nFor AI analysis, put an API key in a .env file (or the environment):");
        eprintln!("  OPENAI_API_KEY=your-openai-key");
        eprintln!("  GEMINI_API_KEY=your-gemini-key");
        eprintln!("  ANTHROPIC_API_KEY=your-anthropic-key");
        return ExitCode::FAILURE;
    };

    let file_config = Config::load_optional(&cli.config);
    let level = match (&file_config, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(Some(config)), false) => config.logging.level.clone(),
        _ => "info".to_string(),
    };
    init_logging(&level);

    match dotenv {
        Ok(Some(path)) => log::debug!("Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
    }

    let mut config = match file_config {
        Ok(Some(config)) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Ok(None) => {
            log::debug!("No config file at {}, using defaults", cli.config.display());
            Config::default()
        }
        Err(e) => {
            log::error!("Config load failed from {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);

    match run(&config, &seed).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, seed: &str) -> Result<()> {
    config.validate()?;
    pipeline::parse_seed(seed)?;

    let client = http::create_async_client(&config.crawler)?;
    let fetcher = Arc::new(HttpFetcher::new(client.clone()));

    let analyzer: Option<Arc<dyn ContentAnalyzer>> = if config.analyzer.enabled {
        let analyzer = AiAnalyzer::from_env(client, &config.analyzer)?;
        log::info!("AI analysis enabled using {}", analyzer.provider());
        Some(Arc::new(analyzer))
    } else {
        None
    };

    let report = pipeline::run_crawler(config, seed, fetcher, analyzer).await?;
    pipeline::write_report(seed, &report.pages, &config.output).await?;

    if report.stats.timed_out {
        log::warn!("Report is partial: the run deadline was reached");
    }
    Ok(())
}
