//! Defines the configuration settings for the mailsweep crawler.

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Command line arguments for mailsweep
#[derive(Parser, Debug)]
#[command(author, version, about = "Crawl a single web domain and collect the contact emails published as mailto links", long_about = None)]
pub struct AppArgs {
    /// Seed URL whose domain will be crawled (e.g. "www.example.com")
    #[arg(value_name = "SEED_URL")]
    pub seed: String,

    /// Maximum number of concurrent page fetches
    #[arg(short, long, env = "MAILSWEEP_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Maximum link depth to follow from the seed
    #[arg(long, env = "MAILSWEEP_MAX_DEPTH")]
    pub max_depth: Option<usize>,

    /// Stop after visiting this many pages
    #[arg(long, env = "MAILSWEEP_MAX_PAGES")]
    pub max_pages: Option<usize>,

    /// Stop the crawl after this many seconds
    #[arg(long, env = "MAILSWEEP_MAX_RUNTIME")]
    pub max_runtime: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "MAILSWEEP_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Minimum sleep before each request (seconds)
    #[arg(long, env = "MAILSWEEP_MIN_SLEEP")]
    pub min_sleep: Option<f32>,

    /// Maximum sleep before each request (seconds)
    #[arg(long, env = "MAILSWEEP_MAX_SLEEP")]
    pub max_sleep: Option<f32>,

    /// User agent string for HTTP requests
    #[arg(long, env = "MAILSWEEP_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Path to configuration file (TOML format)
    #[arg(long, env = "MAILSWEEP_CONFIG")]
    pub config_file: Option<String>,

    /// Write the full crawl report as JSON to this file
    #[arg(short, long, env = "MAILSWEEP_OUTPUT")]
    pub output: Option<String>,

    /// Print only the summary line, not every address found
    #[arg(short, long, default_value = "false", env = "MAILSWEEP_QUIET")]
    pub quiet: bool,
}

/// TOML Configuration file structure
#[derive(Deserialize, Debug, Default)]
struct ConfigFile {
    network: Option<NetworkConfig>,
    crawl: Option<CrawlConfig>,
}

#[derive(Deserialize, Debug, Default)]
struct NetworkConfig {
    request_timeout: Option<u64>,
    min_sleep: Option<f32>,
    max_sleep: Option<f32>,
    user_agent: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct CrawlConfig {
    max_depth: Option<usize>,
    max_pages: Option<usize>,
    max_concurrency: Option<usize>,
    max_runtime: Option<u64>,
}

/// Application configuration settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of pages fetched concurrently.
    pub max_concurrency: usize,
    /// Links discovered deeper than this are never fetched.
    pub max_depth: usize,
    /// Optional ceiling on the total number of pages visited in one run.
    pub max_pages: Option<usize>,
    /// Optional wall-clock limit for one run.
    pub max_runtime: Option<Duration>,
    /// Timeout for individual HTTP requests.
    pub request_timeout: Duration,
    /// Minimum and maximum sleep duration before each HTTP request (seconds).
    pub sleep_between_requests: (f32, f32),
    /// User agent string to use for HTTP requests.
    pub user_agent: String,
    /// Path the CLI writes the JSON report to, when given.
    pub output_file: Option<String>,
    /// Suppress the per-address listing in the CLI output.
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_concurrency: 8,
            max_depth: 25,
            max_pages: None,
            max_runtime: None,
            request_timeout: Duration::from_secs(10),
            sleep_between_requests: (0.1, 0.5),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36".to_string(),
            output_file: None,
            quiet: false,
        }
    }
}

impl Config {
    /// Picks a jittered politeness delay from the configured sleep window.
    pub(crate) fn random_sleep_duration(&self) -> Duration {
        use rand::Rng;
        let (min, max) = self.sleep_between_requests;
        if min >= max {
            return Duration::from_secs_f32(min);
        }
        let duration_secs = rand::thread_rng().gen_range(min..max);
        Duration::from_secs_f32(duration_secs)
    }
}

/// Load configuration from a TOML file
fn load_config_file(file_path: &str) -> anyhow::Result<ConfigFile> {
    let path = Path::new(file_path);
    if !path.exists() {
        tracing::warn!("Configuration file {} not found, using defaults", file_path);
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", file_path))?;

    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML configuration from {}", file_path))?;

    tracing::info!("Loaded configuration from {}", file_path);
    Ok(config)
}

fn apply_file_config(config: &mut Config, file_config: &ConfigFile) {
    if let Some(network) = &file_config.network {
        if let Some(timeout) = network.request_timeout {
            config.request_timeout = Duration::from_secs(timeout);
        }
        if let Some(min_sleep) = network.min_sleep {
            config.sleep_between_requests.0 = min_sleep;
        }
        if let Some(max_sleep) = network.max_sleep {
            config.sleep_between_requests.1 = max_sleep;
        }
        if let Some(user_agent) = &network.user_agent {
            config.user_agent = user_agent.clone();
        }
    }

    if let Some(crawl) = &file_config.crawl {
        if let Some(depth) = crawl.max_depth {
            config.max_depth = depth;
        }
        if let Some(pages) = crawl.max_pages {
            config.max_pages = Some(pages);
        }
        if let Some(concurrency) = crawl.max_concurrency {
            config.max_concurrency = concurrency;
        }
        if let Some(runtime) = crawl.max_runtime {
            config.max_runtime = Some(Duration::from_secs(runtime));
        }
    }
}

/// Apply command line arguments to the Config instance
fn apply_cli_args(config: &mut Config, args: &AppArgs) {
    config.output_file = args.output.clone();
    config.quiet = args.quiet;

    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = concurrency;
    }

    if let Some(depth) = args.max_depth {
        config.max_depth = depth;
    }

    if let Some(pages) = args.max_pages {
        config.max_pages = Some(pages);
    }

    if let Some(runtime) = args.max_runtime {
        config.max_runtime = Some(Duration::from_secs(runtime));
    }

    if let Some(timeout) = args.request_timeout {
        config.request_timeout = Duration::from_secs(timeout);
    }

    if let Some(min_sleep) = args.min_sleep {
        config.sleep_between_requests.0 = min_sleep;
    }

    if let Some(max_sleep) = args.max_sleep {
        config.sleep_between_requests.1 = max_sleep;
    }

    if let Some(ref agent) = args.user_agent {
        config.user_agent = agent.clone();
    }
}

fn validate_config(config: &mut Config) -> anyhow::Result<()> {
    if config.sleep_between_requests.0 < 0.0 {
        config.sleep_between_requests.0 = 0.0;
        tracing::warn!("Min sleep was negative. Setting to 0.");
    }

    if config.sleep_between_requests.1 < 0.0 {
        config.sleep_between_requests.1 = 0.0;
        tracing::warn!("Max sleep was negative. Setting to 0.");
    }

    if config.sleep_between_requests.0 > config.sleep_between_requests.1 {
        config.sleep_between_requests.1 = config.sleep_between_requests.0;
        tracing::warn!(
            "Min sleep was greater than max sleep. Setting both to {}",
            config.sleep_between_requests.0
        );
    }

    if config.max_concurrency == 0 {
        config.max_concurrency = 1;
        tracing::warn!("Concurrency was set to 0. Setting to 1.");
    }

    Ok(())
}

/// Builds the effective configuration: defaults, overlaid by an optional
/// TOML file, overlaid by CLI arguments and environment variables.
pub fn build_config(args: &AppArgs) -> anyhow::Result<Config> {
    let mut config = Config::default();

    if let Some(ref file_path) = args.config_file {
        match load_config_file(file_path) {
            Ok(file_config) => apply_file_config(&mut config, &file_config),
            Err(e) => {
                tracing::error!("Failed to load configuration file: {}", e);
            }
        }
    } else {
        for path in ["./mailsweep.toml", "./config.toml"].iter() {
            if Path::new(path).exists() {
                match load_config_file(path) {
                    Ok(file_config) => {
                        apply_file_config(&mut config, &file_config);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load configuration from {}: {}", path, e);
                    }
                }
            }
        }
    }

    apply_cli_args(&mut config, args);

    validate_config(&mut config)?;

    tracing::debug!("Final configuration: {:?}", config);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_from(argv: &[&str]) -> AppArgs {
        AppArgs::try_parse_from(argv.iter().copied()).expect("argv should parse")
    }

    #[test]
    fn test_defaults_without_overrides() {
        let args = args_from(&["mailsweep", "example.com"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.max_depth, 25);
        assert_eq!(config.max_pages, None);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let args = args_from(&[
            "mailsweep",
            "example.com",
            "--concurrency",
            "3",
            "--max-depth",
            "5",
            "--max-pages",
            "100",
            "--request-timeout",
            "2",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.max_pages, Some(100));
        assert_eq!(config.request_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_validation_clamps_nonsense() {
        let args = args_from(&[
            "mailsweep",
            "example.com",
            "--concurrency",
            "0",
            "--min-sleep",
            "2.0",
            "--max-sleep",
            "0.5",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.sleep_between_requests, (2.0, 2.0));
    }

    #[test]
    fn test_file_config_applies_under_cli() {
        let mut config = Config::default();
        let file_config: ConfigFile = toml::from_str(
            r#"
            [network]
            request_timeout = 3
            user_agent = "sweep-test"

            [crawl]
            max_depth = 4
            max_concurrency = 2
            "#,
        )
        .unwrap();
        apply_file_config(&mut config, &file_config);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "sweep-test");
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_concurrency, 2);
    }

    #[test]
    fn test_seed_argument_is_required() {
        assert!(AppArgs::try_parse_from(["mailsweep"]).is_err());
        assert!(AppArgs::try_parse_from(["mailsweep", "a.com", "b.com"]).is_err());
    }

    #[test]
    fn test_sleep_duration_stays_in_window() {
        let config = Config {
            sleep_between_requests: (0.1, 0.3),
            ..Config::default()
        };
        for _ in 0..20 {
            let d = config.random_sleep_duration();
            assert!(d >= Duration::from_secs_f32(0.1));
            assert!(d <= Duration::from_secs_f32(0.3));
        }

        let zero = Config {
            sleep_between_requests: (0.0, 0.0),
            ..Config::default()
        };
        assert_eq!(zero.random_sleep_duration(), Duration::ZERO);
    }
}
